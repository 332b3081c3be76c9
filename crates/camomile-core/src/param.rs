//! Parameter bindings and host-visible parameter slots.
//!
//! A [`ParameterBinding`] is what a DSP engine discovers inside a patch: a
//! named control with a default, a step count, capability flags, and a
//! value→text function. A [`ParameterSlot`] is one positional entry of the
//! host-visible parameter table; it is either unbound or holds a binding plus
//! the current normalized value.
//!
//! All values crossing this module are normalized to `[0.0, 1.0]`.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Identifier the engine assigns to each binding it discovers.
///
/// The processor hands it back to the engine when forwarding a value, so
/// the engine can route it to the right control without name lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingId(pub u32);

/// Parameter capability flags.
///
/// # Example
///
/// ```rust
/// use camomile_core::ParamFlags;
///
/// let flags = ParamFlags::AUTOMATABLE.union(ParamFlags::META);
/// assert!(flags.contains(ParamFlags::AUTOMATABLE));
/// assert!(flags.contains(ParamFlags::META));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamFlags(u8);

impl ParamFlags {
    /// No flags set.
    pub const NONE: Self = Self(0);
    /// Host can automate this parameter (default for all bindings).
    pub const AUTOMATABLE: Self = Self(1 << 0);
    /// Informational parameter whose changes do not affect the audio directly.
    pub const META: Self = Self(1 << 1);

    /// Returns `true` if all bits in `other` are set in `self`.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns the union of two flag sets.
    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl Default for ParamFlags {
    fn default() -> Self {
        Self::AUTOMATABLE
    }
}

/// Maps a normalized value to display text.
pub type TextFn = Arc<dyn Fn(f32) -> String + Send + Sync>;

/// Default display text: the normalized value with two decimals.
pub fn default_text(value: f32) -> String {
    format!("{value:.2}")
}

/// A control discovered inside a loaded patch.
///
/// Bindings are immutable once the engine has produced them; loading a patch
/// copies them into the parameter table.
#[derive(Clone)]
pub struct ParameterBinding {
    /// Engine-assigned identifier.
    pub id: BindingId,
    /// Full display name.
    pub name: String,
    /// Default normalized value.
    pub default: f32,
    /// Number of discrete steps; 0 means continuous.
    pub step_count: u32,
    /// Capability flags.
    pub flags: ParamFlags,
    /// Value→text function.
    pub text: TextFn,
}

impl ParameterBinding {
    /// Continuous, automatable binding with a default of 0 and two-decimal text.
    pub fn new(id: BindingId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            default: 0.0,
            step_count: 0,
            flags: ParamFlags::default(),
            text: Arc::new(default_text),
        }
    }

    /// Set the default normalized value (clamped to `[0, 1]`).
    pub fn with_default(mut self, default: f32) -> Self {
        self.default = clamp_unit(default);
        self
    }

    /// Set the number of discrete steps.
    pub fn with_steps(mut self, step_count: u32) -> Self {
        self.step_count = step_count;
        self
    }

    /// Replace the capability flags.
    pub fn with_flags(mut self, flags: ParamFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Replace the value→text function.
    pub fn with_text(mut self, text: impl Fn(f32) -> String + Send + Sync + 'static) -> Self {
        self.text = Arc::new(text);
        self
    }
}

impl fmt::Debug for ParameterBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterBinding")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("default", &self.default)
            .field("step_count", &self.step_count)
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

/// One positional entry of the host-visible parameter table.
///
/// An unbound slot (the default) has an empty name, a value of 0, and
/// ignores writes. Slots are replaced wholesale when a patch loads; only
/// the value changes in place.
#[derive(Clone, Debug, Default)]
pub struct ParameterSlot {
    binding: Option<ParameterBinding>,
    value: f32,
}

impl ParameterSlot {
    /// An unbound slot.
    pub fn unbound() -> Self {
        Self::default()
    }

    /// A slot bound to `binding`, starting at its default value.
    ///
    /// The default is snapped to the step grid like any other write.
    pub fn bound(binding: ParameterBinding) -> Self {
        let value = quantize(clamp_unit(binding.default), binding.step_count);
        Self {
            binding: Some(binding),
            value,
        }
    }

    /// Whether a patch parameter is bound to this slot.
    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    /// The binding, if any.
    pub fn binding(&self) -> Option<&ParameterBinding> {
        self.binding.as_ref()
    }

    /// Engine identifier of the bound parameter.
    pub fn binding_id(&self) -> Option<BindingId> {
        self.binding.as_ref().map(|b| b.id)
    }

    /// Bound name, or `""` when unbound.
    pub fn name(&self) -> &str {
        self.binding.as_ref().map_or("", |b| b.name.as_str())
    }

    /// Host-facing name: the bound name, or `"Param <index>"` when unbound
    /// or bound under an empty name.
    pub fn display_name(&self, index: usize) -> Cow<'_, str> {
        match &self.binding {
            Some(b) if !b.name.is_empty() => Cow::Borrowed(b.name.as_str()),
            _ => Cow::Owned(format!("Param {index}")),
        }
    }

    /// Current normalized value; always 0 when unbound.
    pub fn normalized_value(&self) -> f32 {
        if self.binding.is_some() { self.value } else { 0.0 }
    }

    /// Set the normalized value.
    ///
    /// Clamped to `[0, 1]` and snapped to the nearest step for stepped
    /// parameters. Ignored when the slot is unbound.
    pub fn set_normalized_value(&mut self, value: f32) {
        if let Some(binding) = &self.binding {
            self.value = quantize(clamp_unit(value), binding.step_count);
        }
    }

    /// Default normalized value; 0 when unbound.
    pub fn default_normalized_value(&self) -> f32 {
        self.binding
            .as_ref()
            .map_or(0.0, |b| quantize(clamp_unit(b.default), b.step_count))
    }

    /// Number of discrete steps; 0 for continuous or unbound slots.
    pub fn step_count(&self) -> u32 {
        self.binding.as_ref().map_or(0, |b| b.step_count)
    }

    /// Whether the host may automate this slot. Unbound slots are not automatable.
    pub fn is_automatable(&self) -> bool {
        self.binding
            .as_ref()
            .is_some_and(|b| b.flags.contains(ParamFlags::AUTOMATABLE))
    }

    /// Whether this slot is a meta parameter.
    pub fn is_meta(&self) -> bool {
        self.binding
            .as_ref()
            .is_some_and(|b| b.flags.contains(ParamFlags::META))
    }

    /// Display text for an arbitrary normalized value.
    pub fn text_for_value(&self, value: f32) -> String {
        match &self.binding {
            Some(b) => (b.text)(value),
            None => default_text(value),
        }
    }

    /// Display text for the current value.
    pub fn text(&self) -> String {
        self.text_for_value(self.normalized_value())
    }
}

/// Clamp to `[0, 1]`, mapping NaN to 0.
pub(crate) fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}

fn quantize(value: f32, steps: u32) -> f32 {
    if steps == 0 {
        return value;
    }
    let steps = steps as f32;
    (value * steps).round() / steps
}

/// Truncate `text` to at most `max_chars` characters.
pub(crate) fn truncate_chars(mut text: String, max_chars: usize) -> String {
    if let Some((byte_index, _)) = text.char_indices().nth(max_chars) {
        text.truncate(byte_index);
    }
    text
}
