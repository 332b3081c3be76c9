//! Host-facing interface.
//!
//! A plugin-format wrapper (VST, AU, CLAP, ...) adapts these three traits to
//! its ABI. They are independent of any particular format.
//!
//! | Concern | Trait |
//! |---------|-------|
//! | Parameter queries and automation | [`HostParameters`] |
//! | Audio lifecycle and rendering | [`HostRender`] |
//! | Session save/restore | [`HostState`] |
//!
//! Every index argument must be in `[0, parameter_count())`; out-of-range
//! indices panic.

use crate::error::Result;

/// Per-parameter queries and automation.
///
/// All methods are safe to call from latency-sensitive host threads: each
/// takes the parameter lock for one access and does no I/O.
pub trait HostParameters {
    /// Number of host-visible parameters (constant for the plugin lifetime).
    fn parameter_count(&self) -> usize;

    /// Display name; `"Param <index>"` for unbound slots.
    fn parameter_name(&self, index: usize) -> String;

    /// Current normalized value.
    fn parameter(&self, index: usize) -> f32;

    /// Set the normalized value.
    fn set_parameter(&self, index: usize, value: f32);

    /// Default normalized value.
    fn parameter_default(&self, index: usize) -> f32;

    /// Display text for the current value.
    fn parameter_text(&self, index: usize) -> String;

    /// Display text for the current value, limited to `max_chars` characters.
    fn parameter_text_truncated(&self, index: usize, max_chars: usize) -> String;

    /// Number of discrete steps; 0 for continuous parameters.
    fn parameter_steps(&self, index: usize) -> u32;

    /// Whether the host may automate the parameter.
    fn is_parameter_automatable(&self, index: usize) -> bool;

    /// Whether the parameter is a meta parameter.
    fn is_meta_parameter(&self, index: usize) -> bool;

    /// Whether the parameter's visual orientation is inverted. Never the case.
    fn is_parameter_orientation_inverted(&self, _index: usize) -> bool {
        false
    }
}

/// Audio lifecycle and real-time rendering.
pub trait HostRender {
    /// Allocate DSP state for the given sample rate and maximum block size.
    fn prepare(&self, sample_rate: f64, block_size: usize);

    /// Free DSP state. Rendering produces silence until the next `prepare`.
    fn release(&self);

    /// Render one block in place.
    ///
    /// `channels` holds one buffer per channel of the bus layout; the first
    /// input-count buffers carry input samples on entry. Never blocks and
    /// never allocates.
    fn process_block(&self, frames: usize, channels: &mut [&mut [f32]]);
}

/// Session persistence.
pub trait HostState {
    /// Encode the state the host should store.
    fn save_state(&self) -> Result<Vec<u8>>;

    /// Restore from a blob produced by [`save_state`](Self::save_state).
    ///
    /// Undecodable or foreign blobs are ignored.
    fn restore_state(&self, data: &[u8]);
}
