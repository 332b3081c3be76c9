//! Pure Data patch scanner.
//!
//! Finds the GUI objects on a patch's top-level canvas that a host can
//! automate. A `.pd` file is a sequence of `;`-terminated records:
//!
//! ```text
//! #N canvas 0 50 450 300 12;
//! #X obj 30 40 hsl 128 15 0 127 0 0 empty cutoff Cutoff 0 -9 0 10 -262144 -1 -1 0 1;
//! #X obj 30 80 tgl 15 0 empty bypass empty 17 7 0 10 -262144 -1 -1 0 1;
//! #N canvas 0 0 450 300 sub 0;
//! #X obj 10 10 hsl 128 15 0 1 0 0 empty hidden empty 0 -9 0 10 -262144 -1 -1 0 1;
//! #X restore 30 120 pd sub;
//! ```
//!
//! Only objects with a receive symbol are controls: that symbol is how the
//! patch listens for values. Objects inside subpatches are skipped.
//!
//! Scanning is pure (no I/O), so it is tested directly against patch text.

/// IEM GUI classes that become host parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    /// `hsl`
    HSlider,
    /// `vsl`
    VSlider,
    /// `tgl`
    Toggle,
    /// `nbx`
    NumberBox,
    /// `hradio` (or the legacy `hdl`)
    HRadio,
    /// `vradio` (or the legacy `vdl`)
    VRadio,
}

impl ControlKind {
    /// Map a Pd object class to a control kind.
    pub fn from_class(class: &str) -> Option<Self> {
        match class {
            "hsl" => Some(Self::HSlider),
            "vsl" => Some(Self::VSlider),
            "tgl" => Some(Self::Toggle),
            "nbx" => Some(Self::NumberBox),
            "hradio" | "hdl" => Some(Self::HRadio),
            "vradio" | "vdl" => Some(Self::VRadio),
            _ => None,
        }
    }

    /// Canonical Pd class name.
    pub fn class(self) -> &'static str {
        match self {
            Self::HSlider => "hsl",
            Self::VSlider => "vsl",
            Self::Toggle => "tgl",
            Self::NumberBox => "nbx",
            Self::HRadio => "hradio",
            Self::VRadio => "vradio",
        }
    }
}

/// A bindable GUI object found in a patch.
#[derive(Debug, Clone, PartialEq)]
pub struct PdControl {
    /// Object class.
    pub kind: ControlKind,
    /// Receive symbol the patch listens on.
    pub receive: String,
    /// Display label, empty if the object has none.
    pub label: String,
    /// Plain value at normalized 0.
    pub min: f32,
    /// Plain value at normalized 1.
    pub max: f32,
    /// Discrete steps; 0 for continuous controls.
    pub steps: u32,
    /// Plain initial value.
    pub default: f32,
}

impl PdControl {
    /// Parameter name: the label, or the receive symbol when unlabelled.
    pub fn name(&self) -> &str {
        if self.label.is_empty() {
            &self.receive
        } else {
            &self.label
        }
    }

    /// Map a plain value into `[0, 1]`.
    pub fn normalize(&self, plain: f32) -> f32 {
        let span = self.max - self.min;
        if span == 0.0 {
            return 0.0;
        }
        ((plain - self.min) / span).clamp(0.0, 1.0)
    }

    /// Map a normalized value back to the control's range.
    pub fn denormalize(&self, normalized: f32) -> f32 {
        self.min + normalized.clamp(0.0, 1.0) * (self.max - self.min)
    }

    /// Display text for a normalized value.
    pub fn format(&self, normalized: f32) -> String {
        let plain = self.denormalize(normalized);
        if self.steps > 0 {
            format!("{plain:.0}")
        } else {
            format!("{plain:.2}")
        }
    }
}

/// Errors from scanning patch text.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The first record is not a canvas declaration.
    #[error("not a Pd patch: first record is not '#N canvas'")]
    MissingCanvas,
    /// A `#X restore` closes a canvas that was never opened.
    #[error("record {record}: '#X restore' without a matching subpatch")]
    UnbalancedRestore {
        /// Zero-based record index.
        record: usize,
    },
    /// A numeric argument of a bindable object is missing or malformed.
    #[error("record {record}: {class} argument {index} is missing or not a number")]
    BadArgument {
        /// Zero-based record index.
        record: usize,
        /// Object class.
        class: &'static str,
        /// Zero-based argument index after the class name.
        index: usize,
    },
}

/// Split patch text into records on unescaped `;`.
///
/// Records are trimmed; empty records are dropped. Escapes are kept.
pub fn records(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    for (i, ch) in text.char_indices() {
        match ch {
            '\\' if !escaped => escaped = true,
            ';' if !escaped => {
                out.push(&text[start..i]);
                start = i + 1;
            }
            _ => escaped = false,
        }
    }
    out.push(&text[start..]);
    out.into_iter()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .collect()
}

/// Strip Pd escapes from a symbol; `empty` means no symbol.
fn symbol(token: Option<&&str>) -> Option<String> {
    let token = *token?;
    if token == "empty" || token == "-" {
        return None;
    }
    let mut out = String::with_capacity(token.len());
    let mut escaped = false;
    for ch in token.chars() {
        if ch == '\\' && !escaped {
            escaped = true;
            continue;
        }
        escaped = false;
        out.push(ch);
    }
    Some(out)
}

struct Args<'a> {
    tokens: &'a [&'a str],
    record: usize,
    class: &'static str,
}

impl Args<'_> {
    fn number(&self, index: usize) -> Result<f32, ScanError> {
        self.tokens
            .get(index)
            .and_then(|t| t.parse::<f32>().ok())
            .filter(|v| v.is_finite())
            .ok_or(ScanError::BadArgument {
                record: self.record,
                class: self.class,
                index,
            })
    }

    fn optional(&self, index: usize) -> Option<f32> {
        self.tokens.get(index).and_then(|t| t.parse::<f32>().ok())
    }

    fn flag(&self, index: usize) -> Result<bool, ScanError> {
        Ok(self.number(index)? != 0.0)
    }
}

fn control(
    kind: ControlKind,
    tokens: &[&str],
    record: usize,
) -> Result<Option<PdControl>, ScanError> {
    let args = Args {
        tokens,
        record,
        class: kind.class(),
    };

    // Argument positions of the receive and label symbols per class.
    let (receive_at, label_at) = match kind {
        ControlKind::HSlider | ControlKind::VSlider | ControlKind::NumberBox => (7, 8),
        ControlKind::Toggle => (3, 4),
        ControlKind::HRadio | ControlKind::VRadio => (5, 6),
    };
    let Some(receive) = symbol(tokens.get(receive_at)) else {
        return Ok(None);
    };
    let label = symbol(tokens.get(label_at)).unwrap_or_default();

    let (min, max, steps, default) = match kind {
        ControlKind::HSlider | ControlKind::VSlider => {
            let extent = if kind == ControlKind::HSlider {
                args.number(0)?
            } else {
                args.number(1)?
            };
            let (bottom, top) = (args.number(2)?, args.number(3)?);
            // Saved slider position is in hundredths of a pixel.
            let init = args.flag(5)?;
            let position = match args.optional(16) {
                Some(raw) if init && extent > 1.0 => {
                    (raw / ((extent - 1.0) * 100.0)).clamp(0.0, 1.0)
                }
                _ => 0.0,
            };
            (bottom, top, 0, bottom + position * (top - bottom))
        }
        ControlKind::Toggle => {
            let nonzero = args.optional(13).filter(|v| *v != 0.0).unwrap_or(1.0);
            let on = args.flag(1)? && args.optional(12).is_some_and(|v| v != 0.0);
            (0.0, nonzero, 1, if on { nonzero } else { 0.0 })
        }
        ControlKind::NumberBox => {
            let (low, high) = (args.number(2)?, args.number(3)?);
            let initial = if args.flag(5)? {
                args.optional(16).unwrap_or(0.0)
            } else {
                0.0
            };
            (low, high, 0, initial.clamp(low.min(high), low.max(high)))
        }
        ControlKind::HRadio | ControlKind::VRadio => {
            let count = args.number(3)?.max(1.0).trunc();
            let last = count - 1.0;
            let initial = if args.flag(2)? {
                args.optional(14).unwrap_or(0.0).clamp(0.0, last)
            } else {
                0.0
            };
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let steps = last as u32;
            (0.0, last, steps, initial)
        }
    };

    Ok(Some(PdControl {
        kind,
        receive,
        label,
        min,
        max,
        steps,
        default,
    }))
}

/// Scan patch text for bindable controls on the top-level canvas, in file order.
pub fn scan(text: &str) -> Result<Vec<PdControl>, ScanError> {
    let mut controls = Vec::new();
    let mut depth = 0usize;

    for (record, line) in records(text).into_iter().enumerate() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        match tokens.as_slice() {
            ["#N", "canvas", ..] => depth += 1,
            _ if record == 0 => return Err(ScanError::MissingCanvas),
            ["#X", "restore", ..] => {
                if depth <= 1 {
                    return Err(ScanError::UnbalancedRestore { record });
                }
                depth -= 1;
            }
            ["#X", "obj", _x, _y, class, args @ ..] if depth == 1 => {
                if let Some(kind) = ControlKind::from_class(class) {
                    if let Some(found) = control(kind, args, record)? {
                        controls.push(found);
                    }
                }
            }
            _ => {}
        }
    }

    if depth == 0 {
        return Err(ScanError::MissingCanvas);
    }
    Ok(controls)
}
