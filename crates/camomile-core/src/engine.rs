//! DSP engine collaborator traits.
//!
//! The processor never interprets a patch itself. An [`EngineFactory`]
//! builds a [`DspEngine`] from a validated patch file; the engine exposes the
//! GUI elements it discovered and renders audio in place.

use std::path::Path;

use camomile_config::ProcessorConfig;

use crate::error::Result;
use crate::param::{BindingId, ParameterBinding};

/// Sample rate, block size, and channel layout handed to an engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioConfig {
    /// Sample rate in Hz.
    pub sample_rate: f64,
    /// Maximum frames per render call.
    pub block_size: usize,
    /// Input channel count.
    pub inputs: usize,
    /// Output channel count.
    pub outputs: usize,
}

impl AudioConfig {
    /// Number of channel buffers a render call carries.
    pub fn channels(&self) -> usize {
        self.inputs.max(self.outputs)
    }
}

impl From<&ProcessorConfig> for AudioConfig {
    fn from(config: &ProcessorConfig) -> Self {
        Self {
            sample_rate: config.sample_rate,
            block_size: config.block_size,
            inputs: config.input_channels,
            outputs: config.output_channels,
        }
    }
}

/// A GUI-bindable object discovered in a patch.
#[derive(Debug, Clone)]
pub struct GuiElement {
    /// Object class (e.g. `"hsl"`).
    pub kind: String,
    /// Display label.
    pub label: String,
    /// Parameters this element exposes, in order.
    pub parameters: Vec<ParameterBinding>,
}

impl GuiElement {
    /// Element with no parameters.
    pub fn new(kind: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            label: label.into(),
            parameters: Vec::new(),
        }
    }

    /// Append a parameter binding.
    pub fn with_parameter(mut self, binding: ParameterBinding) -> Self {
        self.parameters.push(binding);
        self
    }
}

/// A running instance of a loaded patch.
///
/// `process` and `set_parameter` are called from the audio thread and must
/// not allocate or block. Everything else runs on the control thread while
/// rendering is suspended.
pub trait DspEngine: Send {
    /// GUI elements in discovery order.
    fn gui_elements(&self) -> &[GuiElement];

    /// Allocate DSP state for `config`.
    fn prepare(&mut self, config: &AudioConfig);

    /// Free DSP state. The engine may be prepared again afterwards.
    fn release(&mut self);

    /// Render `frames` frames in place.
    ///
    /// On entry the first `inputs` channels hold input samples and any
    /// further channels hold silence. On return all `outputs` channels hold
    /// output samples.
    fn process(&mut self, frames: usize, inputs: usize, channels: &mut [&mut [f32]]);

    /// Forward a normalized parameter value to the control bound as `binding`.
    fn set_parameter(&mut self, binding: BindingId, value: f32);
}

/// Builds engines from patch files.
pub trait EngineFactory: Send + Sync {
    /// Open the patch `file_name` located in `directory`.
    ///
    /// Called only after the file has been checked to exist and to carry
    /// the patch extension.
    fn open(&self, file_name: &str, directory: &Path) -> Result<Box<dyn DspEngine>>;
}
