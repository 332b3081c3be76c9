//! Processor defaults: patch format, audio configuration, display limits.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Settings consumed by the patch processor at construction time.
///
/// The audio fields are the values the processor uses until the host calls
/// `prepare`; the channel counts describe the fixed bus layout.
///
/// # TOML Format
///
/// ```toml
/// [processor]
/// patch_extension = "pd"
/// sample_rate = 48000.0
/// block_size = 256
/// input_channels = 2
/// output_channels = 2
/// text_max_chars = 16
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProcessorConfig {
    /// File extension (without the dot) a patch file must carry to be loaded.
    pub patch_extension: String,
    /// Sample rate in Hz used before the host prepares the processor.
    pub sample_rate: f64,
    /// Maximum block size in frames used before the host prepares the processor.
    pub block_size: usize,
    /// Number of input channels on the main bus.
    pub input_channels: usize,
    /// Number of output channels on the main bus.
    pub output_channels: usize,
    /// Default bound for length-limited parameter text.
    pub text_max_chars: usize,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            patch_extension: "pd".to_string(),
            sample_rate: 44100.0,
            block_size: 512,
            input_channels: 2,
            output_channels: 2,
            text_max_chars: 16,
        }
    }
}

impl ProcessorConfig {
    /// Set the channel layout.
    pub fn with_channels(mut self, inputs: usize, outputs: usize) -> Self {
        self.input_channels = inputs;
        self.output_channels = outputs;
        self
    }

    /// Set the patch file extension (without the dot).
    pub fn with_patch_extension(mut self, extension: impl Into<String>) -> Self {
        self.patch_extension = extension.into();
        self
    }

    /// Set the pre-prepare audio configuration.
    pub fn with_audio(mut self, sample_rate: f64, block_size: usize) -> Self {
        self.sample_rate = sample_rate;
        self.block_size = block_size;
        self
    }

    /// Check every field against its accepted range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.patch_extension.is_empty() {
            return Err(ConfigError::invalid(
                "processor.patch_extension",
                "must not be empty",
            ));
        }
        if self.patch_extension.starts_with('.') {
            return Err(ConfigError::invalid(
                "processor.patch_extension",
                "must not start with '.'",
            ));
        }
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(ConfigError::invalid(
                "processor.sample_rate",
                format!("{} is not a positive sample rate", self.sample_rate),
            ));
        }
        if self.block_size == 0 {
            return Err(ConfigError::invalid(
                "processor.block_size",
                "must be greater than zero",
            ));
        }
        if self.output_channels == 0 {
            return Err(ConfigError::invalid(
                "processor.output_channels",
                "at least one output channel is required",
            ));
        }
        Ok(())
    }
}
