//! Top-level configuration file.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use crate::look_and_feel::LookAndFeel;
use crate::processor::ProcessorConfig;

/// Complete configuration: processor defaults plus editor look-and-feel.
///
/// # TOML Format
///
/// ```toml
/// [processor]
/// patch_extension = "pd"
/// sample_rate = 48000.0
///
/// [editor]
/// background = "#202020"
/// foreground = "#f0f0f0"
/// columns = 6
/// ```
///
/// Missing sections and fields fall back to their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CamomileConfig {
    /// Processor defaults.
    pub processor: ProcessorConfig,
    /// Editor look-and-feel.
    pub editor: LookAndFeel,
}

impl CamomileConfig {
    /// Load and validate a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Load the file at `path` if it exists, otherwise return the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.is_file() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse and validate a configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: CamomileConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save the configuration to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
            }
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))
    }

    /// Validate both sections.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.processor.validate()?;
        self.editor.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::look_and_feel::Color;

    #[test]
    fn empty_toml_is_default() {
        let config = CamomileConfig::from_toml("").unwrap();
        assert_eq!(config, CamomileConfig::default());
    }

    #[test]
    fn sections_parse() {
        let config = CamomileConfig::from_toml(
            r##"
            [processor]
            sample_rate = 48000.0
            output_channels = 4

            [editor]
            background = "#202020"
            columns = 6
            "##,
        )
        .unwrap();
        assert_eq!(config.processor.sample_rate, 48000.0);
        assert_eq!(config.processor.output_channels, 4);
        assert_eq!(config.editor.background, Color::rgb(0x20, 0x20, 0x20));
        assert_eq!(config.editor.columns, 6);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = CamomileConfig::from_toml("[editor]\ncolumns = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "editor.columns", .. }));
    }

    #[test]
    fn bad_colour_is_a_parse_error() {
        let err = CamomileConfig::from_toml("[editor]\naccent = \"blue\"").unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(_)));
    }
}
