//! Configuration for the Camomile patch host.
//!
//! - [`ProcessorConfig`]: patch file extension, pre-prepare audio settings,
//!   channel layout, display-text bound
//! - [`LookAndFeel`]: editor colours and grid metrics, injected into the
//!   editor when it is built
//! - [`CamomileConfig`]: both of the above, loaded from / saved to TOML
//! - [`paths`]: platform configuration directory
//!
//! # Example
//!
//! ```rust,no_run
//! use camomile_config::{CamomileConfig, paths};
//!
//! let config = CamomileConfig::load_or_default(paths::user_config_file()).unwrap();
//! println!("patch extension: {}", config.processor.patch_extension);
//! ```

mod config;
mod error;
mod look_and_feel;
mod processor;

/// Platform-specific configuration paths.
pub mod paths;

pub use config::CamomileConfig;
pub use error::ConfigError;
pub use look_and_feel::{Color, LookAndFeel};
pub use paths::{ensure_user_config_dir, user_config_dir, user_config_file};
pub use processor::ProcessorConfig;
