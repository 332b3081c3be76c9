//! Pure Data support for the Camomile patch host.
//!
//! [`scan`] finds the automatable GUI objects (sliders, toggles, number
//! boxes, radios) on a patch's top-level canvas; [`PdEngineFactory`] turns a
//! `.pd` file into a [`camomile_core::DspEngine`] exposing them.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use camomile_config::ProcessorConfig;
//! use camomile_core::{HostParameters, Processor};
//! use camomile_pd::PdEngineFactory;
//!
//! let processor = Processor::new(ProcessorConfig::default(), Arc::new(PdEngineFactory));
//! processor.load_patch("synth.pd".as_ref());
//! for i in 0..processor.parameter_count() {
//!     println!("{}: {}", processor.parameter_name(i), processor.parameter_text(i));
//! }
//! ```

pub mod engine;
pub mod scanner;

pub use engine::{PdEngine, PdEngineFactory};
pub use scanner::{ControlKind, PdControl, ScanError, records, scan};
