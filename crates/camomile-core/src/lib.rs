//! Parameter and patch synchronization core for the Camomile patch host.
//!
//! A Camomile plugin hosts a visual-dataflow patch inside a DAW. The patch
//! is interpreted by a DSP engine; this crate sits between the engine and the
//! host and keeps three parties consistent:
//!
//! - the host, which sees a fixed table of [`CAPACITY`] positional parameters
//! - the engine, which discovers GUI controls in the patch and renders audio
//! - editors and other [`PatchListener`]s, which follow patch changes
//!
//! # Architecture
//!
//! | Concern | Type |
//! |---------|------|
//! | Host-visible parameter slot | [`ParameterSlot`] |
//! | Fixed-capacity slot table | [`ParameterTable`] |
//! | Loaded patch + engine | [`PatchHandle`] |
//! | Engine seam | [`EngineFactory`], [`DspEngine`] |
//! | Load, render, persist | [`Processor`] |
//! | Host ABI seam | [`HostParameters`], [`HostRender`], [`HostState`] |
//! | Patch-change observers | [`ListenerRegistry`], [`PatchListener`] |
//! | Editor model | [`EditorView`] |
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use camomile_config::{LookAndFeel, ProcessorConfig};
//! use camomile_core::{EditorView, EngineFactory, HostRender, HostState, Processor};
//!
//! fn host(factory: Arc<dyn EngineFactory>) -> camomile_core::Result<()> {
//!     let processor = Arc::new(Processor::new(ProcessorConfig::default(), factory));
//!     let editor = EditorView::open(Arc::clone(&processor), LookAndFeel::default());
//!
//!     processor.prepare(48000.0, 512);
//!     processor.load_patch("synth.pd".as_ref());
//!     println!("{} widgets", editor.widgets().len());
//!
//!     let blob = processor.save_state()?;
//!     processor.restore_state(&blob);
//!     Ok(())
//! }
//! ```

pub mod editor;
pub mod engine;
pub mod error;
pub mod host;
pub mod listener;
pub mod param;
pub mod patch;
pub mod processor;
pub mod state;
pub mod table;

pub use editor::{EditorView, NO_PATCH_MESSAGE, ParamWidget};
pub use engine::{AudioConfig, DspEngine, EngineFactory, GuiElement};
pub use error::{Error, Result};
pub use host::{HostParameters, HostRender, HostState};
pub use listener::{ListenerRegistry, PatchListener};
pub use param::{BindingId, ParamFlags, ParameterBinding, ParameterSlot, TextFn, default_text};
pub use patch::{PatchHandle, PatchState, validate_patch_file};
pub use processor::Processor;
pub use state::{STATE_TAG, SavedPatch};
pub use table::{CAPACITY, ParameterTable};
