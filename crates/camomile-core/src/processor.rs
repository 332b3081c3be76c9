//! The patch processor: parameter table, current patch, and listeners.
//!
//! # Threads
//!
//! ```text
//! Host control thread        Audio thread              Load (control thread)
//! ───────────────────        ────────────              ─────────────────────
//! parameter queries   ─┐     process_block             suspend rendering
//! set_parameter        ├──►  try_lock(audio)           lock(audio): waits for
//! save/restore state   │     try_lock(table) → push    in-flight block
//!                      │     values to engine          release old patch
//!                      └──►  table lock (per access)   open new patch
//!                                                      rebind table (one lock)
//!                                                      notify listeners + host
//!                                                      re-prepare, resume
//! ```
//!
//! The audio thread never waits: it only ever `try_lock`s, and a contended
//! or suspended block renders silence. The table lock is held for a single
//! access at a time and never across listener or engine calls.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use arc_swap::ArcSwap;
use camomile_config::ProcessorConfig;
use parking_lot::Mutex;

use crate::engine::{AudioConfig, EngineFactory};
use crate::error::Result;
use crate::host::{HostParameters, HostRender, HostState};
use crate::listener::{ListenerRegistry, PatchListener};
use crate::param::{BindingId, ParameterBinding, truncate_chars};
use crate::patch::{PatchHandle, PatchState};
use crate::state::SavedPatch;
use crate::table::{CAPACITY, ParameterTable};

/// State owned by whoever holds the audio lock: the render path or a load.
struct AudioState {
    patch: PatchHandle,
    config: AudioConfig,
    /// Set by `prepare`, cleared by `release`.
    active: bool,
    /// Last value forwarded to the engine per slot; NaN forces a resend.
    sent: [f32; CAPACITY],
}

impl AudioState {
    /// Forward table values that changed since the last block.
    ///
    /// Skipped for this block if a control thread holds the table lock.
    fn push_parameters(&mut self, table: &Mutex<ParameterTable>) {
        let mut pending = [(None::<BindingId>, 0.0f32); CAPACITY];
        {
            let Some(table) = table.try_lock() else {
                return;
            };
            for (entry, slot) in pending.iter_mut().zip(table.iter()) {
                *entry = (slot.binding_id(), slot.normalized_value());
            }
        }
        for (index, (binding, value)) in pending.into_iter().enumerate() {
            let Some(binding) = binding else { continue };
            if self.sent[index] != value {
                self.sent[index] = value;
                self.patch.set_parameter(binding, value);
            }
        }
    }
}

fn silence(frames: usize, channels: &mut [&mut [f32]]) {
    for channel in channels.iter_mut() {
        let n = frames.min(channel.len());
        channel[..n].fill(0.0);
    }
}

/// Hosts one patch and exposes its parameters through a fixed table.
///
/// Share it behind an `Arc`: the host control thread, the audio thread, and
/// editors all call into the same instance.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use camomile_config::ProcessorConfig;
/// use camomile_core::{EngineFactory, HostParameters, HostRender, Processor};
///
/// fn run(factory: Arc<dyn EngineFactory>) {
///     let processor = Processor::new(ProcessorConfig::default(), factory);
///     processor.prepare(48000.0, 256);
///     processor.load_patch("patches/synth.pd".as_ref());
///     println!("{} = {}", processor.parameter_name(0), processor.parameter_text(0));
/// }
/// ```
pub struct Processor {
    config: ProcessorConfig,
    factory: Arc<dyn EngineFactory>,
    table: Mutex<ParameterTable>,
    audio: Mutex<AudioState>,
    /// Set for the whole load window; render checks it after taking the audio lock.
    suspended: AtomicBool,
    state: AtomicU8,
    /// Serializes loads.
    load_lock: Mutex<()>,
    /// Identity of the installed patch, readable without the audio lock.
    identity: ArcSwap<SavedPatch>,
    listeners: ListenerRegistry,
    host_refresh: Option<Box<dyn Fn() + Send + Sync>>,
}

impl Processor {
    /// Create a processor with no patch loaded.
    ///
    /// An invalid `config` is replaced by the defaults with a warning. Its
    /// sample rate and block size only stand in until the host calls
    /// [`HostRender::prepare`]; rendering stays silent before then.
    pub fn new(config: ProcessorConfig, factory: Arc<dyn EngineFactory>) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(err) => {
                tracing::warn!(error = %err, "invalid processor configuration, using defaults");
                ProcessorConfig::default()
            }
        };
        let audio_config = AudioConfig::from(&config);
        Self {
            config,
            factory,
            table: Mutex::new(ParameterTable::new()),
            audio: Mutex::new(AudioState {
                patch: PatchHandle::unloaded(),
                config: audio_config,
                active: false,
                sent: [f32::NAN; CAPACITY],
            }),
            suspended: AtomicBool::new(false),
            state: AtomicU8::new(PatchState::Unloaded as u8),
            load_lock: Mutex::new(()),
            identity: ArcSwap::from_pointee(SavedPatch::default()),
            listeners: ListenerRegistry::new(),
            host_refresh: None,
        }
    }

    /// Install the callback that asks the host to re-read parameter metadata.
    ///
    /// Called once at the end of every load, after listeners.
    pub fn with_host_refresh(mut self, refresh: impl Fn() + Send + Sync + 'static) -> Self {
        self.host_refresh = Some(Box::new(refresh));
        self
    }

    /// Construction-time configuration.
    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Current position in the load state machine.
    pub fn patch_state(&self) -> PatchState {
        PatchState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// File name of the installed patch, or `""`.
    pub fn patch_name(&self) -> String {
        self.identity.load().name.clone()
    }

    /// Directory of the installed patch, or an empty path.
    pub fn patch_directory(&self) -> PathBuf {
        PathBuf::from(&self.identity.load().path)
    }

    /// Identity of the installed patch as it would be persisted.
    pub fn saved_patch(&self) -> SavedPatch {
        self.identity.load().as_ref().clone()
    }

    /// Run `f` against the whole table under one lock acquisition.
    ///
    /// Do not call back into the processor from `f`.
    pub fn with_table<R>(&self, f: impl FnOnce(&ParameterTable) -> R) -> R {
        f(&self.table.lock())
    }

    // ── Listeners ───────────────────────────────────────────────────────────

    /// The listener registry.
    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    /// Register a patch-change listener. Adding the same listener twice is a no-op.
    pub fn add_listener<L: PatchListener + 'static>(&self, listener: &Arc<L>) -> bool {
        self.listeners.add(listener)
    }

    /// Deregister a patch-change listener.
    pub fn remove_listener<L: PatchListener + 'static>(&self, listener: &Arc<L>) -> bool {
        self.listeners.remove(listener)
    }

    // ── Patch loading ───────────────────────────────────────────────────────

    /// Replace the current patch with the one at `path`.
    ///
    /// Always completes. A missing file, a wrong extension, or an engine
    /// failure leaves the processor with no patch and an unbound table.
    /// Listeners are notified exactly once either way. Returns the state the
    /// load ended in.
    pub fn load_patch(&self, path: &Path) -> PatchState {
        self.reload(Some(path))
    }

    /// Remove the current patch.
    pub fn unload_patch(&self) -> PatchState {
        self.reload(None)
    }

    fn reload(&self, path: Option<&Path>) -> PatchState {
        let _serial = self.load_lock.lock();

        self.suspended.store(true, Ordering::Release);
        self.state
            .store(PatchState::Loading as u8, Ordering::Release);

        {
            // Blocks until any in-flight block has finished.
            let mut audio = self.audio.lock();

            let mut old = std::mem::take(&mut audio.patch);
            old.release();
            drop(old);

            let handle = match path {
                Some(path) => {
                    tracing::debug!(path = %path.display(), "loading patch");
                    match PatchHandle::open(path, &self.config.patch_extension, self.factory.as_ref())
                    {
                        Ok(handle) => handle,
                        Err(err) => {
                            tracing::warn!(path = %path.display(), error = %err, "patch not loaded");
                            PatchHandle::unloaded()
                        }
                    }
                }
                None => PatchHandle::unloaded(),
            };

            let bindings: Vec<ParameterBinding> = handle.parameters().cloned().collect();
            let (bound, dropped) = self.table.lock().bind(bindings);
            if dropped > 0 {
                tracing::debug!(bound, dropped, "patch exposes more parameters than the table holds");
            }

            let state = if handle.is_loaded() {
                tracing::info!(
                    patch = handle.name(),
                    directory = %handle.directory().display(),
                    bound,
                    dropped,
                    "patch loaded"
                );
                PatchState::Loaded
            } else {
                PatchState::Unloaded
            };

            self.identity.store(Arc::new(if handle.is_loaded() {
                SavedPatch::new(handle.name(), handle.directory())
            } else {
                SavedPatch::default()
            }));
            audio.patch = handle;
            audio.sent = [f32::NAN; CAPACITY];
            self.state.store(state as u8, Ordering::Release);
        }

        // No lock held: listeners and the host may query the processor.
        let notified = self.listeners.notify_all();
        tracing::debug!(notified, "patch change notified");
        if let Some(refresh) = &self.host_refresh {
            refresh();
        }

        {
            let mut audio = self.audio.lock();
            if audio.active {
                let config = audio.config;
                audio.patch.prepare(&config);
            }
        }

        self.suspended.store(false, Ordering::Release);
        self.patch_state()
    }
}

impl HostParameters for Processor {
    fn parameter_count(&self) -> usize {
        self.table.lock().size()
    }

    fn parameter_name(&self, index: usize) -> String {
        self.table.lock().get(index).display_name(index).into_owned()
    }

    fn parameter(&self, index: usize) -> f32 {
        self.table.lock().get(index).normalized_value()
    }

    fn set_parameter(&self, index: usize, value: f32) {
        self.table.lock().set(index, value);
    }

    fn parameter_default(&self, index: usize) -> f32 {
        self.table.lock().get(index).default_normalized_value()
    }

    fn parameter_text(&self, index: usize) -> String {
        self.table.lock().get(index).text()
    }

    fn parameter_text_truncated(&self, index: usize, max_chars: usize) -> String {
        truncate_chars(self.parameter_text(index), max_chars)
    }

    fn parameter_steps(&self, index: usize) -> u32 {
        self.table.lock().get(index).step_count()
    }

    fn is_parameter_automatable(&self, index: usize) -> bool {
        self.table.lock().get(index).is_automatable()
    }

    fn is_meta_parameter(&self, index: usize) -> bool {
        self.table.lock().get(index).is_meta()
    }
}

impl HostRender for Processor {
    fn prepare(&self, sample_rate: f64, block_size: usize) {
        let mut audio = self.audio.lock();
        audio.config = AudioConfig {
            sample_rate,
            block_size,
            inputs: self.config.input_channels,
            outputs: self.config.output_channels,
        };
        let config = audio.config;
        audio.patch.prepare(&config);
        audio.active = true;
        audio.sent = [f32::NAN; CAPACITY];
        tracing::debug!(sample_rate, block_size, "processor prepared");
    }

    fn release(&self) {
        let mut audio = self.audio.lock();
        audio.patch.release();
        audio.active = false;
    }

    fn process_block(&self, frames: usize, channels: &mut [&mut [f32]]) {
        let frames = channels.iter().map(|c| c.len()).fold(frames, usize::min);

        let Some(mut audio) = self.audio.try_lock() else {
            silence(frames, channels);
            return;
        };
        if self.suspended.load(Ordering::Acquire) || !audio.active {
            silence(frames, channels);
            return;
        }

        let AudioConfig { inputs, outputs, .. } = audio.config;
        for channel in channels.iter_mut().take(outputs).skip(inputs) {
            channel[..frames].fill(0.0);
        }

        audio.push_parameters(&self.table);
        if !audio.patch.process(frames, inputs, channels) {
            silence(frames, channels);
        }
    }
}

impl HostState for Processor {
    fn save_state(&self) -> Result<Vec<u8>> {
        self.identity.load().encode()
    }

    fn restore_state(&self, data: &[u8]) {
        match SavedPatch::decode(data) {
            Ok(saved) => {
                self.load_patch(&saved.file_path());
            }
            Err(err) => {
                tracing::warn!(error = %err, "ignoring persisted state");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{DspEngine, GuiElement};
    use crate::error::Error;
    use std::sync::atomic::AtomicUsize;

    /// Engine that multiplies every channel by the value of binding 0.
    struct GainEngine {
        elements: Vec<GuiElement>,
        gain: f32,
        prepared: Arc<AtomicUsize>,
    }

    impl DspEngine for GainEngine {
        fn gui_elements(&self) -> &[GuiElement] {
            &self.elements
        }
        fn prepare(&mut self, _config: &AudioConfig) {
            self.prepared.fetch_add(1, Ordering::SeqCst);
        }
        fn release(&mut self) {}
        fn process(&mut self, frames: usize, _inputs: usize, channels: &mut [&mut [f32]]) {
            for channel in channels.iter_mut() {
                for sample in &mut channel[..frames] {
                    *sample *= self.gain;
                }
            }
        }
        fn set_parameter(&mut self, binding: BindingId, value: f32) {
            if binding == BindingId(0) {
                self.gain = value;
            }
        }
    }

    struct GainFactory {
        prepared: Arc<AtomicUsize>,
    }

    impl EngineFactory for GainFactory {
        fn open(&self, file_name: &str, _directory: &Path) -> Result<Box<dyn DspEngine>> {
            if file_name.starts_with("broken") {
                return Err(Error::Engine("cannot parse".to_string()));
            }
            Ok(Box::new(GainEngine {
                elements: vec![GuiElement::new("hsl", "gain").with_parameter(
                    ParameterBinding::new(BindingId(0), "Gain").with_default(0.5),
                )],
                gain: 1.0,
                prepared: Arc::clone(&self.prepared),
            }))
        }
    }

    fn processor() -> (Processor, Arc<AtomicUsize>) {
        let prepared = Arc::new(AtomicUsize::new(0));
        let factory = Arc::new(GainFactory {
            prepared: Arc::clone(&prepared),
        });
        (
            Processor::new(ProcessorConfig::default().with_channels(1, 1), factory),
            prepared,
        )
    }

    fn patch_file(dir: &tempfile::TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, "").unwrap();
        path
    }

    #[test]
    fn starts_unloaded() {
        let (p, _) = processor();
        assert_eq!(p.patch_state(), PatchState::Unloaded);
        assert_eq!(p.parameter_count(), CAPACITY);
        assert_eq!(p.parameter_name(5), "Param 5");
        assert!(!p.is_parameter_orientation_inverted(0));
    }

    #[test]
    fn render_pushes_parameter_values() {
        let dir = tempfile::TempDir::new().unwrap();
        let (p, _) = processor();
        p.prepare(48000.0, 4);
        assert_eq!(p.load_patch(&patch_file(&dir, "gain.pd")), PatchState::Loaded);

        let mut buf = [1.0f32; 4];
        p.process_block(4, &mut [&mut buf]);
        assert_eq!(buf, [0.5; 4]);

        p.set_parameter(0, 0.25);
        let mut buf = [1.0f32; 4];
        p.process_block(4, &mut [&mut buf]);
        assert_eq!(buf, [0.25; 4]);
    }

    #[test]
    fn render_before_prepare_is_silent() {
        let dir = tempfile::TempDir::new().unwrap();
        let (p, _) = processor();
        p.load_patch(&patch_file(&dir, "gain.pd"));
        let mut buf = [1.0f32; 4];
        p.process_block(4, &mut [&mut buf]);
        assert_eq!(buf, [0.0; 4]);
    }

    #[test]
    fn render_without_patch_is_silent() {
        let (p, _) = processor();
        p.prepare(48000.0, 4);
        let mut buf = [1.0f32; 4];
        p.process_block(4, &mut [&mut buf]);
        assert_eq!(buf, [0.0; 4]);
    }

    #[test]
    fn load_reprepares_when_active() {
        let dir = tempfile::TempDir::new().unwrap();
        let (p, prepared) = processor();
        p.load_patch(&patch_file(&dir, "gain.pd"));
        assert_eq!(prepared.load(Ordering::SeqCst), 0);
        p.prepare(44100.0, 64);
        assert_eq!(prepared.load(Ordering::SeqCst), 1);
        p.load_patch(&patch_file(&dir, "gain.pd"));
        assert_eq!(prepared.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn engine_failure_yields_unloaded() {
        let dir = tempfile::TempDir::new().unwrap();
        let (p, _) = processor();
        p.load_patch(&patch_file(&dir, "gain.pd"));
        assert_eq!(p.load_patch(&patch_file(&dir, "broken.pd")), PatchState::Unloaded);
        assert_eq!(p.patch_name(), "");
        assert_eq!(p.parameter_name(0), "Param 0");
    }

    #[test]
    fn host_refresh_called_once_per_load() {
        let dir = tempfile::TempDir::new().unwrap();
        let refreshes = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&refreshes);
        let (p, _) = processor();
        let p = p.with_host_refresh(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        p.load_patch(&patch_file(&dir, "gain.pd"));
        p.load_patch(&dir.path().join("missing.pd"));
        assert_eq!(refreshes.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn truncated_text() {
        let dir = tempfile::TempDir::new().unwrap();
        let (p, _) = processor();
        p.load_patch(&patch_file(&dir, "gain.pd"));
        assert_eq!(p.parameter_text(0), "0.50");
        assert_eq!(p.parameter_text_truncated(0, 2), "0.");
    }

    #[test]
    fn invalid_config_falls_back_to_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let factory = Arc::new(GainFactory {
            prepared: Arc::new(AtomicUsize::new(0)),
        });
        let config = ProcessorConfig::default().with_patch_extension(".pd");
        let p = Processor::new(config, factory);
        assert_eq!(p.config(), &ProcessorConfig::default());
        assert_eq!(p.load_patch(&patch_file(&dir, "gain.pd")), PatchState::Loaded);
    }

    #[test]
    fn unload_clears_identity() {
        let dir = tempfile::TempDir::new().unwrap();
        let (p, _) = processor();
        p.load_patch(&patch_file(&dir, "gain.pd"));
        assert_eq!(p.patch_name(), "gain.pd");
        assert_eq!(p.patch_directory(), dir.path());
        assert_eq!(p.unload_patch(), PatchState::Unloaded);
        assert_eq!(p.saved_patch(), SavedPatch::default());
    }
}
