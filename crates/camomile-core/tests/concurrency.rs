//! Patch loads racing the render path and host queries.

mod common;

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, mpsc};
use std::thread;

use camomile_config::ProcessorConfig;
use camomile_core::{
    AudioConfig, BindingId, CAPACITY, DspEngine, EngineFactory, GuiElement, HostParameters,
    HostRender, PatchState, Processor,
};
use common::{processor, write_patch};
use tempfile::TempDir;

const SMALL: usize = 3;

#[test]
fn loads_never_expose_a_torn_table() {
    let dir = TempDir::new().unwrap();
    let small = write_patch(dir.path(), "small.pd", SMALL);
    let large = write_patch(dir.path(), "large.pd", CAPACITY + 10);

    let (p, factory) = processor(2, 2);
    p.prepare(48000.0, 64);
    let done = Arc::new(AtomicBool::new(false));

    let render = {
        let p = Arc::clone(&p);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            let mut left = [0.0f32; 64];
            let mut right = [0.0f32; 64];
            let mut blocks = 0usize;
            while !done.load(Ordering::Acquire) {
                left.fill(0.5);
                right.fill(0.5);
                p.process_block(64, &mut [&mut left, &mut right]);
                assert!(left.iter().chain(right.iter()).all(|s| s.is_finite()));
                blocks += 1;
            }
            blocks
        })
    };

    let host = {
        let p = Arc::clone(&p);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            while !done.load(Ordering::Acquire) {
                let bound = p.with_table(|t| {
                    assert_eq!(t.size(), CAPACITY);
                    t.bound_count()
                });
                assert!(
                    bound == 0 || bound == SMALL || bound == CAPACITY,
                    "observed partially bound table: {bound}"
                );
                for i in 0..CAPACITY {
                    p.set_parameter(i, 0.5);
                    let _ = p.parameter_text(i);
                }
            }
        })
    };

    for round in 0..200 {
        let path = if round % 2 == 0 { &small } else { &large };
        p.load_patch(path);
    }
    done.store(true, Ordering::Release);

    let blocks = render.join().unwrap();
    host.join().unwrap();
    assert!(blocks > 0);
    assert_eq!(factory.violations.load(Ordering::SeqCst), 0);
}

#[test]
fn concurrent_loads_are_serialized() {
    let dir = TempDir::new().unwrap();
    let a = write_patch(dir.path(), "a.pd", 2);
    let b = write_patch(dir.path(), "b.pd", 5);
    let (p, _) = processor(2, 2);

    let handles: Vec<_> = (0..4)
        .map(|n| {
            let p = Arc::clone(&p);
            let path = if n % 2 == 0 { a.clone() } else { b.clone() };
            thread::spawn(move || {
                for _ in 0..25 {
                    p.load_patch(&path);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let bound = p.with_table(|t| t.bound_count());
    let expected = if p.patch_name() == "a.pd" { 2 } else { 5 };
    assert_eq!(bound, expected);
}

/// Counts `process` calls and adds 1.0 to every sample it touches.
struct CountingEngine {
    calls: Arc<AtomicUsize>,
}

impl DspEngine for CountingEngine {
    fn gui_elements(&self) -> &[GuiElement] {
        &[]
    }
    fn prepare(&mut self, _config: &AudioConfig) {}
    fn release(&mut self) {}
    fn process(&mut self, frames: usize, _inputs: usize, channels: &mut [&mut [f32]]) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        for channel in channels.iter_mut() {
            for sample in &mut channel[..frames] {
                *sample += 1.0;
            }
        }
    }
    fn set_parameter(&mut self, _binding: BindingId, _value: f32) {}
}

/// Blocks inside `open` while `gated` is set, until released.
struct GatedFactory {
    gated: AtomicBool,
    calls: Arc<AtomicUsize>,
    entered: Mutex<mpsc::Sender<()>>,
    release: Mutex<mpsc::Receiver<()>>,
}

impl EngineFactory for GatedFactory {
    fn open(&self, _file_name: &str, _directory: &Path) -> camomile_core::Result<Box<dyn DspEngine>> {
        if self.gated.load(Ordering::SeqCst) {
            self.entered.lock().unwrap().send(()).unwrap();
            self.release.lock().unwrap().recv().unwrap();
        }
        Ok(Box::new(CountingEngine {
            calls: Arc::clone(&self.calls),
        }))
    }
}

/// Render one 8-frame stereo block of 0.5 input.
fn render(p: &Processor) -> ([f32; 8], [f32; 8]) {
    let mut left = [0.5f32; 8];
    let mut right = [0.5f32; 8];
    {
        let mut channels = [left.as_mut_slice(), right.as_mut_slice()];
        p.process_block(8, &mut channels);
    }
    (left, right)
}

#[test]
fn render_during_load_is_silent_and_skips_engines() {
    let dir = TempDir::new().unwrap();
    let a = write_patch(dir.path(), "a.pd", 1);
    let b = write_patch(dir.path(), "b.pd", 1);

    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let calls = Arc::new(AtomicUsize::new(0));
    let factory = Arc::new(GatedFactory {
        gated: AtomicBool::new(false),
        calls: Arc::clone(&calls),
        entered: Mutex::new(entered_tx),
        release: Mutex::new(release_rx),
    });
    let config = ProcessorConfig::default().with_channels(2, 2);
    let p = Arc::new(Processor::new(config, Arc::clone(&factory) as Arc<dyn EngineFactory>));
    p.prepare(48000.0, 8);
    p.load_patch(&a);

    let (left, right) = render(&p);
    assert_eq!(left, [1.5; 8]);
    assert_eq!(right, [1.5; 8]);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    factory.gated.store(true, Ordering::SeqCst);
    calls.store(0, Ordering::SeqCst);
    let loader = {
        let p = Arc::clone(&p);
        thread::spawn(move || p.load_patch(&b))
    };
    entered_rx.recv().unwrap();

    assert_eq!(p.patch_state(), PatchState::Loading);
    let (left, right) = render(&p);
    assert_eq!(left, [0.0; 8]);
    assert_eq!(right, [0.0; 8]);
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    release_tx.send(()).unwrap();
    loader.join().unwrap();
    assert_eq!(p.patch_state(), PatchState::Loaded);
    assert_eq!(p.patch_name(), "b.pd");

    let (left, right) = render(&p);
    assert_eq!(left, [1.5; 8]);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
