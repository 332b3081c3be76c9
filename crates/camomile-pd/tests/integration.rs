//! Pd patches loaded through a processor.

use std::path::PathBuf;
use std::sync::Arc;

use camomile_config::ProcessorConfig;
use camomile_core::{CAPACITY, HostParameters, HostRender, HostState, PatchState, Processor};
use camomile_pd::PdEngineFactory;
use tempfile::TempDir;

const SYNTH: &str = "#N canvas 0 50 450 300 12;
#X obj 30 40 hsl 128 15 0 127 0 0 empty cutoff Cutoff 0 -9 0 10 -262144 -1 -1 0 1;
#X obj 30 80 tgl 15 0 empty bypass empty 17 7 0 10 -262144 -1 -1 0 1;
#X obj 30 100 osc~ 440;
#X obj 30 140 vradio 15 1 0 3 empty wave Wave 0 -8 0 10 -262144 -1 -1 0;
#X connect 2 0 3 0;
";

fn write(dir: &TempDir, name: &str, text: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, text).unwrap();
    path
}

fn processor() -> Processor {
    Processor::new(ProcessorConfig::default(), Arc::new(PdEngineFactory))
}

#[test]
fn pd_controls_become_parameters() {
    let dir = TempDir::new().unwrap();
    let p = processor();
    assert_eq!(p.load_patch(&write(&dir, "synth.pd", SYNTH)), PatchState::Loaded);

    assert_eq!(p.parameter_name(0), "Cutoff");
    assert_eq!(p.parameter_name(1), "bypass");
    assert_eq!(p.parameter_name(2), "Wave");
    assert_eq!(p.parameter_name(3), "Param 3");
    assert_eq!(p.parameter_steps(0), 0);
    assert_eq!(p.parameter_steps(1), 1);
    assert_eq!(p.parameter_steps(2), 2);

    p.set_parameter(0, 1.0);
    assert_eq!(p.parameter_text(0), "127.00");
    p.set_parameter(2, 0.6);
    assert_eq!(p.parameter(2), 0.5);
    assert_eq!(p.parameter_text(2), "1");
}

#[test]
fn audio_passes_through() {
    let dir = TempDir::new().unwrap();
    let p = processor();
    p.prepare(44100.0, 32);
    p.load_patch(&write(&dir, "synth.pd", SYNTH));

    let mut left = [0.5f32; 32];
    let mut right = [-0.5f32; 32];
    p.process_block(32, &mut [&mut left, &mut right]);
    assert_eq!(left, [0.5; 32]);
    assert_eq!(right, [-0.5; 32]);
}

#[test]
fn malformed_patch_leaves_no_patch() {
    let dir = TempDir::new().unwrap();
    let p = processor();
    p.load_patch(&write(&dir, "synth.pd", SYNTH));
    let state = p.load_patch(&write(&dir, "junk.pd", "this is not a patch"));
    assert_eq!(state, PatchState::Unloaded);
    for i in 0..CAPACITY {
        assert_eq!(p.parameter_name(i), format!("Param {i}"));
    }
}

#[test]
fn state_restores_pd_patch() {
    let dir = TempDir::new().unwrap();
    let p = processor();
    p.load_patch(&write(&dir, "synth.pd", SYNTH));
    let blob = p.save_state().unwrap();

    let fresh = processor();
    fresh.restore_state(&blob);
    assert_eq!(fresh.patch_name(), "synth.pd");
    assert_eq!(fresh.parameter_name(2), "Wave");
}
