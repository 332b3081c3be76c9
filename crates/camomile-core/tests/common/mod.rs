//! Scripted engine shared by the integration tests.
//!
//! A patch file holds one line per parameter: `name default steps`. The
//! engine adds a constant to every input channel and records the values it
//! receives.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use camomile_config::ProcessorConfig;
use camomile_core::{
    AudioConfig, BindingId, DspEngine, EngineFactory, Error, GuiElement, ParameterBinding,
    PatchListener, Processor, Result,
};

pub struct ScriptedEngine {
    elements: Vec<GuiElement>,
    bindings: usize,
    violations: Arc<AtomicUsize>,
    pub offset: f32,
}

impl DspEngine for ScriptedEngine {
    fn gui_elements(&self) -> &[GuiElement] {
        &self.elements
    }

    fn prepare(&mut self, _config: &AudioConfig) {}

    fn release(&mut self) {}

    fn process(&mut self, frames: usize, inputs: usize, channels: &mut [&mut [f32]]) {
        for channel in channels.iter_mut().take(inputs) {
            for sample in &mut channel[..frames] {
                *sample += self.offset;
            }
        }
    }

    fn set_parameter(&mut self, binding: BindingId, _value: f32) {
        if binding.0 as usize >= self.bindings {
            self.violations.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Builds [`ScriptedEngine`]s and counts bindings delivered to the wrong engine.
#[derive(Default)]
pub struct ScriptedFactory {
    pub violations: Arc<AtomicUsize>,
    pub opened: AtomicUsize,
}

impl EngineFactory for ScriptedFactory {
    fn open(&self, file_name: &str, directory: &Path) -> Result<Box<dyn DspEngine>> {
        let text = std::fs::read_to_string(directory.join(file_name))
            .map_err(|e| Error::Engine(e.to_string()))?;
        let mut elements = Vec::new();
        for (id, line) in text.lines().filter(|l| !l.trim().is_empty()).enumerate() {
            let mut fields = line.split_whitespace();
            let name = fields.next().unwrap_or_default().to_string();
            let default = fields.next().and_then(|f| f.parse().ok()).unwrap_or(0.0);
            let steps = fields.next().and_then(|f| f.parse().ok()).unwrap_or(0);
            elements.push(GuiElement::new("hsl", name.clone()).with_parameter(
                ParameterBinding::new(BindingId(id as u32), name)
                    .with_default(default)
                    .with_steps(steps),
            ));
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedEngine {
            bindings: elements.len(),
            elements,
            violations: Arc::clone(&self.violations),
            offset: 0.0,
        }))
    }
}

/// Write a patch with `count` parameters named `p0`, `p1`, ...
pub fn write_patch(dir: &Path, file_name: &str, count: usize) -> PathBuf {
    let body: String = (0..count)
        .map(|i| format!("p{i} {} 0\n", (i % 10) as f32 / 10.0))
        .collect();
    let path = dir.join(file_name);
    std::fs::write(&path, body).unwrap();
    path
}

pub fn processor(inputs: usize, outputs: usize) -> (Arc<Processor>, Arc<ScriptedFactory>) {
    let factory = Arc::new(ScriptedFactory::default());
    let config = ProcessorConfig::default().with_channels(inputs, outputs);
    let processor = Arc::new(Processor::new(config, Arc::clone(&factory) as Arc<dyn EngineFactory>));
    (processor, factory)
}

#[derive(Default)]
pub struct CountingListener {
    pub calls: AtomicUsize,
}

impl CountingListener {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PatchListener for CountingListener {
    fn patch_changed(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}
