//! Control-surface engine for Pure Data patches.
//!
//! [`PdEngine`] exposes the controls found by the scanner as parameter
//! bindings and keeps a receive table of their plain values. It does not
//! interpret the patch's signal graph: audio passes through in place.

use std::path::Path;

use camomile_core::{
    AudioConfig, BindingId, DspEngine, EngineFactory, Error, GuiElement, ParameterBinding, Result,
};

use crate::scanner::{PdControl, scan};

/// Engine built from the controls of one patch.
#[derive(Debug)]
pub struct PdEngine {
    controls: Vec<PdControl>,
    elements: Vec<GuiElement>,
    /// Plain value per control, indexed by binding id.
    values: Vec<f32>,
    config: Option<AudioConfig>,
}

impl PdEngine {
    /// Build an engine exposing `controls` in order.
    ///
    /// Binding `i` is control `i`.
    pub fn from_controls(controls: Vec<PdControl>) -> Self {
        let elements = controls
            .iter()
            .enumerate()
            .map(|(i, control)| {
                let formatter = control.clone();
                #[allow(clippy::cast_possible_truncation)]
                let binding = ParameterBinding::new(BindingId(i as u32), control.name())
                    .with_default(control.normalize(control.default))
                    .with_steps(control.steps)
                    .with_text(move |v| formatter.format(v));
                GuiElement::new(control.kind.class(), control.name()).with_parameter(binding)
            })
            .collect();
        let values = controls.iter().map(|c| c.default).collect();
        Self {
            controls,
            elements,
            values,
            config: None,
        }
    }

    /// Controls in binding order.
    pub fn controls(&self) -> &[PdControl] {
        &self.controls
    }

    /// Plain value last delivered to `receive`.
    pub fn value(&self, receive: &str) -> Option<f32> {
        self.controls
            .iter()
            .position(|c| c.receive == receive)
            .map(|i| self.values[i])
    }

    /// Audio configuration while prepared.
    pub fn audio_config(&self) -> Option<&AudioConfig> {
        self.config.as_ref()
    }
}

impl DspEngine for PdEngine {
    fn gui_elements(&self) -> &[GuiElement] {
        &self.elements
    }

    fn prepare(&mut self, config: &AudioConfig) {
        tracing::debug!(
            sample_rate = config.sample_rate,
            block_size = config.block_size,
            "pd engine prepared"
        );
        self.config = Some(*config);
    }

    fn release(&mut self) {
        self.config = None;
    }

    fn process(&mut self, _frames: usize, _inputs: usize, _channels: &mut [&mut [f32]]) {}

    fn set_parameter(&mut self, binding: BindingId, value: f32) {
        let index = binding.0 as usize;
        if let (Some(control), Some(slot)) = (self.controls.get(index), self.values.get_mut(index)) {
            *slot = control.denormalize(value);
        }
    }
}

/// Opens `.pd` files as [`PdEngine`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdEngineFactory;

impl PdEngineFactory {
    /// Read and scan a patch file.
    pub fn load(&self, path: &Path) -> Result<PdEngine> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::invalid_patch(path, e.to_string()))?;
        let controls = scan(&text).map_err(|e| Error::Engine(e.to_string()))?;
        tracing::debug!(path = %path.display(), controls = controls.len(), "scanned pd patch");
        Ok(PdEngine::from_controls(controls))
    }
}

impl EngineFactory for PdEngineFactory {
    fn open(&self, file_name: &str, directory: &Path) -> Result<Box<dyn DspEngine>> {
        Ok(Box::new(self.load(&directory.join(file_name))?))
    }
}
