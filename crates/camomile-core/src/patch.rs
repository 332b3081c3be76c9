//! Patch handles and patch-file validation.

use std::path::{Path, PathBuf};

use crate::engine::{AudioConfig, DspEngine, EngineFactory, GuiElement};
use crate::error::{Error, Result};
use crate::param::{BindingId, ParameterBinding};

/// Where the processor is in the load state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PatchState {
    /// No patch installed.
    Unloaded = 0,
    /// A load is in progress; rendering is suspended.
    Loading = 1,
    /// A patch is installed.
    Loaded = 2,
}

impl PatchState {
    pub(crate) fn from_u8(raw: u8) -> Self {
        match raw {
            1 => PatchState::Loading,
            2 => PatchState::Loaded,
            _ => PatchState::Unloaded,
        }
    }
}

/// Check that `path` is an existing file with extension `extension`.
///
/// Returns the file name and the absolute parent directory, the two
/// fields that identify a patch.
pub fn validate_patch_file(path: &Path, extension: &str) -> Result<(String, PathBuf)> {
    if !path.is_file() {
        return Err(Error::invalid_patch(path, "file does not exist"));
    }
    if path.extension().and_then(|e| e.to_str()) != Some(extension) {
        return Err(Error::invalid_patch(
            path,
            format!("extension is not '{extension}'"),
        ));
    }
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::invalid_patch(path, "file name is not valid UTF-8"))?
        .to_string();
    // Saved state records the directory, so it must not depend on the
    // working directory and must survive a UTF-8 round trip.
    let absolute = std::path::absolute(path)
        .map_err(|err| Error::invalid_patch(path, format!("cannot resolve path: {err}")))?;
    let directory = absolute
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    if directory.to_str().is_none() {
        return Err(Error::invalid_patch(path, "directory is not valid UTF-8"));
    }
    Ok((file_name, directory))
}

struct LoadedPatch {
    name: String,
    directory: PathBuf,
    engine: Box<dyn DspEngine>,
}

/// Either "no patch" or a loaded patch and the engine running it.
///
/// The name, directory, and discovered bindings of a handle never change.
/// Loading a different patch builds a new handle.
#[derive(Default)]
pub struct PatchHandle {
    loaded: Option<LoadedPatch>,
}

impl PatchHandle {
    /// The null handle.
    pub fn unloaded() -> Self {
        Self::default()
    }

    /// Validate `path` and build a handle through `factory`.
    pub fn open(path: &Path, extension: &str, factory: &dyn EngineFactory) -> Result<Self> {
        let (name, directory) = validate_patch_file(path, extension)?;
        let engine = factory.open(&name, &directory)?;
        Ok(Self {
            loaded: Some(LoadedPatch {
                name,
                directory,
                engine,
            }),
        })
    }

    /// Whether a patch is loaded.
    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    /// Patch file name, or `""`.
    pub fn name(&self) -> &str {
        self.loaded.as_ref().map_or("", |p| p.name.as_str())
    }

    /// Directory containing the patch, or an empty path.
    pub fn directory(&self) -> &Path {
        self.loaded
            .as_ref()
            .map_or(Path::new(""), |p| p.directory.as_path())
    }

    /// GUI elements discovered in the patch, in discovery order.
    pub fn gui_elements(&self) -> &[GuiElement] {
        match &self.loaded {
            Some(patch) => patch.engine.gui_elements(),
            None => &[],
        }
    }

    /// Every parameter binding: elements in order, then each element's parameters in order.
    pub fn parameters(&self) -> impl Iterator<Item = &ParameterBinding> {
        self.gui_elements()
            .iter()
            .flat_map(|element| element.parameters.iter())
    }

    pub(crate) fn prepare(&mut self, config: &AudioConfig) {
        if let Some(patch) = &mut self.loaded {
            patch.engine.prepare(config);
        }
    }

    pub(crate) fn release(&mut self) {
        if let Some(patch) = &mut self.loaded {
            patch.engine.release();
        }
    }

    /// Render through the engine. Returns `false` (buffer untouched) when unloaded.
    pub(crate) fn process(&mut self, frames: usize, inputs: usize, channels: &mut [&mut [f32]]) -> bool {
        match &mut self.loaded {
            Some(patch) => {
                patch.engine.process(frames, inputs, channels);
                true
            }
            None => false,
        }
    }

    pub(crate) fn set_parameter(&mut self, binding: BindingId, value: f32) {
        if let Some(patch) = &mut self.loaded {
            patch.engine.set_parameter(binding, value);
        }
    }
}

impl std::fmt::Debug for PatchHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.loaded {
            Some(patch) => f
                .debug_struct("PatchHandle")
                .field("name", &patch.name)
                .field("directory", &patch.directory)
                .field("gui_elements", &patch.engine.gui_elements().len())
                .finish(),
            None => f.write_str("PatchHandle(unloaded)"),
        }
    }
}
