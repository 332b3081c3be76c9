//! Persisted plugin state.
//!
//! The only thing a Camomile instance persists is which patch it has loaded:
//! the file name and its directory. The host stores the encoded blob in its
//! session and hands it back on restore.
//!
//! # Format
//!
//! ```json
//! {"tag": "CamomileSettings", "name": "synth.pd", "path": "/home/me/patches"}
//! ```
//!
//! Missing `name`/`path` fields decode as empty strings; a missing or
//! different `tag` is rejected.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Tag identifying a Camomile state container.
pub const STATE_TAG: &str = "CamomileSettings";

#[derive(Serialize, Deserialize)]
struct Container {
    tag: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    path: String,
}

/// Identity of the loaded patch, as persisted in host sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SavedPatch {
    /// Patch file name (e.g. `synth.pd`), or empty when no patch is loaded.
    pub name: String,
    /// Directory containing the patch, or empty.
    pub path: String,
}

impl SavedPatch {
    /// Build from a patch name and directory.
    ///
    /// Loading rejects non-UTF-8 directories, so the lossy conversion only
    /// matters for paths that never came from a load.
    pub fn new(name: impl Into<String>, path: &Path) -> Self {
        Self {
            name: name.into(),
            path: path.to_string_lossy().into_owned(),
        }
    }

    /// Encode into a tagged container.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let container = Container {
            tag: STATE_TAG.to_string(),
            name: self.name.clone(),
            path: self.path.clone(),
        };
        Ok(serde_json::to_vec(&container)?)
    }

    /// Decode a tagged container, rejecting anything not tagged [`STATE_TAG`].
    pub fn decode(data: &[u8]) -> Result<Self> {
        let container: Container = serde_json::from_slice(data)?;
        if container.tag != STATE_TAG {
            return Err(Error::UnexpectedStateTag {
                found: container.tag,
            });
        }
        Ok(Self {
            name: container.name,
            path: container.path,
        })
    }

    /// The patch file this state refers to: `path` joined with `name`.
    pub fn file_path(&self) -> PathBuf {
        Path::new(&self.path).join(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_roundtrip() {
        let saved = SavedPatch::new("synth.pd", Path::new("/patches/bass"));
        let bytes = saved.encode().unwrap();
        let decoded = SavedPatch::decode(&bytes).unwrap();
        assert_eq!(decoded, saved);
        assert_eq!(decoded.file_path(), Path::new("/patches/bass/synth.pd"));
    }

    #[test]
    fn encoded_container_carries_tag() {
        let bytes = SavedPatch::default().encode().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["tag"], STATE_TAG);
        assert_eq!(value["name"], "");
        assert_eq!(value["path"], "");
    }

    #[test]
    fn wrong_tag_rejected() {
        let err = SavedPatch::decode(br#"{"tag": "OtherPlugin", "name": "a.pd", "path": "/"}"#)
            .unwrap_err();
        assert!(matches!(err, Error::UnexpectedStateTag { ref found } if found == "OtherPlugin"));
    }

    #[test]
    fn missing_tag_rejected() {
        let err = SavedPatch::decode(br#"{"name": "a.pd", "path": "/"}"#).unwrap_err();
        assert!(matches!(err, Error::MalformedState(_)));
    }

    #[test]
    fn garbage_rejected() {
        assert!(SavedPatch::decode(b"\x00\x01garbage").is_err());
        assert!(SavedPatch::decode(b"").is_err());
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let saved = SavedPatch::decode(br#"{"tag": "CamomileSettings"}"#).unwrap();
        assert_eq!(saved, SavedPatch::default());
    }
}
