//! Error types for the patch host core.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the parameter table, patch loading, and state decoding.
///
/// Only [`Error::OutOfRange`] and [`Error::CapacityExceeded`] are returned by
/// table operations. Patch loading and state restore never hand these errors
/// to the host: they are logged and the processor falls back to a defined
/// state.
#[derive(Debug, Error)]
pub enum Error {
    /// Parameter index outside `[0, capacity)`.
    #[error("parameter index {index} out of range (capacity {capacity})")]
    OutOfRange {
        /// Requested index.
        index: usize,
        /// Table capacity.
        capacity: usize,
    },

    /// More slots supplied than the table can hold.
    #[error("{len} parameter slots exceed table capacity {capacity}")]
    CapacityExceeded {
        /// Number of slots supplied.
        len: usize,
        /// Table capacity.
        capacity: usize,
    },

    /// The file is missing, has the wrong extension, or could not be opened.
    #[error("invalid patch file '{path}': {reason}")]
    InvalidPatchFile {
        /// Path that was rejected.
        path: PathBuf,
        /// Why it was rejected.
        reason: String,
    },

    /// The persisted state blob could not be decoded.
    #[error("malformed persisted state: {0}")]
    MalformedState(#[from] serde_json::Error),

    /// The persisted state decoded, but carries a different tag.
    #[error("unexpected persisted state tag '{found}'")]
    UnexpectedStateTag {
        /// Tag found in the container.
        found: String,
    },

    /// The DSP engine failed to build a graph from a patch.
    #[error("engine error: {0}")]
    Engine(String),
}

impl Error {
    /// Create an invalid patch file error.
    pub fn invalid_patch(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::InvalidPatchFile {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_display() {
        let err = Error::OutOfRange {
            index: 40,
            capacity: 32,
        };
        assert_eq!(
            err.to_string(),
            "parameter index 40 out of range (capacity 32)"
        );
    }

    #[test]
    fn invalid_patch_display() {
        let err = Error::invalid_patch("/tmp/synth.txt", "extension is not 'pd'");
        let msg = err.to_string();
        assert!(msg.contains("/tmp/synth.txt"), "got: {msg}");
        assert!(msg.contains("extension"), "got: {msg}");
    }

    #[test]
    fn json_errors_convert() {
        let json_err = serde_json::from_slice::<serde_json::Value>(b"{").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::MalformedState(_)));
    }
}
