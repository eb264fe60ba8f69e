//! Error types for the status log.

use std::path::PathBuf;

use thiserror::Error;

/// Errors reading or writing the status log.
///
/// Both directions are fatal for a run: continuing without a readable or
/// writable log would lose the resumption record.
#[derive(Debug, Error)]
pub enum StatusError {
    /// The log exists but could not be read.
    #[error("failed to read status log {path}: {source}")]
    Read {
        /// Log path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The log is not a JSON object of `[bool, int, string]` entries.
    #[error("status log {path} is malformed: {source}")]
    Parse {
        /// Log path.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The log could not be written.
    #[error("failed to write status log {path}: {source}")]
    Write {
        /// Log path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl StatusError {
    /// Creates a write error.
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}
