//! Error types for dataset loading.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that make the dataset unusable. Always fatal for a run.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The file could not be opened or a record could not be decoded.
    #[error("failed to read dataset {path}: {source}")]
    Read {
        /// Dataset path.
        path: PathBuf,
        /// The underlying CSV/IO error.
        #[source]
        source: csv::Error,
    },

    /// The configured identifier column is not in the header row.
    #[error("dataset {path} has no `{column}` column (found: {available})")]
    MissingColumn {
        /// Dataset path.
        path: PathBuf,
        /// Configured column name.
        column: String,
        /// Comma-separated header names actually present.
        available: String,
    },
}

impl DatasetError {
    /// Creates a read error.
    pub fn read(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }
}
