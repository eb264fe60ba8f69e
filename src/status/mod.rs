//! Durable per-row status log backing resumption.
//!
//! The log is a JSON object mapping each attempted row identifier to its
//! [`DownloadOutcome`], serialized as `[success, status_code, url_used]`:
//!
//! ```json
//! {
//!   "BR50041": [true, 200, "https://example.com/report.pdf"],
//!   "BR50042": [false, 404, "https://example.com/missing.pdf"]
//! }
//! ```
//!
//! [`StatusStore`] keeps the mapping in memory behind a mutex and rewrites the
//! whole file after every merge. Writes go to a `.tmp` sibling that is renamed
//! over the log, so a crash never leaves a truncated log behind.

mod error;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

pub use error::StatusError;

use crate::download::DownloadOutcome;

/// Row identifier to outcome. Ordered so the file is stable across runs.
pub type StatusLog = BTreeMap<String, DownloadOutcome>;

const TEMP_SUFFIX: &str = ".tmp";

/// Mutex-guarded status log bound to its file.
///
/// All mutations are serialized: the lock is held across the in-memory merge
/// and the file write, so concurrent completions can never race on the file.
#[derive(Debug)]
pub struct StatusStore {
    path: PathBuf,
    entries: Mutex<StatusLog>,
}

impl StatusStore {
    /// Opens the log at `path`, reading any prior entries.
    ///
    /// A missing or blank file yields an empty store; the file is only
    /// created by the first merge.
    ///
    /// # Errors
    ///
    /// Returns [`StatusError::Read`] or [`StatusError::Parse`] if an existing
    /// log cannot be used.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self, StatusError> {
        let path = path.into();
        let entries = read_status_log(&path).await?;
        info!(path = %path.display(), entries = entries.len(), "loaded status log");
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Location of the durable log.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Copy of the current mapping.
    pub async fn snapshot(&self) -> StatusLog {
        self.entries.lock().await.clone()
    }

    /// Number of logged rows.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Whether no row has been logged yet.
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    /// Records `outcome` for `id` and rewrites the log.
    ///
    /// Existing entries for other ids are kept; an entry for the same id is
    /// replaced.
    ///
    /// # Errors
    ///
    /// Returns [`StatusError::Write`] if the log cannot be persisted. The
    /// in-memory entry is kept so the next merge writes it too.
    #[instrument(level = "debug", skip(self, outcome), fields(success = outcome.success, code = outcome.status_code))]
    pub async fn merge_and_persist(
        &self,
        id: &str,
        outcome: DownloadOutcome,
    ) -> Result<(), StatusError> {
        let mut entries = self.entries.lock().await;
        entries.insert(id.to_string(), outcome);
        write_status_log(&self.path, &entries).await
    }
}

/// Reads a status log, treating a missing or blank file as empty.
///
/// # Errors
///
/// Returns [`StatusError::Read`] or [`StatusError::Parse`].
pub async fn read_status_log(path: &Path) -> Result<StatusLog, StatusError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no status log yet");
            return Ok(StatusLog::new());
        }
        Err(source) => {
            return Err(StatusError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(StatusLog::new());
    }
    serde_json::from_slice(&bytes).map_err(|source| StatusError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Atomically replaces the log at `path` with `entries`.
///
/// # Errors
///
/// Returns [`StatusError::Write`].
pub async fn write_status_log(path: &Path, entries: &StatusLog) -> Result<(), StatusError> {
    let json = serde_json::to_vec_pretty(entries)
        .map_err(|e| StatusError::write(path, std::io::Error::other(e)))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| StatusError::write(parent, e))?;
    }

    let mut temp_name = path.as_os_str().to_os_string();
    temp_name.push(TEMP_SUFFIX);
    let temp_path = PathBuf::from(temp_name);

    if let Err(error) = write_temp(&temp_path, &json).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(error);
    }
    if let Err(e) = tokio::fs::rename(&temp_path, path).await {
        debug!(path = %temp_path.display(), "cleaning up temp log after failed rename");
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(StatusError::write(path, e));
    }
    debug!(path = %path.display(), entries = entries.len(), "persisted status log");
    Ok(())
}

async fn write_temp(temp_path: &Path, json: &[u8]) -> Result<(), StatusError> {
    let mut file = tokio::fs::File::create(temp_path)
        .await
        .map_err(|e| StatusError::write(temp_path, e))?;
    file.write_all(json)
        .await
        .map_err(|e| StatusError::write(temp_path, e))?;
    file.sync_all()
        .await
        .map_err(|e| StatusError::write(temp_path, e))
}
