//! Per-row fetch worker with candidate URL fallback.

use std::path::{Path, PathBuf};

use tracing::{info, instrument, warn};

use super::client::HttpClient;
use super::outcome::{DownloadOutcome, STATUS_INVALID_URL};
use super::storage;

/// Fetches one row's PDF by trying its candidate URLs in order.
#[derive(Debug, Clone)]
pub struct PdfFetcher {
    client: HttpClient,
    downloads_dir: PathBuf,
}

impl PdfFetcher {
    /// Creates a fetcher that stores PDFs under `downloads_dir`.
    pub fn new(client: HttpClient, downloads_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            downloads_dir: downloads_dir.into(),
        }
    }

    /// Directory verified PDFs are written to.
    #[must_use]
    pub fn downloads_dir(&self) -> &Path {
        &self.downloads_dir
    }

    /// Attempts `urls` in order and returns the outcome for row `id`.
    ///
    /// Stops at the first candidate that yields a verified PDF. When every
    /// candidate fails, the outcome of the last attempt is returned. Never
    /// fails: every error is folded into the returned outcome.
    #[instrument(skip(self, urls), fields(candidates = urls.len()))]
    pub async fn download(&self, id: &str, urls: &[String]) -> DownloadOutcome {
        let destination = storage::pdf_path(&self.downloads_dir, id);

        let mut last_failure = None;
        for url in urls {
            match self.client.fetch_pdf(url, &destination).await {
                Ok(fetched) => {
                    info!(id, url = %url, bytes = fetched.bytes, "downloaded PDF");
                    return DownloadOutcome::success(fetched.status, url.as_str());
                }
                Err(error) => {
                    warn!(id, code = error.status_code(), error = %error, "candidate failed");
                    last_failure = Some(DownloadOutcome::from(&error));
                }
            }
        }

        last_failure.unwrap_or_else(|| {
            warn!(id, "row has no candidate URLs");
            DownloadOutcome::failure(STATUS_INVALID_URL, "")
        })
    }
}
