//! HTTP client wrapper for fetching PDFs.
//!
//! This module provides the `HttpClient` struct which issues one GET per
//! candidate URL, rejects non-PDF bodies as soon as the first bytes arrive, and
//! streams verified bodies to disk.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use futures_util::{Stream, StreamExt};
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, instrument};
use url::Url;

use super::error::{ClientError, FetchError};
use super::storage;
use super::verify::{PDF_MAGIC, PrefixVerdict, check_prefix};
use crate::config::DownloadConfig;

/// HTTP client for fetching PDFs with streaming support.
///
/// Created once per run and shared by every worker, taking advantage of
/// connection pooling. The configured request headers are sent on every GET.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

/// A verified PDF that was stored on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPdf {
    /// HTTP status of the response that produced the file.
    pub status: u16,
    /// Final location of the stored file.
    pub path: PathBuf,
    /// Number of bytes written.
    pub bytes: u64,
}

impl HttpClient {
    /// Creates a client using the timeout and headers of `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if a header is not valid HTTP or the client
    /// cannot be built.
    pub fn new(config: &DownloadConfig) -> Result<Self, ClientError> {
        Self::with_settings(config.timeout, &config.request_headers)
    }

    /// Creates a client with an explicit per-request timeout and header set.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if a header is not valid HTTP or the client
    /// cannot be built.
    #[instrument(level = "debug", skip(headers), fields(header_count = headers.len()))]
    pub fn with_settings(
        timeout: Duration,
        headers: &BTreeMap<String, String>,
    ) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .default_headers(header_map(headers)?)
            .build()
            .map_err(ClientError::Build)?;
        Ok(Self { client })
    }

    /// Fetches `url` and stores the body at `destination` if it is a PDF.
    ///
    /// The body is written to a `.part` sibling and renamed over `destination`
    /// only after the final chunk arrives. On any error the partial file is
    /// removed and `destination` is left as it was.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] describing why no PDF was stored; its
    /// [`FetchError::status_code`] is the classification code for the log.
    #[instrument(skip(self, destination), fields(url = %url))]
    pub async fn fetch_pdf(&self, url: &str, destination: &Path) -> Result<FetchedPdf, FetchError> {
        let parsed = Url::parse(url).map_err(|_| FetchError::invalid_url(url))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FetchError::invalid_url(url));
        }

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            debug!(status = status.as_u16(), "non-success response");
            return Err(FetchError::http_status(url, status.as_u16()));
        }

        let mut stream = response.bytes_stream();
        let head = read_pdf_head(&mut stream, url).await?;

        let part_path = storage::partial_path(destination);
        let written = write_part(&part_path, head, &mut stream, url).await;
        let bytes = match written {
            Ok(bytes) => bytes,
            Err(error) => {
                debug!(path = %part_path.display(), "cleaning up partial file after error");
                let _ = tokio::fs::remove_file(&part_path).await;
                return Err(error);
            }
        };

        if let Err(e) = tokio::fs::rename(&part_path, destination).await {
            let _ = tokio::fs::remove_file(&part_path).await;
            return Err(FetchError::io(url, destination, e));
        }

        debug!(path = %destination.display(), bytes, "stored verified PDF");
        Ok(FetchedPdf {
            status: status.as_u16(),
            path: destination.to_path_buf(),
            bytes,
        })
    }
}

/// Pulls chunks until the magic bytes are confirmed or ruled out.
///
/// Returns the chunks consumed so far so the caller can write them first.
async fn read_pdf_head<S, B>(stream: &mut S, url: &str) -> Result<Vec<B>, FetchError>
where
    S: Stream<Item = reqwest::Result<B>> + Unpin,
    B: AsRef<[u8]>,
{
    let mut prefix = Vec::with_capacity(PDF_MAGIC.len());
    let mut chunks = Vec::new();
    loop {
        match check_prefix(&prefix) {
            PrefixVerdict::Pdf => return Ok(chunks),
            PrefixVerdict::NotPdf => return Err(FetchError::not_pdf(url)),
            PrefixVerdict::NeedMore => {}
        }
        let Some(chunk) = stream.next().await else {
            return Err(FetchError::not_pdf(url));
        };
        let chunk = chunk.map_err(|e| FetchError::from_reqwest(url, e))?;
        let bytes = chunk.as_ref();
        let take = (PDF_MAGIC.len() - prefix.len()).min(bytes.len());
        prefix.extend_from_slice(&bytes[..take]);
        chunks.push(chunk);
    }
}

/// Writes the already-read head chunks and the rest of the body to `path`.
async fn write_part<S, B>(
    path: &Path,
    head: Vec<B>,
    stream: &mut S,
    url: &str,
) -> Result<u64, FetchError>
where
    S: Stream<Item = reqwest::Result<B>> + Unpin,
    B: AsRef<[u8]>,
{
    let file = File::create(path)
        .await
        .map_err(|e| FetchError::io(url, path, e))?;
    let mut writer = BufWriter::new(file);
    let mut bytes_written: u64 = 0;

    for chunk in head {
        writer
            .write_all(chunk.as_ref())
            .await
            .map_err(|e| FetchError::io(url, path, e))?;
        bytes_written += chunk.as_ref().len() as u64;
    }

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| FetchError::from_reqwest(url, e))?;
        writer
            .write_all(chunk.as_ref())
            .await
            .map_err(|e| FetchError::io(url, path, e))?;
        bytes_written += chunk.as_ref().len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| FetchError::io(url, path, e))?;

    Ok(bytes_written)
}

fn header_map(headers: &BTreeMap<String, String>) -> Result<HeaderMap, ClientError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let invalid = || ClientError::InvalidHeader { name: name.clone() };
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
        let header_value = HeaderValue::from_str(value).map_err(|_| invalid())?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_support::socket_guard::start_mock_server_or_skip;
    use crate::user_agent::{BROWSER_USER_AGENT, default_request_headers};
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Match, Mock, Request, ResponseTemplate};

    /// Matches requests carrying the browser User-Agent.
    struct BrowserUaMatcher;

    impl Match for BrowserUaMatcher {
        fn matches(&self, request: &Request) -> bool {
            request
                .headers
                .get("User-Agent")
                .and_then(|v| v.to_str().ok())
                .is_some_and(|ua| ua == BROWSER_USER_AGENT)
        }
    }

    fn test_client(timeout: Duration) -> HttpClient {
        HttpClient::with_settings(timeout, &default_request_headers()).unwrap()
    }

    fn dir_entries(dir: &TempDir) -> Vec<String> {
        std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_header_map_rejects_invalid_name() {
        let mut headers = BTreeMap::new();
        headers.insert("bad header".to_string(), "x".to_string());
        let result = header_map(&headers);
        assert!(matches!(result, Err(ClientError::InvalidHeader { name }) if name == "bad header"));
    }

    #[tokio::test]
    async fn test_fetch_pdf_invalid_url() {
        let temp_dir = TempDir::new().unwrap();
        let client = test_client(Duration::from_secs(5));

        let result = client
            .fetch_pdf("not a url", &temp_dir.path().join("BR1.pdf"))
            .await;
        assert!(matches!(result, Err(FetchError::InvalidUrl { .. })));

        let result = client
            .fetch_pdf("ftp://example.com/a.pdf", &temp_dir.path().join("BR1.pdf"))
            .await;
        assert!(matches!(result, Err(FetchError::InvalidUrl { .. })));
    }

    #[tokio::test]
    async fn test_fetch_pdf_success_writes_file() {
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };
        let temp_dir = TempDir::new().unwrap();

        Mock::given(method("GET"))
            .and(path("/report.pdf"))
            .and(BrowserUaMatcher)
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.7 body".to_vec()))
            .mount(&mock_server)
            .await;

        let client = test_client(Duration::from_secs(5));
        let destination = temp_dir.path().join("BR1.pdf");
        let url = format!("{}/report.pdf", mock_server.uri());

        let fetched = client.fetch_pdf(&url, &destination).await.unwrap();
        assert_eq!(fetched.status, 200);
        assert_eq!(fetched.bytes, 13);
        assert_eq!(std::fs::read(&destination).unwrap(), b"%PDF-1.7 body");
        assert_eq!(dir_entries(&temp_dir), vec!["BR1.pdf".to_string()]);
    }

    #[tokio::test]
    async fn test_fetch_pdf_overwrites_leftover() {
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };
        let temp_dir = TempDir::new().unwrap();
        let destination = temp_dir.path().join("BR1.pdf");
        std::fs::write(&destination, b"stale partial").unwrap();

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-fresh".to_vec()))
            .mount(&mock_server)
            .await;

        let client = test_client(Duration::from_secs(5));
        client
            .fetch_pdf(&format!("{}/a.pdf", mock_server.uri()), &destination)
            .await
            .unwrap();
        assert_eq!(std::fs::read(&destination).unwrap(), b"%PDF-fresh");
    }

    #[tokio::test]
    async fn test_fetch_pdf_http_error_status() {
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };
        let temp_dir = TempDir::new().unwrap();

        Mock::given(method("GET"))
            .and(path("/missing.pdf"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let client = test_client(Duration::from_secs(5));
        let url = format!("{}/missing.pdf", mock_server.uri());

        let result = client.fetch_pdf(&url, &temp_dir.path().join("BR1.pdf")).await;
        match result {
            Err(FetchError::HttpStatus { status, .. }) => assert_eq!(status, 404),
            other => panic!("Expected HttpStatus error, got: {other:?}"),
        }
        assert!(dir_entries(&temp_dir).is_empty());
    }

    #[tokio::test]
    async fn test_fetch_pdf_rejects_html_without_file() {
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };
        let temp_dir = TempDir::new().unwrap();

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("<!DOCTYPE html><html></html>"),
            )
            .mount(&mock_server)
            .await;

        let client = test_client(Duration::from_secs(5));
        let url = format!("{}/landing", mock_server.uri());

        let result = client.fetch_pdf(&url, &temp_dir.path().join("BR1.pdf")).await;
        assert!(matches!(result, Err(FetchError::NotPdf { .. })));
        assert!(dir_entries(&temp_dir).is_empty());
    }

    #[tokio::test]
    async fn test_fetch_pdf_rejects_empty_and_truncated_body() {
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };
        let temp_dir = TempDir::new().unwrap();

        Mock::given(method("GET"))
            .and(path("/empty"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/short"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF".to_vec()))
            .mount(&mock_server)
            .await;

        let client = test_client(Duration::from_secs(5));
        for route in ["empty", "short"] {
            let url = format!("{}/{route}", mock_server.uri());
            let result = client.fetch_pdf(&url, &temp_dir.path().join("BR1.pdf")).await;
            assert!(
                matches!(result, Err(FetchError::NotPdf { .. })),
                "{route}: {result:?}"
            );
        }
        assert!(dir_entries(&temp_dir).is_empty());
    }

    #[tokio::test]
    async fn test_fetch_pdf_timeout_leaves_no_file() {
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };
        let temp_dir = TempDir::new().unwrap();

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(b"%PDF-late".to_vec())
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&mock_server)
            .await;

        let client = test_client(Duration::from_secs(1));
        let url = format!("{}/slow.pdf", mock_server.uri());

        let result = client.fetch_pdf(&url, &temp_dir.path().join("BR1.pdf")).await;
        assert!(matches!(result, Err(FetchError::Timeout { .. })), "{result:?}");
        assert!(dir_entries(&temp_dir).is_empty());
    }

    #[tokio::test]
    async fn test_fetch_pdf_storage_failure_is_io_error() {
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };
        let temp_dir = TempDir::new().unwrap();

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.4".to_vec()))
            .mount(&mock_server)
            .await;

        let client = test_client(Duration::from_secs(5));
        let destination = temp_dir.path().join("no-such-dir").join("BR1.pdf");
        let url = format!("{}/a.pdf", mock_server.uri());

        let result = client.fetch_pdf(&url, &destination).await;
        match result {
            Err(error @ FetchError::Io { .. }) => assert_eq!(error.status_code(), 500),
            other => panic!("Expected Io error, got: {other:?}"),
        }
    }
}
