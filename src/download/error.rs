//! Error types for the download module.
//!
//! [`FetchError`] is the explicit result of one GET attempt. Every variant maps
//! to the classification code recorded in the status log, so the worker never
//! needs to inspect transport errors itself.

use std::path::PathBuf;

use thiserror::Error;

use super::outcome::{
    STATUS_CONNECTION_ERROR, STATUS_INVALID_URL, STATUS_NOT_PDF, STATUS_TIMEOUT,
    STATUS_TRANSPORT_ERROR,
};

/// Why a single candidate URL did not yield a stored PDF.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The URL could not be parsed or uses a scheme the client cannot send.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// Request timed out before the body was complete.
    #[error("timeout downloading {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// Connection could not be established (DNS, refused, reset).
    #[error("connection error downloading {url}: {source}")]
    Connection {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Any other transport or protocol failure.
    #[error("network error downloading {url}: {source}")]
    Transport {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Server answered with a non-success status.
    #[error("HTTP {status} downloading {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// Server answered with success but the body is not a PDF.
    #[error("content at {url} is not a PDF")]
    NotPdf {
        /// The URL whose body failed verification.
        url: String,
    },

    /// A verified PDF could not be written to storage.
    #[error("IO error writing {path} from {url}: {source}")]
    Io {
        /// The URL being stored.
        url: String,
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    /// Classifies a reqwest error raised while sending or reading a response.
    pub fn from_reqwest(url: impl Into<String>, source: reqwest::Error) -> Self {
        let url = url.into();
        if source.is_timeout() {
            Self::Timeout { url }
        } else if source.is_builder() {
            Self::InvalidUrl { url }
        } else if source.is_connect() {
            Self::Connection { url, source }
        } else {
            Self::Transport { url, source }
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a content verification error.
    pub fn not_pdf(url: impl Into<String>) -> Self {
        Self::NotPdf { url: url.into() }
    }

    /// Creates an IO error.
    pub fn io(url: impl Into<String>, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            url: url.into(),
            path: path.into(),
            source,
        }
    }

    /// Classification code recorded in the status log for this failure.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidUrl { .. } => STATUS_INVALID_URL,
            Self::Timeout { .. } => STATUS_TIMEOUT,
            Self::Connection { .. } => STATUS_CONNECTION_ERROR,
            Self::Transport { .. } | Self::Io { .. } => STATUS_TRANSPORT_ERROR,
            Self::HttpStatus { status, .. } => *status,
            Self::NotPdf { .. } => STATUS_NOT_PDF,
        }
    }

    /// The candidate URL this error belongs to.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::InvalidUrl { url }
            | Self::Timeout { url }
            | Self::Connection { url, .. }
            | Self::Transport { url, .. }
            | Self::HttpStatus { url, .. }
            | Self::NotPdf { url }
            | Self::Io { url, .. } => url,
        }
    }
}

/// Errors building the shared HTTP client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A configured header name or value is not valid HTTP.
    #[error("invalid request header '{name}'")]
    InvalidHeader {
        /// Offending header name.
        name: String,
    },

    /// reqwest rejected the client configuration.
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_per_variant() {
        assert_eq!(FetchError::invalid_url("nope").status_code(), 400);
        assert_eq!(
            FetchError::Timeout {
                url: "http://a".into()
            }
            .status_code(),
            408
        );
        assert_eq!(FetchError::http_status("http://a", 404).status_code(), 404);
        assert_eq!(FetchError::http_status("http://a", 403).status_code(), 403);
        assert_eq!(FetchError::http_status("http://a", 502).status_code(), 502);
        assert_eq!(FetchError::not_pdf("http://a").status_code(), 415);
        let io_error = std::io::Error::new(std::io::ErrorKind::StorageFull, "disk full");
        assert_eq!(
            FetchError::io("http://a", "/tmp/x.pdf", io_error).status_code(),
            500
        );
    }

    #[test]
    fn test_url_accessor_returns_candidate() {
        let error = FetchError::http_status("https://example.com/report.pdf", 404);
        assert_eq!(error.url(), "https://example.com/report.pdf");
    }

    #[test]
    fn test_http_status_display() {
        let error = FetchError::http_status("https://example.com/report.pdf", 404);
        let msg = error.to_string();
        assert!(msg.contains("404"), "Expected '404' in: {msg}");
        assert!(
            msg.contains("https://example.com/report.pdf"),
            "Expected URL in: {msg}"
        );
    }

    #[test]
    fn test_io_display_contains_path() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let error = FetchError::io("https://example.com/a.pdf", "/tmp/BR1.pdf", io_error);
        let msg = error.to_string();
        assert!(msg.contains("/tmp/BR1.pdf"), "Expected path in: {msg}");
    }

    #[test]
    fn test_invalid_header_display() {
        let error = ClientError::InvalidHeader {
            name: "bad header".to_string(),
        };
        assert!(error.to_string().contains("bad header"));
    }
}
