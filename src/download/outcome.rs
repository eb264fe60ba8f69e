//! Per-row download outcome and its classification codes.

use serde::{Deserialize, Serialize};

use super::FetchError;

/// Candidate URL could not be parsed or sent.
pub const STATUS_INVALID_URL: u16 = 400;

/// Request timed out.
pub const STATUS_TIMEOUT: u16 = 408;

/// Server answered with success but the body is not a PDF.
pub const STATUS_NOT_PDF: u16 = 415;

/// Generic transport failure, or the verified PDF could not be stored.
pub const STATUS_TRANSPORT_ERROR: u16 = 500;

/// Connection could not be established.
pub const STATUS_CONNECTION_ERROR: u16 = 503;

/// Recorded result of attempting one row.
///
/// Serialized as the 3-element array `[success, status_code, url_used]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(bool, u16, String)", into = "(bool, u16, String)")]
pub struct DownloadOutcome {
    /// Whether a verified PDF was stored.
    pub success: bool,
    /// HTTP status on success, classification code on failure.
    pub status_code: u16,
    /// Candidate URL the outcome refers to.
    pub url_used: String,
}

impl DownloadOutcome {
    /// Creates a successful outcome.
    pub fn success(status_code: u16, url_used: impl Into<String>) -> Self {
        Self {
            success: true,
            status_code,
            url_used: url_used.into(),
        }
    }

    /// Creates a failed outcome.
    pub fn failure(status_code: u16, url_used: impl Into<String>) -> Self {
        Self {
            success: false,
            status_code,
            url_used: url_used.into(),
        }
    }
}

impl From<&FetchError> for DownloadOutcome {
    fn from(error: &FetchError) -> Self {
        Self::failure(error.status_code(), error.url())
    }
}

impl From<(bool, u16, String)> for DownloadOutcome {
    fn from((success, status_code, url_used): (bool, u16, String)) -> Self {
        Self {
            success,
            status_code,
            url_used,
        }
    }
}

impl From<DownloadOutcome> for (bool, u16, String) {
    fn from(outcome: DownloadOutcome) -> Self {
        (outcome.success, outcome.status_code, outcome.url_used)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_serializes_as_triple() {
        let outcome = DownloadOutcome::success(200, "http://a/x.pdf");
        let json = serde_json::to_string(&outcome).unwrap();
        assert_eq!(json, r#"[true,200,"http://a/x.pdf"]"#);
    }

    #[test]
    fn test_outcome_deserializes_from_triple() {
        let outcome: DownloadOutcome = serde_json::from_str(r#"[false, 404, "http://b"]"#).unwrap();
        assert_eq!(outcome, DownloadOutcome::failure(404, "http://b"));
    }

    #[test]
    fn test_outcome_rejects_wrong_shape() {
        assert!(serde_json::from_str::<DownloadOutcome>(r#"[true, 200]"#).is_err());
        assert!(serde_json::from_str::<DownloadOutcome>(r#"{"success": true}"#).is_err());
        assert!(serde_json::from_str::<DownloadOutcome>(r#"[true, -1, "u"]"#).is_err());
    }

    #[test]
    fn test_outcome_from_fetch_error() {
        let error = FetchError::not_pdf("http://a/landing.html");
        let outcome = DownloadOutcome::from(&error);
        assert!(!outcome.success);
        assert_eq!(outcome.status_code, STATUS_NOT_PDF);
        assert_eq!(outcome.url_used, "http://a/landing.html");
    }
}
