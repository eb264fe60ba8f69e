//! Work item and resume policy definitions.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::download::DownloadOutcome;

/// One row scheduled for download: its identifier and ordered candidate URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    /// Row identifier.
    pub id: String,
    /// Candidate URLs in fallback order; never empty when built by the queue.
    pub urls: Vec<String>,
}

impl WorkItem {
    /// Creates a work item.
    pub fn new(id: impl Into<String>, urls: Vec<String>) -> Self {
        Self { id: id.into(), urls }
    }
}

/// Which logged rows are eligible for another attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResumePolicy {
    /// Any row already in the log is skipped.
    #[default]
    SkipLogged,
    /// Rows logged as failures are attempted again; successes are skipped.
    RetryFailed,
}

impl ResumePolicy {
    /// Returns the config/CLI spelling.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SkipLogged => "skip-logged",
            Self::RetryFailed => "retry-failed",
        }
    }

    /// Whether a row with this prior log entry is left out of the queue.
    #[must_use]
    pub fn should_skip(self, logged: Option<&DownloadOutcome>) -> bool {
        match (self, logged) {
            (_, None) => false,
            (Self::SkipLogged, Some(_)) => true,
            (Self::RetryFailed, Some(outcome)) => outcome.success,
        }
    }
}

impl fmt::Display for ResumePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ResumePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "skip-logged" => Ok(Self::SkipLogged),
            "retry-failed" => Ok(Self::RetryFailed),
            _ => Err(format!("invalid resume policy: {s}")),
        }
    }
}
