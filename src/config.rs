//! Run configuration.
//!
//! The core consumes two immutable records, [`DataSourceConfig`] and
//! [`DownloadConfig`], built once at startup. They are resolved from an
//! optional TOML file ([`FileConfig`]) whose values the CLI may override;
//! anything left unset falls back to the built-in defaults below.
//!
//! ```toml
//! [data]
//! data_file = "data/reports.csv"
//! log_file = "logs/log.json"
//! id_column = "BRnum"
//!
//! [download]
//! downloads_dir = "downloads"
//! timeout_secs = 5
//! workers = 32
//! batch_size = 20
//! strategy = "concurrent"
//! resume_policy = "skip-logged"
//!
//! [download.headers]
//! user-agent = "Mozilla/5.0 ..."
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::header::{HeaderName, HeaderValue};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::download::ExecutionStrategy;
use crate::queue::ResumePolicy;
use crate::user_agent::{default_request_headers, ensure_user_agent};

/// Default dataset location.
pub const DEFAULT_DATA_FILE: &str = "data/GRI_2017_2020.csv";

/// Default status log location.
pub const DEFAULT_LOG_FILE: &str = "logs/log.json";

/// Default download destination directory.
pub const DEFAULT_DOWNLOADS_DIR: &str = "downloads";

/// Default identifier column.
pub const DEFAULT_ID_COLUMN: &str = "BRnum";

/// Default primary URL column.
pub const DEFAULT_PRIMARY_URL_COLUMN: &str = "Pdf_URL";

/// Default fallback URL column.
pub const DEFAULT_SECONDARY_URL_COLUMN: &str = "Report Html Address";

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Maximum accepted per-request timeout in seconds.
pub const MAX_TIMEOUT_SECS: u64 = 3600;

/// Default worker pool size for the concurrent strategy.
pub const DEFAULT_WORKERS: usize = 32;

/// Maximum accepted worker pool size.
pub const MAX_WORKERS: usize = 256;

/// Default number of rows processed per run. `0` in config means "no limit".
pub const DEFAULT_BATCH_SIZE: usize = 20;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// Path of the config file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML or has unexpected keys/types.
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        /// Path of the config file.
        path: PathBuf,
        /// The underlying TOML error.
        #[source]
        source: toml::de::Error,
    },

    /// A value is outside its accepted range or malformed.
    #[error("invalid config value for `{field}`: {message}")]
    InvalidValue {
        /// Config key that failed validation.
        field: &'static str,
        /// Human readable reason.
        message: String,
    },
}

impl ConfigError {
    /// Creates an invalid value error.
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            message: message.into(),
        }
    }
}

/// Where rows come from and where the status log lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSourceConfig {
    /// Delimited text file holding the dataset.
    pub data_file: PathBuf,
    /// JSON status log used for resumption.
    pub log_file: PathBuf,
    /// Column holding the row identifier.
    pub id_column: String,
    /// Column holding the preferred PDF URL.
    pub primary_url_column: String,
    /// Column holding the fallback URL.
    pub secondary_url_column: String,
    /// Field delimiter; inferred from the file extension when `None`.
    pub delimiter: Option<u8>,
}

impl Default for DataSourceConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            id_column: DEFAULT_ID_COLUMN.to_string(),
            primary_url_column: DEFAULT_PRIMARY_URL_COLUMN.to_string(),
            secondary_url_column: DEFAULT_SECONDARY_URL_COLUMN.to_string(),
            delimiter: None,
        }
    }
}

/// How downloads are fetched, stored and scheduled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadConfig {
    /// Directory receiving `{id}.pdf` files.
    pub downloads_dir: PathBuf,
    /// Fixed timeout applied to every HTTP request, body included.
    pub timeout: Duration,
    /// Worker pool size for the concurrent strategy.
    pub workers: usize,
    /// Maximum rows taken from the work queue per run; `None` takes all.
    pub batch_size: Option<usize>,
    /// Headers sent with every request. Always carries a User-Agent.
    pub request_headers: BTreeMap<String, String>,
    /// Sequential or concurrent execution.
    pub strategy: ExecutionStrategy,
    /// Whether logged failures are attempted again.
    pub resume_policy: ResumePolicy,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            downloads_dir: PathBuf::from(DEFAULT_DOWNLOADS_DIR),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            workers: DEFAULT_WORKERS,
            batch_size: Some(DEFAULT_BATCH_SIZE),
            request_headers: default_request_headers(),
            strategy: ExecutionStrategy::default(),
            resume_policy: ResumePolicy::default(),
        }
    }
}

impl DownloadConfig {
    /// Validates values against runtime constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let timeout_secs = self.timeout.as_secs();
        if self.timeout.is_zero() || timeout_secs > MAX_TIMEOUT_SECS {
            return Err(ConfigError::invalid(
                "timeout_secs",
                format!("{timeout_secs}. Expected range: 1..={MAX_TIMEOUT_SECS}"),
            ));
        }
        if !(1..=MAX_WORKERS).contains(&self.workers) {
            return Err(ConfigError::invalid(
                "workers",
                format!("{}. Expected range: 1..={MAX_WORKERS}", self.workers),
            ));
        }
        if self.batch_size == Some(0) {
            return Err(ConfigError::invalid(
                "batch_size",
                "0. Use no limit instead of a zero-sized batch",
            ));
        }
        for (name, value) in &self.request_headers {
            HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| ConfigError::invalid("headers", format!("bad header name '{name}'")))?;
            HeaderValue::from_str(value).map_err(|_| {
                ConfigError::invalid("headers", format!("bad value for header '{name}'"))
            })?;
        }
        Ok(())
    }
}

/// `[data]` table of the config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataSection {
    /// Dataset path.
    pub data_file: Option<PathBuf>,
    /// Status log path.
    pub log_file: Option<PathBuf>,
    /// Identifier column name.
    pub id_column: Option<String>,
    /// Primary URL column name.
    pub primary_url_column: Option<String>,
    /// Fallback URL column name.
    pub secondary_url_column: Option<String>,
    /// Single ASCII character, e.g. `","` or `"\t"`.
    pub delimiter: Option<String>,
}

/// `[download]` table of the config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DownloadSection {
    /// Directory receiving `{id}.pdf` files.
    pub downloads_dir: Option<PathBuf>,
    /// Per-request timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Worker pool size.
    pub workers: Option<usize>,
    /// `0` processes every pending row.
    pub batch_size: Option<usize>,
    /// `"sequential"` or `"concurrent"`.
    pub strategy: Option<ExecutionStrategy>,
    /// `"skip-logged"` or `"retry-failed"`.
    pub resume_policy: Option<ResumePolicy>,
    /// Request headers; replaces the defaults, a User-Agent is still added.
    pub headers: Option<BTreeMap<String, String>>,
}

/// TOML-backed configuration with every value optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// The `[data]` table.
    #[serde(default)]
    pub data: DataSection,
    /// The `[download]` table.
    #[serde(default)]
    pub download: DownloadSection,
}

impl FileConfig {
    /// Loads a config file from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] or [`ConfigError::Parse`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    /// Parses config text.
    ///
    /// # Errors
    ///
    /// Returns the TOML deserialization error.
    pub fn parse(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Resolves defaults and validates, producing the two immutable records.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when a value fails validation.
    pub fn resolve(self) -> Result<(DataSourceConfig, DownloadConfig), ConfigError> {
        let data_defaults = DataSourceConfig::default();
        let delimiter = self
            .data
            .delimiter
            .as_deref()
            .map(parse_delimiter)
            .transpose()?;
        let data = DataSourceConfig {
            data_file: self.data.data_file.unwrap_or(data_defaults.data_file),
            log_file: self.data.log_file.unwrap_or(data_defaults.log_file),
            id_column: self.data.id_column.unwrap_or(data_defaults.id_column),
            primary_url_column: self
                .data
                .primary_url_column
                .unwrap_or(data_defaults.primary_url_column),
            secondary_url_column: self
                .data
                .secondary_url_column
                .unwrap_or(data_defaults.secondary_url_column),
            delimiter,
        };

        let download_defaults = DownloadConfig::default();
        let mut request_headers = self
            .download
            .headers
            .unwrap_or(download_defaults.request_headers);
        ensure_user_agent(&mut request_headers);
        let batch_size = match self.download.batch_size {
            Some(0) => None,
            Some(limit) => Some(limit),
            None => download_defaults.batch_size,
        };
        let download = DownloadConfig {
            downloads_dir: self
                .download
                .downloads_dir
                .unwrap_or(download_defaults.downloads_dir),
            timeout: self
                .download
                .timeout_secs
                .map_or(download_defaults.timeout, Duration::from_secs),
            workers: self.download.workers.unwrap_or(download_defaults.workers),
            batch_size,
            request_headers,
            strategy: self.download.strategy.unwrap_or(download_defaults.strategy),
            resume_policy: self
                .download
                .resume_policy
                .unwrap_or(download_defaults.resume_policy),
        };
        download.validate()?;
        Ok((data, download))
    }
}

/// Parses a single-character delimiter; `\t` and `tab` mean a tab.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] for anything but one ASCII character.
pub fn parse_delimiter(raw: &str) -> Result<u8, ConfigError> {
    if matches!(raw, "\\t" | "tab") {
        return Ok(b'\t');
    }
    match raw.as_bytes() {
        [byte] if byte.is_ascii() => Ok(*byte),
        _ => Err(ConfigError::invalid(
            "delimiter",
            format!("'{raw}'. Expected a single ASCII character"),
        )),
    }
}
