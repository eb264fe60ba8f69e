//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use pdf_downloader_core::config::{MAX_TIMEOUT_SECS, MAX_WORKERS};
use pdf_downloader_core::user_agent::default_request_headers;
use pdf_downloader_core::{ExecutionStrategy, FileConfig, ResumePolicy};

/// Bulk-download the PDFs referenced by a dataset.
///
/// Every row of the dataset names up to two candidate URLs. Each verified PDF is
/// stored as `<downloads-dir>/<id>.pdf` and every attempt is recorded in a JSON
/// status log, so repeated runs pick up where the previous one stopped.
#[derive(Parser, Debug)]
#[command(name = "pdf-downloader")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// TOML config file; command-line flags override its values
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Dataset file (CSV, or TSV for .tsv/.tab)
    #[arg(short = 'd', long, value_name = "PATH")]
    pub data_file: Option<PathBuf>,

    /// JSON status log used for resumption
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Column holding the row identifier
    #[arg(long, value_name = "NAME")]
    pub id_column: Option<String>,

    /// Column holding the primary PDF URL
    #[arg(long, value_name = "NAME")]
    pub primary_column: Option<String>,

    /// Column holding the fallback URL
    #[arg(long, value_name = "NAME")]
    pub secondary_column: Option<String>,

    /// Field delimiter (single character, or "tab")
    #[arg(long, value_name = "CHAR")]
    pub delimiter: Option<String>,

    /// Directory receiving <id>.pdf files
    #[arg(short = 'o', long, value_name = "DIR")]
    pub downloads_dir: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(short = 't', long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..=MAX_TIMEOUT_SECS))]
    pub timeout: Option<u64>,

    /// Worker pool size for concurrent runs
    #[arg(short = 'w', long, value_parser = parse_workers)]
    pub workers: Option<usize>,

    /// Maximum rows to attempt this run (0 = no limit, default 20)
    #[arg(short = 'b', long, value_name = "N")]
    pub batch_size: Option<usize>,

    /// Execution strategy: sequential or concurrent
    #[arg(short = 's', long, value_name = "STRATEGY")]
    pub strategy: Option<ExecutionStrategy>,

    /// Attempt rows whose logged outcome is a failure again
    #[arg(long)]
    pub retry_failed: bool,

    /// Extra request header, "Name: value" (repeatable)
    #[arg(short = 'H', long = "header", value_name = "HEADER", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,
}

impl Args {
    /// Overlays the flags that were given onto `config`.
    pub fn apply_to(&self, config: &mut FileConfig) {
        let data = &mut config.data;
        override_with(&mut data.data_file, self.data_file.as_ref());
        override_with(&mut data.log_file, self.log_file.as_ref());
        override_with(&mut data.id_column, self.id_column.as_ref());
        override_with(&mut data.primary_url_column, self.primary_column.as_ref());
        override_with(&mut data.secondary_url_column, self.secondary_column.as_ref());
        override_with(&mut data.delimiter, self.delimiter.as_ref());

        let download = &mut config.download;
        override_with(&mut download.downloads_dir, self.downloads_dir.as_ref());
        override_with(&mut download.timeout_secs, self.timeout.as_ref());
        override_with(&mut download.workers, self.workers.as_ref());
        override_with(&mut download.batch_size, self.batch_size.as_ref());
        override_with(&mut download.strategy, self.strategy.as_ref());
        if self.retry_failed {
            download.resume_policy = Some(ResumePolicy::RetryFailed);
        }
        if !self.headers.is_empty() {
            let headers = download
                .headers
                .get_or_insert_with(default_request_headers);
            for (name, value) in &self.headers {
                headers.retain(|existing, _| !existing.eq_ignore_ascii_case(name));
                headers.insert(name.clone(), value.clone());
            }
        }
    }
}

fn override_with<T: Clone>(slot: &mut Option<T>, value: Option<&T>) {
    if let Some(value) = value {
        *slot = Some(value.clone());
    }
}

fn parse_workers(raw: &str) -> Result<usize, String> {
    let workers: usize = raw
        .parse()
        .map_err(|_| format!("'{raw}' is not a number"))?;
    if (1..=MAX_WORKERS).contains(&workers) {
        Ok(workers)
    } else {
        Err(format!("{workers} is not in 1..={MAX_WORKERS}"))
    }
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let Some((name, value)) = raw.split_once(':') else {
        return Err(format!("'{raw}' is not of the form \"Name: value\""));
    };
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("'{raw}' has an empty header name"));
    }
    Ok((name.to_ascii_lowercase(), value.trim().to_string()))
}
