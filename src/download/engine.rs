//! Download orchestrator for sequential and concurrent runs.
//!
//! The engine drains a prepared work queue through a shared [`PdfFetcher`],
//! merging every outcome into the [`StatusStore`] as soon as its row finishes.
//!
//! # Concurrency Model
//!
//! - Each row runs in its own Tokio task and owns its fetch from start to end
//! - A semaphore permit is acquired before spawning, bounding in-flight rows
//! - Permits are released automatically when tasks complete (RAII)
//! - The status store is the only shared mutable state and serializes writes
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use pdf_downloader_core::{DownloadConfig, DownloadEngine, StatusStore, WorkItem};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = DownloadConfig::default();
//! let store = Arc::new(StatusStore::load("logs/log.json").await?);
//! let engine = DownloadEngine::new(&config)?;
//! let queue = vec![WorkItem::new("BR1", vec!["https://example.com/a.pdf".to_string()])];
//! let report = engine.run(queue, &store, config.strategy).await?;
//! println!("{} succeeded, {} failed", report.succeeded(), report.failed());
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Deserialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

use super::error::ClientError;
use super::outcome::DownloadOutcome;
use super::{HttpClient, PdfFetcher};
use crate::config::{DownloadConfig, MAX_WORKERS};
use crate::queue::WorkItem;
use crate::status::{StatusError, StatusStore};

/// Error type for download engine operations.
///
/// Per-row download failures never surface here; they are recorded as
/// outcomes. Only conditions that break resumption abort a run.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Invalid worker count provided.
    #[error("invalid worker count {value}: must be between 1 and {MAX_WORKERS}")]
    InvalidWorkers {
        /// The invalid value that was provided.
        value: usize,
    },

    /// The HTTP client could not be built.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The status log could not be persisted.
    #[error("status log error: {0}")]
    Status(#[from] StatusError),

    /// Semaphore was closed unexpectedly.
    #[error("semaphore closed unexpectedly")]
    SemaphoreClosed,
}

/// Scheduling used to drain the work queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExecutionStrategy {
    /// One row at a time, in queue order.
    Sequential,
    /// Up to `workers` rows in flight, merged as they complete.
    #[default]
    Concurrent,
}

impl FromStr for ExecutionStrategy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sequential" => Ok(Self::Sequential),
            "concurrent" => Ok(Self::Concurrent),
            other => Err(format!(
                "unknown strategy '{other}', expected 'sequential' or 'concurrent'"
            )),
        }
    }
}

/// Result of one run: the outcome of every attempted row and the wall time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Wall-clock time from first dispatch to last merge.
    pub elapsed: Duration,
    /// Outcome per attempted row identifier.
    pub outcomes: BTreeMap<String, DownloadOutcome>,
}

impl RunReport {
    /// Number of rows attempted in this run.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    /// Number of rows that stored a verified PDF.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.outcomes.values().filter(|o| o.success).count()
    }

    /// Number of rows whose every candidate failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.attempted() - self.succeeded()
    }
}

/// Download engine driving a [`PdfFetcher`] over a work queue.
#[derive(Debug)]
pub struct DownloadEngine {
    fetcher: Arc<PdfFetcher>,
    workers: usize,
}

impl DownloadEngine {
    /// Creates an engine from the download configuration.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidWorkers`] if `workers` is outside
    /// `1..=MAX_WORKERS` and [`EngineError::Client`] if the HTTP client
    /// cannot be built.
    #[instrument(level = "debug", skip(config), fields(workers = config.workers))]
    pub fn new(config: &DownloadConfig) -> Result<Self, EngineError> {
        let client = HttpClient::new(config)?;
        let fetcher = PdfFetcher::new(client, config.downloads_dir.clone());
        Self::with_fetcher(fetcher, config.workers)
    }

    /// Creates an engine around an existing fetcher.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidWorkers`] if `workers` is out of range.
    pub fn with_fetcher(fetcher: PdfFetcher, workers: usize) -> Result<Self, EngineError> {
        if !(1..=MAX_WORKERS).contains(&workers) {
            return Err(EngineError::InvalidWorkers { value: workers });
        }
        debug!(workers, downloads_dir = %fetcher.downloads_dir().display(), "creating download engine");
        Ok(Self {
            fetcher: Arc::new(fetcher),
            workers,
        })
    }

    /// Returns the configured worker pool size.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Drains `queue` with the chosen strategy.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Status`] if the status log cannot be written.
    /// Individual download failures do NOT cause this method to error.
    pub async fn run(
        &self,
        queue: Vec<WorkItem>,
        store: &Arc<StatusStore>,
        strategy: ExecutionStrategy,
    ) -> Result<RunReport, EngineError> {
        match strategy {
            ExecutionStrategy::Sequential => self.run_sequential(queue, store).await,
            ExecutionStrategy::Concurrent => self.run_concurrent(queue, store).await,
        }
    }

    /// Processes rows one at a time in queue order.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Status`] if the status log cannot be written.
    #[instrument(skip(self, queue, store), fields(rows = queue.len()))]
    pub async fn run_sequential(
        &self,
        queue: Vec<WorkItem>,
        store: &StatusStore,
    ) -> Result<RunReport, EngineError> {
        let started = Instant::now();
        let mut outcomes = BTreeMap::new();

        info!("starting sequential run");
        for item in queue {
            let outcome = self.fetcher.download(&item.id, &item.urls).await;
            store.merge_and_persist(&item.id, outcome.clone()).await?;
            outcomes.insert(item.id, outcome);
        }

        Ok(finish(started, outcomes))
    }

    /// Processes rows on a bounded pool of tasks, merging in completion order.
    ///
    /// A panicking task is logged and its row is left out of the report and
    /// the log, so a later run attempts it again.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Status`] if the status log cannot be written;
    /// rows still in flight are aborted. Returns
    /// [`EngineError::SemaphoreClosed`] if the semaphore is closed.
    #[instrument(skip(self, queue, store), fields(rows = queue.len(), workers = self.workers))]
    pub async fn run_concurrent(
        &self,
        queue: Vec<WorkItem>,
        store: &Arc<StatusStore>,
    ) -> Result<RunReport, EngineError> {
        let started = Instant::now();
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut tasks: JoinSet<TaskResult> = JoinSet::new();
        let mut outcomes = BTreeMap::new();

        info!("starting concurrent run");
        for item in queue {
            // Blocks while `workers` rows are in flight.
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|_| EngineError::SemaphoreClosed)?;

            while let Some(joined) = tasks.try_join_next() {
                if let Err(e) = merge_joined(joined, &mut outcomes) {
                    tasks.abort_all();
                    return Err(e);
                }
            }

            let fetcher = Arc::clone(&self.fetcher);
            let store = Arc::clone(store);
            tasks.spawn(async move {
                let _permit = permit;
                let outcome = fetcher.download(&item.id, &item.urls).await;
                store.merge_and_persist(&item.id, outcome.clone()).await?;
                Ok::<_, StatusError>((item.id, outcome))
            });
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = merge_joined(joined, &mut outcomes) {
                tasks.abort_all();
                return Err(e);
            }
        }

        Ok(finish(started, outcomes))
    }
}

type TaskResult = Result<(String, DownloadOutcome), StatusError>;

fn merge_joined(
    joined: Result<TaskResult, tokio::task::JoinError>,
    outcomes: &mut BTreeMap<String, DownloadOutcome>,
) -> Result<(), EngineError> {
    match joined {
        Ok(Ok((id, outcome))) => {
            outcomes.insert(id, outcome);
            Ok(())
        }
        Ok(Err(e)) => Err(EngineError::Status(e)),
        Err(e) => {
            warn!(error = %e, "download task panicked");
            Ok(())
        }
    }
}

fn finish(started: Instant, outcomes: BTreeMap<String, DownloadOutcome>) -> RunReport {
    let report = RunReport {
        elapsed: started.elapsed(),
        outcomes,
    };
    info!(
        attempted = report.attempted(),
        succeeded = report.succeeded(),
        failed = report.failed(),
        elapsed_secs = report.elapsed.as_secs_f64(),
        "run complete"
    );
    report
}
