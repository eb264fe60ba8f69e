//! PDF Downloader Core Library
//!
//! This library provides the core functionality for the `pdf-downloader` tool,
//! which bulk-downloads PDF documents referenced by the rows of a tabular
//! dataset, verifies every payload really is a PDF, and records a per-row
//! outcome so repeated runs resume where the previous one stopped.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`config`] - Immutable data-source and download configuration records
//! - [`dataset`] - Row model, candidate URL extraction and the delimited-file loader
//! - [`download`] - PDF verification, HTTP fetching, the fetch worker and the engine
//! - [`queue`] - Work queue construction from rows and the status log
//! - [`status`] - Durable, mutex-guarded status store backing resumption

#![warn(missing_docs)]
// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod dataset;
pub mod download;
pub mod queue;
pub mod status;
#[cfg(test)]
pub mod test_support;
pub mod user_agent;

// Re-export commonly used types
pub use config::{ConfigError, DataSourceConfig, DownloadConfig, FileConfig};
pub use dataset::{DatasetError, Row, extract_urls, load_rows};
pub use download::{
    DownloadEngine, DownloadOutcome, EngineError, ExecutionStrategy, FetchError, HttpClient,
    PdfFetcher, RunReport, verify_pdf,
};
pub use queue::{ResumePolicy, WorkItem, build_work_queue};
pub use status::{StatusError, StatusLog, StatusStore};
