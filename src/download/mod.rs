//! PDF fetching, verification and run orchestration.
//!
//! # Features
//!
//! - Magic-byte PDF verification, applied as soon as the first bytes arrive
//! - Streaming writes through a `.part` file renamed into place on completion
//! - Ordered fallback across a row's candidate URLs
//! - Sequential or bounded-concurrency execution over a work queue
//!
//! # Example
//!
//! ```no_run
//! use pdf_downloader_core::download::{HttpClient, PdfFetcher};
//! use pdf_downloader_core::DownloadConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = DownloadConfig::default();
//! let fetcher = PdfFetcher::new(HttpClient::new(&config)?, &config.downloads_dir);
//! let outcome = fetcher
//!     .download("BR1", &["https://example.com/report.pdf".to_string()])
//!     .await;
//! println!("{} {} {}", outcome.success, outcome.status_code, outcome.url_used);
//! # Ok(())
//! # }
//! ```

mod client;
mod engine;
mod error;
mod outcome;
pub mod storage;
mod verify;
mod worker;

pub use client::{FetchedPdf, HttpClient};
pub use engine::{DownloadEngine, EngineError, ExecutionStrategy, RunReport};
pub use error::{ClientError, FetchError};
pub use outcome::{
    DownloadOutcome, STATUS_CONNECTION_ERROR, STATUS_INVALID_URL, STATUS_NOT_PDF, STATUS_TIMEOUT,
    STATUS_TRANSPORT_ERROR,
};
pub use verify::{PDF_MAGIC, verify_optional_pdf, verify_pdf};
pub use worker::PdfFetcher;
