//! CLI entry point for the PDF downloader.

use std::process::ExitCode;

use clap::Parser;
use tracing::error;

mod app;
mod cli;

use app::{runtime, terminal};
use cli::Args;

/// Process-level result of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcessExit {
    /// Every attempted row succeeded, or nothing was left to do.
    Success,
    /// Some rows succeeded and some failed.
    Partial,
    /// Every attempted row failed, or the run aborted.
    Failure,
}

impl ProcessExit {
    fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
            Self::Partial => 2,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();
    terminal::init_tracing(terminal::resolve_default_log_level(&args));

    let outcome = match runtime::run_downloader(args).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("{e:#}");
            ProcessExit::Failure
        }
    };
    ExitCode::from(outcome.code())
}
