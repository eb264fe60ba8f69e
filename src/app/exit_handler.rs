//! Exit code logic for the downloader process.
//!
//! Single responsibility: map the run report to the process exit outcome.

use pdf_downloader_core::RunReport;

use crate::ProcessExit;

/// Determines the process exit outcome from succeeded and failed row counts.
pub(crate) fn determine_exit_outcome(succeeded: usize, failed: usize) -> ProcessExit {
    if failed == 0 {
        ProcessExit::Success
    } else if succeeded > 0 {
        ProcessExit::Partial
    } else {
        ProcessExit::Failure
    }
}

/// Exit outcome for a finished run.
pub(crate) fn exit_for_report(report: &RunReport) -> ProcessExit {
    determine_exit_outcome(report.succeeded(), report.failed())
}
