//! Work queue construction.
//!
//! Turns the loaded dataset and the prior status log into the ordered list of
//! rows to attempt in this run.
//!
//! # Overview
//!
//! - [`WorkItem`] - A row identifier with its candidate URLs
//! - [`ResumePolicy`] - Which logged rows are attempted again
//! - [`build_work_queue`] - Filters, orders and truncates the rows

mod item;

use tracing::debug;

pub use item::{ResumePolicy, WorkItem};

use crate::dataset::{Row, extract_urls};
use crate::status::StatusLog;

/// Builds the queue for one run.
///
/// Keeps, in dataset order, every row that has at least one candidate URL and
/// whose log entry `policy` does not skip, then keeps only the first `limit`
/// items when a limit is given.
#[must_use]
pub fn build_work_queue(
    rows: &[Row],
    log: &StatusLog,
    limit: Option<usize>,
    policy: ResumePolicy,
) -> Vec<WorkItem> {
    let mut skipped_logged = 0usize;
    let mut skipped_no_url = 0usize;

    let pending = rows.iter().filter_map(|row| {
        if policy.should_skip(log.get(&row.id)) {
            skipped_logged += 1;
            return None;
        }
        let urls = extract_urls(row);
        if urls.is_empty() {
            skipped_no_url += 1;
            return None;
        }
        Some(WorkItem::new(row.id.clone(), urls))
    });

    let queue: Vec<WorkItem> = match limit {
        Some(limit) => pending.take(limit).collect(),
        None => pending.collect(),
    };

    debug!(
        rows = rows.len(),
        queued = queue.len(),
        skipped_logged,
        skipped_no_url,
        %policy,
        "built work queue"
    );
    queue
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::DownloadOutcome;

    fn rows() -> Vec<Row> {
        vec![
            Row::new("X", Some("http://x/a.pdf"), None),
            Row::new("Y", Some("http://y/a.pdf"), Some("http://y/b.pdf")),
            Row::new("Z", None, Some("nan")),
            Row::new("W", Some(" http://w/a.pdf "), None),
        ]
    }

    #[test]
    fn test_excludes_logged_ids() {
        let mut log = StatusLog::new();
        log.insert("X".to_string(), DownloadOutcome::success(200, "http://x/a.pdf"));

        let queue = build_work_queue(&rows()[..2], &log, None, ResumePolicy::SkipLogged);
        assert_eq!(
            queue,
            vec![WorkItem::new(
                "Y",
                vec!["http://y/a.pdf".to_string(), "http://y/b.pdf".to_string()]
            )]
        );
    }

    #[test]
    fn test_skips_rows_without_candidates() {
        let queue = build_work_queue(&rows(), &StatusLog::new(), None, ResumePolicy::SkipLogged);
        let ids: Vec<&str> = queue.iter().map(|item| item.id.as_str()).collect();
        assert_eq!(ids, vec!["X", "Y", "W"]);
        assert_eq!(queue[2].urls, vec!["http://w/a.pdf".to_string()]);
    }

    #[test]
    fn test_limit_keeps_input_order() {
        let queue = build_work_queue(&rows(), &StatusLog::new(), Some(2), ResumePolicy::SkipLogged);
        let ids: Vec<&str> = queue.iter().map(|item| item.id.as_str()).collect();
        assert_eq!(ids, vec!["X", "Y"]);
    }

    #[test]
    fn test_limit_larger_than_rows() {
        let queue = build_work_queue(&rows(), &StatusLog::new(), Some(100), ResumePolicy::SkipLogged);
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn test_limit_applies_after_filtering() {
        let mut log = StatusLog::new();
        log.insert("X".to_string(), DownloadOutcome::failure(404, "http://x/a.pdf"));

        let queue = build_work_queue(&rows(), &log, Some(1), ResumePolicy::SkipLogged);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].id, "Y");
    }

    #[test]
    fn test_retry_failed_requeues_failures_only() {
        let mut log = StatusLog::new();
        log.insert("X".to_string(), DownloadOutcome::failure(404, "http://x/a.pdf"));
        log.insert("Y".to_string(), DownloadOutcome::success(200, "http://y/a.pdf"));

        let queue = build_work_queue(&rows(), &log, None, ResumePolicy::RetryFailed);
        let ids: Vec<&str> = queue.iter().map(|item| item.id.as_str()).collect();
        assert_eq!(ids, vec!["X", "W"]);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(build_work_queue(&[], &StatusLog::new(), None, ResumePolicy::SkipLogged).is_empty());
    }
}
