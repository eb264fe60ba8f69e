//! Dataset rows and candidate URL extraction.
//!
//! A [`Row`] is one record of the input dataset: a stable identifier plus up
//! to two URL fields. [`extract_urls`] turns those fields into the ordered
//! candidate list the fetch worker walks through, primary first.

mod error;
mod loader;

pub use error::DatasetError;
pub use loader::{delimiter_for_path, load_rows};

/// Textual spellings of "no value" left behind by spreadsheet exports.
const NULL_MARKERS: &[&str] = &["nan", "none", "null", "missing", "<na>"];

/// One dataset record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// Stable identifier; file stem of the download and key in the status log.
    pub id: String,
    /// Preferred PDF location.
    pub primary_url: Option<String>,
    /// Fallback location, tried after the primary one.
    pub secondary_url: Option<String>,
}

impl Row {
    /// Creates a row from borrowed field values.
    #[must_use]
    pub fn new(id: impl Into<String>, primary_url: Option<&str>, secondary_url: Option<&str>) -> Self {
        Self {
            id: id.into(),
            primary_url: primary_url.map(str::to_string),
            secondary_url: secondary_url.map(str::to_string),
        }
    }

    /// Returns true if at least one usable candidate URL exists.
    #[must_use]
    pub fn has_candidate_url(&self) -> bool {
        self.url_fields().any(|raw| clean_candidate(raw).is_some())
    }

    fn url_fields(&self) -> impl Iterator<Item = &str> {
        [self.primary_url.as_deref(), self.secondary_url.as_deref()]
            .into_iter()
            .flatten()
    }
}

/// Returns the row's candidate URLs in fallback order (primary, secondary).
///
/// Each field is trimmed; empty values and stringified nulls are dropped.
/// Identical primary and secondary values are both kept.
#[must_use]
pub fn extract_urls(row: &Row) -> Vec<String> {
    row.url_fields().filter_map(clean_candidate).collect()
}

fn clean_candidate(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || is_null_marker(trimmed) {
        return None;
    }
    Some(trimmed.to_string())
}

fn is_null_marker(value: &str) -> bool {
    NULL_MARKERS
        .iter()
        .any(|marker| value.eq_ignore_ascii_case(marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_urls_trims_primary_and_skips_missing_secondary() {
        let row = Row::new("BR1", Some(" http://a/x.pdf "), None);
        assert_eq!(extract_urls(&row), vec!["http://a/x.pdf".to_string()]);
    }

    #[test]
    fn test_extract_urls_both_missing_is_empty() {
        let row = Row::new("BR2", None, None);
        assert!(extract_urls(&row).is_empty());
        assert!(!row.has_candidate_url());
    }

    #[test]
    fn test_extract_urls_preserves_priority_order() {
        let row = Row::new("BR3", Some("http://a/primary.pdf"), Some("http://b/secondary.html"));
        assert_eq!(
            extract_urls(&row),
            vec![
                "http://a/primary.pdf".to_string(),
                "http://b/secondary.html".to_string()
            ]
        );
    }

    #[test]
    fn test_extract_urls_secondary_only() {
        let row = Row::new("BR4", Some("   "), Some("\thttp://b/only.pdf\n"));
        assert_eq!(extract_urls(&row), vec!["http://b/only.pdf".to_string()]);
        assert!(row.has_candidate_url());
    }

    #[test]
    fn test_extract_urls_drops_stringified_nulls() {
        for marker in ["nan", "NaN", "None", "null", "missing", "<NA>", " nan "] {
            let row = Row::new("BR5", Some(marker), None);
            assert!(
                extract_urls(&row).is_empty(),
                "Expected '{marker}' to be treated as missing"
            );
        }
    }

    #[test]
    fn test_extract_urls_keeps_duplicates() {
        let row = Row::new("BR6", Some("http://a/x.pdf"), Some(" http://a/x.pdf"));
        assert_eq!(extract_urls(&row).len(), 2);
    }

    #[test]
    fn test_extract_urls_results_are_pre_trimmed() {
        let rows = [
            Row::new("A", Some("  http://a/1.pdf"), Some("http://a/2.pdf  ")),
            Row::new("B", Some("\u{a0}http://b/1.pdf\u{a0}"), None),
        ];
        for row in &rows {
            for url in extract_urls(row) {
                assert_eq!(url, url.trim(), "URL not trimmed: {url:?}");
            }
        }
    }
}
