//! Storage paths for verified PDFs.
//!
//! Each row's PDF lives at `<downloads_dir>/<id>.pdf`. Bytes are streamed into
//! `<id>.pdf.part` first and renamed into place only once the body is complete,
//! so a `.pdf` file on disk is always a whole, verified document.

use std::path::{Path, PathBuf};

const PDF_EXTENSION: &str = "pdf";
const PARTIAL_SUFFIX: &str = ".part";

/// Final location of the PDF for row `id`.
#[must_use]
pub fn pdf_path(downloads_dir: &Path, id: &str) -> PathBuf {
    downloads_dir.join(format!("{}.{PDF_EXTENSION}", sanitize_file_stem(id)))
}

/// In-progress location used while the body is streaming.
#[must_use]
pub fn partial_path(final_path: &Path) -> PathBuf {
    let mut name = final_path.as_os_str().to_os_string();
    name.push(PARTIAL_SUFFIX);
    PathBuf::from(name)
}

/// Makes a row identifier safe to use as a single file name component.
///
/// Every byte outside `[A-Za-z0-9_.~-]` is percent-encoded and a leading `.`
/// becomes `%2E`, so the result is never hidden or a relative path. The
/// mapping is injective: distinct ids always get distinct file names.
#[must_use]
pub fn sanitize_file_stem(id: &str) -> String {
    if id.is_empty() {
        // A lone `%` is never produced by the encoding below.
        return "%".to_string();
    }
    let encoded = urlencoding::encode(id);
    match encoded.strip_prefix('.') {
        Some(rest) => format!("%2E{rest}"),
        None => encoded.into_owned(),
    }
}
