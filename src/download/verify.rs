//! Magic-byte PDF detection.

/// Leading bytes of every PDF document.
pub const PDF_MAGIC: &[u8] = b"%PDF-";

/// Returns true iff `content` starts with `%PDF-`.
#[must_use]
pub fn verify_pdf(content: &[u8]) -> bool {
    content.starts_with(PDF_MAGIC)
}

/// [`verify_pdf`] for possibly absent content; `None` is never a PDF.
#[must_use]
pub fn verify_optional_pdf(content: Option<&[u8]>) -> bool {
    content.is_some_and(verify_pdf)
}

/// Verdict on a body prefix that may still be growing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PrefixVerdict {
    /// Prefix matches the PDF magic bytes.
    Pdf,
    /// Prefix can no longer become a PDF.
    NotPdf,
    /// Too few bytes to decide and everything so far matches.
    NeedMore,
}

/// Classifies the first bytes of a streamed body without waiting for all of it.
pub(crate) fn check_prefix(prefix: &[u8]) -> PrefixVerdict {
    if prefix.len() >= PDF_MAGIC.len() {
        if verify_pdf(prefix) {
            PrefixVerdict::Pdf
        } else {
            PrefixVerdict::NotPdf
        }
    } else if PDF_MAGIC.starts_with(prefix) {
        PrefixVerdict::NeedMore
    } else {
        PrefixVerdict::NotPdf
    }
}
