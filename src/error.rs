//! Error types for the brd-kpi library.
//!
//! Three error types reflect three distinct failure modes:
//!
//! * [`ExtractError`] — the uploaded document could not be turned into text
//!   (unsupported type, corrupt archive, missing PDF engine, bad encoding).
//!   Always recovered at the session boundary: it becomes a user-visible
//!   message and the session state is left untouched.
//!
//! * [`PageError`] — **Non-fatal**: a single PDF page yielded no text. The
//!   page contributes an empty line and every other page is kept.
//!
//! * [`WorkflowError`] — a user action the review state machine refuses
//!   (bad credentials, decision on an unknown row, transition out of a
//!   terminal state).

use std::path::PathBuf;
use thiserror::Error;

use crate::model::KpiId;
use crate::model::KpiStatus;

/// Every way turning an uploaded document into plain text can fail.
///
/// "No KPIs found" is not an error here: an empty or whitespace-only text
/// is a successful extraction, surfaced by the session as
/// [`crate::workflow::UploadOutcome::NoKpisFound`].
#[derive(Debug, Error)]
pub enum ExtractError {
    // ── Dispatch ──────────────────────────────────────────────────────────
    /// File extension is not `.docx`, `.pdf` or `.txt`.
    #[error("Unsupported file type '{filename}'. Please upload DOCX, PDF or TXT.")]
    UnsupportedType { filename: String },

    // ── Content ───────────────────────────────────────────────────────────
    /// Archive, XML or PDF structure could not be read.
    #[error("Unable to extract text from '{filename}' (the document may be corrupted): {detail}")]
    EmptyOrCorrupt { filename: String, detail: String },

    /// No PDF text extractor is configured, or its native engine could not be loaded.
    #[error(
        "PDF parsing requires a PDF text engine, but {capability} is not available.\n\
You can either:\n\
  • Upload the BRD as DOCX or TXT instead, or\n\
  • Build with `--features lopdf` (pure Rust) or `--features pdfium` and select it with --pdf-backend.\n\
    For pdfium, set PDFIUM_LIB_PATH=/path/to/libpdfium or install it system-wide."
    )]
    MissingOptionalParser { capability: String },

    /// TXT payload could not be decoded. The built-in TXT decoder falls back
    /// to lossy UTF-8 instead of reporting this.
    #[error("Failed to decode TXT file '{filename}' as {encoding}.")]
    DecodeFailure { filename: String, encoding: String },

    // ── File system (path entry point only) ───────────────────────────────
    /// Input file was not found at the given path.
    #[error("BRD file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// Any other I/O failure while reading the file.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A non-fatal error for a single PDF page.
///
/// The page is rendered as an empty line in the extracted text.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
#[error("Page {page}: text extraction failed: {detail}")]
pub struct PageError {
    /// 1-indexed page number.
    pub page: usize,
    pub detail: String,
}

/// A user action rejected by the review workflow.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// An action needs an uploaded document but none has been processed.
    #[error("No BRD has been processed yet. Upload a DOCX, PDF or TXT file first.")]
    NoDocument,

    #[error("No KPI row with id {0} in the {1} table")]
    UnknownRecord(KpiId, &'static str),

    /// The row's current status does not offer the requested action.
    #[error("KPI row {id} is {from}; it cannot become {to}")]
    TransitionNotAllowed {
        id: KpiId,
        from: KpiStatus,
        to: KpiStatus,
    },

    /// Preview decisions are locked once the review is finalized.
    #[error("The review is already finalized. Upload a new BRD to start over.")]
    AlreadyFinalized,

    /// Final-table actions need a finalized review.
    #[error("The review has not been finalized yet.")]
    NotFinalized,

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_parser_names_both_escape_hatches() {
        let e = ExtractError::MissingOptionalParser {
            capability: "a PDF extractor".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("DOCX or TXT"), "got: {msg}");
        assert!(msg.contains("--features lopdf"), "got: {msg}");
        assert!(msg.contains("a PDF extractor"), "got: {msg}");
    }

    #[test]
    fn unsupported_type_display() {
        let e = ExtractError::UnsupportedType {
            filename: "brd.rtf".into(),
        };
        assert!(e.to_string().contains("brd.rtf"));
    }

    #[test]
    fn transition_display_names_both_states() {
        let e = WorkflowError::TransitionNotAllowed {
            id: KpiId::new(3),
            from: KpiStatus::Accepted,
            to: KpiStatus::Validated,
        };
        let msg = e.to_string();
        assert!(msg.contains("Accepted"), "got: {msg}");
        assert!(msg.contains("Validated"), "got: {msg}");
        assert!(msg.contains("#3"), "got: {msg}");
    }

    #[test]
    fn page_error_display() {
        let e = PageError {
            page: 2,
            detail: "no content stream".into(),
        };
        assert_eq!(
            e.to_string(),
            "Page 2: text extraction failed: no content stream"
        );
    }
}
