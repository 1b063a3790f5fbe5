//! Document text extraction: uploaded bytes → plain text.
//!
//! ## Data Flow
//!
//! ```text
//! filename ──▶ DocumentKind ──┬─▶ docx  (zip + WordprocessingML)
//!                             ├─▶ pdf   (injected PdfTextExtractor)
//!                             └─▶ text  (UTF-8 best effort, UTF-16 by BOM)
//! ```
//!
//! Dispatch is by file extension alone. The declared MIME type is logged
//! and otherwise ignored, so a `.docx` uploaded as `application/octet-stream`
//! still parses and a `.rtf` declared as `text/plain` is still refused.
//!
//! A successful extraction may be empty. Deciding that an empty text means
//! "no KPIs" belongs to the caller, not to this stage.

pub mod docx;
pub mod pdf;
pub mod text;

use crate::config::AnalysisConfig;
use crate::error::ExtractError;
use crate::model::DocumentKind;
use std::path::Path;
use tracing::{debug, info};

/// Turn an uploaded document into plain text.
///
/// # Arguments
/// * `filename` — original file name; its extension selects the parser
/// * `declared_type` — MIME type or extension reported by the uploader (informational)
/// * `bytes` — raw file content
///
/// # Errors
/// [`ExtractError::UnsupportedType`], [`ExtractError::EmptyOrCorrupt`],
/// [`ExtractError::MissingOptionalParser`] or [`ExtractError::DecodeFailure`].
pub fn extract(
    filename: &str,
    declared_type: &str,
    bytes: &[u8],
    config: &AnalysisConfig,
) -> Result<String, ExtractError> {
    let kind = DocumentKind::from_filename(filename).ok_or_else(|| ExtractError::UnsupportedType {
        filename: filename.to_string(),
    })?;
    debug!(
        "Dispatching '{}' as {:?} (declared: '{}', {} bytes)",
        filename,
        kind,
        declared_type,
        bytes.len()
    );

    let text = match kind {
        DocumentKind::Docx => docx::extract_docx(filename, bytes)?,
        DocumentKind::Pdf => pdf::extract_pdf(config.pdf_extractor.as_deref(), filename, bytes)?,
        DocumentKind::Txt => text::decode_text(filename, bytes)?,
    };

    info!("Extracted {} chars from '{}'", text.len(), filename);
    Ok(text)
}

/// Read a document from disk and extract its text.
///
/// The file name component of `path` drives dispatch exactly as in
/// [`extract`].
pub fn extract_file(path: impl AsRef<Path>, config: &AnalysisConfig) -> Result<String, ExtractError> {
    let path = path.as_ref();
    let bytes = read_document(path)?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    extract(&filename, "", &bytes, config)
}

/// Read an upload from disk, mapping I/O failures onto [`ExtractError`].
pub fn read_document(path: &Path) -> Result<Vec<u8>, ExtractError> {
    std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ExtractError::FileNotFound {
            path: path.to_path_buf(),
        },
        std::io::ErrorKind::PermissionDenied => ExtractError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => ExtractError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        },
    })
}
