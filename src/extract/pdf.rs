//! PDF text extraction through an injected engine.
//!
//! PDF support is a capability, not a given: [`crate::AnalysisConfig`]
//! carries an optional [`PdfTextExtractor`]. When none is configured every
//! PDF upload yields [`ExtractError::MissingOptionalParser`], the same way
//! every time, so behaviour never depends on which libraries happen to be
//! installed on the host.
//!
//! Two engines ship with the crate, each behind a cargo feature:
//!
//! | Feature  | Type                     | Engine |
//! |----------|--------------------------|--------|
//! | `lopdf`  | [`LopdfTextExtractor`]   | pure Rust, content-stream text operators |
//! | `pdfium` | [`PdfiumTextExtractor`]  | pdfium shared library, bound per call |
//!
//! A page that yields no text is a [`PageError`], never a document failure:
//! it becomes an empty line and the other pages are kept.

use crate::error::{ExtractError, PageError};
use tracing::{debug, warn};

/// Per-page outcome in page order.
pub type PageTexts = Vec<Result<String, PageError>>;

/// A pluggable PDF text engine.
///
/// Implementations return one entry per page, in page order. A document that
/// cannot be opened at all is [`ExtractError::EmptyOrCorrupt`]; an engine
/// that cannot be loaded is [`ExtractError::MissingOptionalParser`].
pub trait PdfTextExtractor: Send + Sync {
    /// Short engine name for logs and `Debug` output.
    fn name(&self) -> &str;

    fn extract_pages(&self, filename: &str, bytes: &[u8]) -> Result<PageTexts, ExtractError>;
}

/// Extract PDF text with the configured engine, if any.
pub fn extract_pdf(
    extractor: Option<&dyn PdfTextExtractor>,
    filename: &str,
    bytes: &[u8],
) -> Result<String, ExtractError> {
    let Some(extractor) = extractor else {
        return Err(ExtractError::MissingOptionalParser {
            capability: "a PDF text extractor".to_string(),
        });
    };

    debug!("Extracting PDF '{}' with {}", filename, extractor.name());
    let pages = extractor.extract_pages(filename, bytes)?;
    Ok(join_pages(pages))
}

/// Join page texts with `\n`; failed pages contribute an empty line.
pub fn join_pages(pages: PageTexts) -> String {
    pages
        .into_iter()
        .map(|page| match page {
            Ok(text) => text,
            Err(e) => {
                warn!("{}", e);
                String::new()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ── lopdf ────────────────────────────────────────────────────────────────────

/// Pure-Rust engine built on `lopdf`.
#[cfg(feature = "lopdf")]
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfTextExtractor;

#[cfg(feature = "lopdf")]
impl PdfTextExtractor for LopdfTextExtractor {
    fn name(&self) -> &str {
        "lopdf"
    }

    fn extract_pages(&self, filename: &str, bytes: &[u8]) -> Result<PageTexts, ExtractError> {
        let document =
            lopdf::Document::load_mem(bytes).map_err(|e| ExtractError::EmptyOrCorrupt {
                filename: filename.to_string(),
                detail: format!("PDF could not be loaded: {e}"),
            })?;

        let pages = document.get_pages();
        debug!("PDF '{}' loaded: {} pages", filename, pages.len());

        Ok(pages
            .keys()
            .map(|&page_no| {
                document
                    .extract_text(&[page_no])
                    .map_err(|e| PageError {
                        page: page_no as usize,
                        detail: e.to_string(),
                    })
            })
            .collect())
    }
}

// ── pdfium ───────────────────────────────────────────────────────────────────

/// Engine backed by the pdfium shared library.
///
/// The library is bound on every call rather than once up front, so a
/// missing library surfaces as [`ExtractError::MissingOptionalParser`] at
/// upload time instead of aborting start-up.
#[cfg(feature = "pdfium")]
#[derive(Debug, Default, Clone)]
pub struct PdfiumTextExtractor {
    /// Library file or the directory containing it. `None` binds the system library.
    pub library_path: Option<std::path::PathBuf>,
}

#[cfg(feature = "pdfium")]
impl PdfiumTextExtractor {
    pub fn new(library_path: Option<std::path::PathBuf>) -> Self {
        Self { library_path }
    }

    /// Use `PDFIUM_LIB_PATH` when set, else the system library.
    pub fn from_env() -> Self {
        Self::new(std::env::var_os("PDFIUM_LIB_PATH").map(std::path::PathBuf::from))
    }
}

#[cfg(feature = "pdfium")]
impl PdfTextExtractor for PdfiumTextExtractor {
    fn name(&self) -> &str {
        "pdfium"
    }

    fn extract_pages(&self, filename: &str, bytes: &[u8]) -> Result<PageTexts, ExtractError> {
        use pdfium_render::prelude::*;

        let bindings = match &self.library_path {
            Some(path) if path.is_dir() => {
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(path))
            }
            Some(path) => Pdfium::bind_to_library(path),
            None => Pdfium::bind_to_system_library(),
        }
        .map_err(|e| ExtractError::MissingOptionalParser {
            capability: format!("the pdfium library ({e:?})"),
        })?;
        let pdfium = Pdfium::new(bindings);

        let document = pdfium.load_pdf_from_byte_slice(bytes, None).map_err(|e| {
            ExtractError::EmptyOrCorrupt {
                filename: filename.to_string(),
                detail: format!("{e:?}"),
            }
        })?;

        let pages = document.pages();
        debug!("PDF '{}' loaded: {} pages", filename, pages.len());

        Ok(pages
            .iter()
            .enumerate()
            .map(|(idx, page)| {
                page.text().map(|t| t.all()).map_err(|e| PageError {
                    page: idx + 1,
                    detail: format!("{e:?}"),
                })
            })
            .collect())
    }
}
