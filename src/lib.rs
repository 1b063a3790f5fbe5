//! # brd-kpi
//!
//! Extract candidate KPIs from Business Requirements Documents and walk them
//! through a two-stage review.
//!
//! ## Pipeline Overview
//!
//! ```text
//! upload (filename, bytes)
//!  │
//!  ├─ 1. Extract    DOCX paragraphs / PDF page text / TXT decode
//!  ├─ 2. Classify   8 keyword rules, else "Inferred KPI" fallback
//!  ├─ 3. Recommend  one Owner/SME row per extracted KPI
//!  ├─ 4. Preview    Accept / Reject extracted rows
//!  ├─ 5. Finalize   merge decisions + recommendations
//!  └─ 6. Final      Validate / Reject rows of the merged table
//! ```
//!
//! Every row carries a stable [`KpiId`] from the moment it is created, and
//! all decisions are keyed by it.
//!
//! ## Quick Start
//!
//! ```rust
//! use brd_kpi::{AnalysisConfig, CredentialStore, UploadOutcome};
//!
//! let mut session = CredentialStore::default()
//!     .login("admin", "admin123", AnalysisConfig::default())
//!     .unwrap();
//!
//! let outcome = session
//!     .upload("brd.txt", "text/plain", b"Reduce time to fill. Automate screening.")
//!     .unwrap();
//! assert_eq!(outcome, UploadOutcome::Populated { kpis: 2 });
//!
//! let first = session.preview().unwrap().records()[0].id;
//! session.accept(first).unwrap();
//! let merged = session.finalize().unwrap();
//! assert_eq!(merged.len(), 4);
//! ```
//!
//! ## Feature Flags
//!
//! | Feature  | Default | Description |
//! |----------|---------|-------------|
//! | `cli`    | on      | Enables the `brd-kpi` binary (clap + anyhow + tracing-subscriber + indicatif) |
//! | `lopdf`  | on      | [`LopdfTextExtractor`], pure-Rust PDF text extraction |
//! | `pdfium` | off     | `PdfiumTextExtractor`, binds a pdfium shared library at runtime |
//!
//! Without a PDF engine in [`AnalysisConfig::pdf_extractor`], PDF uploads fail
//! with [`ExtractError::MissingOptionalParser`]; DOCX and TXT keep working.
//! ```toml
//! brd-kpi = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod analyze;
pub mod auth;
pub mod classify;
pub mod config;
pub mod error;
pub mod extract;
pub mod model;
pub mod render;
pub mod store;
pub mod workflow;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use analyze::{analyze_bytes, analyze_file, Analysis};
pub use auth::CredentialStore;
pub use classify::{classify, classify_text};
pub use config::{AnalysisConfig, AnalysisConfigBuilder};
pub use error::{ExtractError, PageError, WorkflowError};
pub use extract::pdf::PdfTextExtractor;
#[cfg(feature = "lopdf")]
pub use extract::pdf::LopdfTextExtractor;
#[cfg(feature = "pdfium")]
pub use extract::pdf::PdfiumTextExtractor;
pub use extract::{extract, extract_file};
pub use model::{DocumentKind, KpiId, KpiRecord, KpiStatus, KpiTable, TableShape};
pub use store::ReviewAction;
pub use workflow::{ReviewSession, UploadOutcome};
