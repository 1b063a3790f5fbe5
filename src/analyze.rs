//! One-shot analysis entry points.
//!
//! Runs extraction, classification and recommendation derivation in one
//! call and returns both tables, without a session or review state. Use
//! [`crate::workflow::ReviewSession`] when rows need to be accepted,
//! rejected or validated.

use crate::classify::classify;
use crate::config::AnalysisConfig;
use crate::error::ExtractError;
use crate::extract::{self, read_document};
use crate::model::{IdAllocator, KpiTable};
use crate::store::derive_recommendations;
use serde::Serialize;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Tables produced for one document.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub extracted: KpiTable,
    pub recommended: KpiTable,
    pub text_len: usize,
    pub duration_ms: u64,
}

impl Analysis {
    /// `true` when the text held no recognisable KPI.
    pub fn no_kpis_found(&self) -> bool {
        self.extracted.is_empty()
    }
}

/// Analyse an in-memory upload.
///
/// # Errors
/// Any [`ExtractError`] from the extraction stage. An empty text is not an
/// error; check [`Analysis::no_kpis_found`].
pub fn analyze_bytes(
    filename: &str,
    declared_type: &str,
    bytes: &[u8],
    config: &AnalysisConfig,
) -> Result<Analysis, ExtractError> {
    let start = Instant::now();
    let text = extract::extract(filename, declared_type, bytes, config)?;

    let mut ids = IdAllocator::default();
    let extracted = classify(&text, &mut ids, config);
    let recommended = derive_recommendations(&extracted, &mut ids, &config.recommended_owner);

    let duration_ms = start.elapsed().as_millis() as u64;
    info!(
        "Analysed '{}': {} KPIs in {}ms",
        filename,
        extracted.len(),
        duration_ms
    );

    Ok(Analysis {
        extracted,
        recommended,
        text_len: text.len(),
        duration_ms,
    })
}

/// Analyse a document on disk.
pub fn analyze_file(path: impl AsRef<Path>, config: &AnalysisConfig) -> Result<Analysis, ExtractError> {
    let path = path.as_ref();
    let bytes = read_document(path)?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    analyze_bytes(&filename, "", &bytes, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_to_tables() {
        let a = analyze_bytes(
            "brd.txt",
            "text/plain",
            b"We must automate screening and keep 99% uptime.",
            &AnalysisConfig::default(),
        )
        .unwrap();
        assert_eq!(a.extracted.len(), 2);
        assert_eq!(a.recommended.len(), 2);
        assert!(!a.no_kpis_found());
        assert_eq!(a.text_len, 47);
    }

    #[test]
    fn owner_comes_from_config() {
        let config = AnalysisConfig::builder()
            .recommended_owner("HR Ops")
            .build()
            .unwrap();
        let a = analyze_bytes("brd.txt", "", b"uptime", &config).unwrap();
        assert_eq!(a.recommended.records()[0].owner.as_deref(), Some("HR Ops"));
    }
}
