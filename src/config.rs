//! Configuration types for BRD analysis.
//!
//! All analysis behaviour is controlled through [`AnalysisConfig`], built via
//! its [`AnalysisConfigBuilder`]. The one capability that is not part of the
//! crate proper, PDF text extraction, is injected here as well: a config
//! without a [`PdfTextExtractor`] turns every PDF upload into
//! [`crate::ExtractError::MissingOptionalParser`].

use crate::error::WorkflowError;
use crate::extract::pdf::PdfTextExtractor;
use std::fmt;
use std::sync::Arc;

/// Owner/SME placed on every recommended row.
pub const DEFAULT_RECOMMENDED_OWNER: &str = "Talent Acquisition / IT";

/// Configuration for extraction, classification and review.
///
/// # Example
/// ```rust
/// use brd_kpi::AnalysisConfig;
///
/// let config = AnalysisConfig::builder()
///     .recommended_owner("People Analytics")
///     .fallback_max_records(4)
///     .build()
///     .unwrap();
/// assert_eq!(config.fallback_max_records, 4);
/// ```
#[derive(Clone)]
pub struct AnalysisConfig {
    /// Injected PDF text engine. Default: none.
    pub pdf_extractor: Option<Arc<dyn PdfTextExtractor>>,

    /// Owner/SME written on each recommended row. Default: "Talent Acquisition / IT".
    pub recommended_owner: String,

    /// Owner/SME shown for extracted rows carried into the final table. Default: "-".
    pub placeholder_owner: String,

    /// Cap on "Inferred KPI" rows synthesized when no rule matches. Default: 6.
    pub fallback_max_records: usize,

    /// Length (in characters) past which an inferred description is cut and
    /// suffixed with "...". Default: 80.
    pub fallback_description_limit: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            pdf_extractor: None,
            recommended_owner: DEFAULT_RECOMMENDED_OWNER.to_string(),
            placeholder_owner: "-".to_string(),
            fallback_max_records: 6,
            fallback_description_limit: 80,
        }
    }
}

impl fmt::Debug for AnalysisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisConfig")
            .field(
                "pdf_extractor",
                &self.pdf_extractor.as_ref().map(|p| p.name().to_string()),
            )
            .field("recommended_owner", &self.recommended_owner)
            .field("placeholder_owner", &self.placeholder_owner)
            .field("fallback_max_records", &self.fallback_max_records)
            .field("fallback_description_limit", &self.fallback_description_limit)
            .finish()
    }
}

impl AnalysisConfig {
    /// Create a new builder for `AnalysisConfig`.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`AnalysisConfig`].
#[derive(Debug)]
pub struct AnalysisConfigBuilder {
    config: AnalysisConfig,
}

impl AnalysisConfigBuilder {
    pub fn pdf_extractor(mut self, extractor: Arc<dyn PdfTextExtractor>) -> Self {
        self.config.pdf_extractor = Some(extractor);
        self
    }

    pub fn recommended_owner(mut self, owner: impl Into<String>) -> Self {
        self.config.recommended_owner = owner.into();
        self
    }

    pub fn placeholder_owner(mut self, owner: impl Into<String>) -> Self {
        self.config.placeholder_owner = owner.into();
        self
    }

    pub fn fallback_max_records(mut self, n: usize) -> Self {
        self.config.fallback_max_records = n;
        self
    }

    pub fn fallback_description_limit(mut self, chars: usize) -> Self {
        self.config.fallback_description_limit = chars;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AnalysisConfig, WorkflowError> {
        let c = &self.config;
        if c.fallback_max_records == 0 {
            return Err(WorkflowError::InvalidConfig(
                "fallback_max_records must be ≥ 1".into(),
            ));
        }
        if c.fallback_description_limit == 0 {
            return Err(WorkflowError::InvalidConfig(
                "fallback_description_limit must be ≥ 1".into(),
            ));
        }
        if c.recommended_owner.trim().is_empty() {
            return Err(WorkflowError::InvalidConfig(
                "recommended_owner must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}
