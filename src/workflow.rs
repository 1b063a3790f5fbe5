//! Review workflow: the per-session context that sequences upload, preview
//! decisions, finalization and final-table decisions.
//!
//! Two flags gate what a front end may show:
//!
//! * `document_uploaded` — the preview (extracted) and recommended tables;
//! * `review_finalized` — the merged final table.
//!
//! Uploading a new document is the only way back: it clears both flags, all
//! tables and all decisions before the new results are loaded. A failed
//! upload changes nothing.
//!
//! Every session owns its own state; nothing is shared between sessions.

use crate::classify::classify;
use crate::config::AnalysisConfig;
use crate::error::{ExtractError, WorkflowError};
use crate::extract;
use crate::model::{DocumentKind, IdAllocator, KpiId, KpiStatus, KpiTable};
use crate::store::{KpiRecordStore, ReviewAction};
use serde::Serialize;
use tracing::info;

/// Result of a successful upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UploadOutcome {
    /// The preview table now holds `kpis` rows.
    Populated { kpis: usize },
    /// Text was extracted but no KPI could be derived from it. Tables are
    /// empty; the user may add a different document.
    NoKpisFound,
}

/// The document currently under review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentInfo {
    pub filename: String,
    pub kind: DocumentKind,
    pub text_len: usize,
}

/// One logged-in user's review state.
#[derive(Debug)]
pub struct ReviewSession {
    username: String,
    config: AnalysisConfig,
    ids: IdAllocator,
    store: KpiRecordStore,
    document: Option<DocumentInfo>,
    review_finalized: bool,
}

/// Serializable view of a session, for JSON output.
#[derive(Debug, Serialize)]
pub struct SessionSnapshot<'a> {
    pub username: &'a str,
    pub document: Option<&'a DocumentInfo>,
    pub review_finalized: bool,
    pub extracted: Option<&'a KpiTable>,
    pub recommended: Option<&'a KpiTable>,
    #[serde(rename = "final")]
    pub final_table: Option<&'a KpiTable>,
}

impl ReviewSession {
    /// Start an empty session for `username`.
    ///
    /// Normally reached through [`crate::auth::CredentialStore::login`].
    pub fn new(username: impl Into<String>, config: AnalysisConfig) -> Self {
        Self {
            username: username.into(),
            config,
            ids: IdAllocator::default(),
            store: KpiRecordStore::default(),
            document: None,
            review_finalized: false,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn document(&self) -> Option<&DocumentInfo> {
        self.document.as_ref()
    }

    pub fn document_uploaded(&self) -> bool {
        self.document.is_some()
    }

    pub fn review_finalized(&self) -> bool {
        self.review_finalized
    }

    /// Extract, classify and load a new document.
    ///
    /// On error the session is left exactly as it was, so the user can retry
    /// with another file.
    pub fn upload(
        &mut self,
        filename: &str,
        declared_type: &str,
        bytes: &[u8],
    ) -> Result<UploadOutcome, ExtractError> {
        let text = extract::extract(filename, declared_type, bytes, &self.config)?;

        self.reset();
        let table = classify(&text, &mut self.ids, &self.config);
        let kpis = table.len();
        self.store
            .load(table, &mut self.ids, &self.config.recommended_owner);
        self.document = DocumentKind::from_filename(filename).map(|kind| DocumentInfo {
            filename: filename.to_string(),
            kind,
            text_len: text.len(),
        });

        if kpis == 0 {
            info!("No KPIs found in '{}'", filename);
            Ok(UploadOutcome::NoKpisFound)
        } else {
            info!("Loaded {} KPIs from '{}'", kpis, filename);
            Ok(UploadOutcome::Populated { kpis })
        }
    }

    /// The preview table, once a document has been processed.
    pub fn preview(&self) -> Option<&KpiTable> {
        self.document_uploaded().then(|| self.store.extracted())
    }

    /// The recommended table, once a document has been processed.
    pub fn recommended(&self) -> Option<&KpiTable> {
        self.document_uploaded().then(|| self.store.recommended())
    }

    /// The merged final table, once the review is finalized.
    pub fn final_table(&self) -> Option<&KpiTable> {
        if self.review_finalized {
            self.store.final_table()
        } else {
            None
        }
    }

    /// Accept or reject a preview row.
    pub fn decide(&mut self, id: KpiId, action: ReviewAction) -> Result<KpiStatus, WorkflowError> {
        self.require_document()?;
        if self.review_finalized {
            return Err(WorkflowError::AlreadyFinalized);
        }
        self.store.decide_preview(id, action)
    }

    pub fn accept(&mut self, id: KpiId) -> Result<KpiStatus, WorkflowError> {
        self.decide(id, ReviewAction::Accept)
    }

    pub fn reject(&mut self, id: KpiId) -> Result<KpiStatus, WorkflowError> {
        self.decide(id, ReviewAction::Reject)
    }

    /// Merge preview decisions and recommendations into the final table.
    /// Can only happen once per document.
    pub fn finalize(&mut self) -> Result<&KpiTable, WorkflowError> {
        self.require_document()?;
        if self.review_finalized {
            return Err(WorkflowError::AlreadyFinalized);
        }
        self.review_finalized = true;
        Ok(self.store.merge_final(&self.config.placeholder_owner))
    }

    /// Validate or reject a final-table row.
    pub fn decide_final(&mut self, id: KpiId, action: ReviewAction) -> Result<KpiStatus, WorkflowError> {
        self.require_document()?;
        if !self.review_finalized {
            return Err(WorkflowError::NotFinalized);
        }
        self.store.decide_final(id, action)
    }

    pub fn validate(&mut self, id: KpiId) -> Result<KpiStatus, WorkflowError> {
        self.decide_final(id, ReviewAction::Validate)
    }

    pub fn reject_final(&mut self, id: KpiId) -> Result<KpiStatus, WorkflowError> {
        self.decide_final(id, ReviewAction::Reject)
    }

    /// Actions currently offered for a row (empty for terminal or unknown rows).
    pub fn available_actions(&self, id: KpiId) -> &'static [ReviewAction] {
        if self.document_uploaded() {
            self.store.available_actions(id)
        } else {
            &[]
        }
    }

    /// Discard the document, all tables and all decisions.
    pub fn reset(&mut self) {
        if self.document.is_some() {
            info!("Resetting review state for '{}'", self.username);
        }
        self.store.clear();
        self.document = None;
        self.review_finalized = false;
    }

    /// End the session. All tables are dropped with it.
    pub fn logout(mut self) {
        self.reset();
        info!("User '{}' logged out", self.username);
    }

    pub fn snapshot(&self) -> SessionSnapshot<'_> {
        SessionSnapshot {
            username: &self.username,
            document: self.document.as_ref(),
            review_finalized: self.review_finalized,
            extracted: self.preview(),
            recommended: self.recommended(),
            final_table: self.final_table(),
        }
    }

    fn require_document(&self) -> Result<(), WorkflowError> {
        if self.document_uploaded() {
            Ok(())
        } else {
            Err(WorkflowError::NoDocument)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> ReviewSession {
        ReviewSession::new("admin", AnalysisConfig::default())
    }

    fn first_id(table: Option<&KpiTable>) -> KpiId {
        table.unwrap().records()[0].id
    }

    #[test]
    fn flags_gate_tables() {
        let mut s = session();
        assert!(s.preview().is_none());
        assert!(s.final_table().is_none());

        s.upload("brd.txt", "text/plain", b"time to fill").unwrap();
        assert!(s.document_uploaded());
        assert!(s.preview().is_some());
        assert!(s.final_table().is_none());

        s.finalize().unwrap();
        assert!(s.final_table().is_some());
    }

    #[test]
    fn failed_upload_leaves_state_untouched() {
        let mut s = session();
        s.upload("brd.txt", "", b"uptime").unwrap();
        let id = first_id(s.preview());
        s.accept(id).unwrap();
        s.finalize().unwrap();

        let err = s.upload("brd.rtf", "", b"automation").unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedType { .. }));
        assert!(s.review_finalized());
        assert_eq!(s.preview().unwrap().records()[0].name, "System Uptime");
        assert_eq!(s.final_table().unwrap().get(id).unwrap().status, KpiStatus::Accepted);
    }

    #[test]
    fn reupload_resets_everything() {
        let mut s = session();
        s.upload("a.txt", "", b"uptime").unwrap();
        let old = first_id(s.preview());
        s.reject(old).unwrap();
        s.finalize().unwrap();

        assert_eq!(
            s.upload("b.txt", "", b"automation").unwrap(),
            UploadOutcome::Populated { kpis: 1 }
        );
        assert!(!s.review_finalized());
        assert_eq!(s.preview().unwrap().records()[0].name, "Automation Rate");
        assert_eq!(s.preview().unwrap().records()[0].status, KpiStatus::Extracted);
        assert_eq!(s.document().unwrap().filename, "b.txt");
        assert!(matches!(s.accept(old), Err(WorkflowError::UnknownRecord(..))));
    }

    #[test]
    fn empty_text_is_no_kpis_found() {
        let mut s = session();
        assert_eq!(s.upload("blank.txt", "", b"  \n ").unwrap(), UploadOutcome::NoKpisFound);
        assert!(s.document_uploaded());
        assert!(s.preview().unwrap().is_empty());
        assert!(s.recommended().unwrap().is_empty());
    }

    #[test]
    fn decisions_locked_after_finalize() {
        let mut s = session();
        s.upload("a.txt", "", b"uptime").unwrap();
        let id = first_id(s.preview());
        s.finalize().unwrap();
        assert_eq!(s.accept(id), Err(WorkflowError::AlreadyFinalized));
        assert!(matches!(s.finalize(), Err(WorkflowError::AlreadyFinalized)));
    }

    #[test]
    fn final_actions_need_finalize() {
        let mut s = session();
        s.upload("a.txt", "", b"uptime").unwrap();
        let rec = first_id(s.recommended());
        assert_eq!(s.validate(rec), Err(WorkflowError::NotFinalized));
        s.finalize().unwrap();
        assert_eq!(s.validate(rec), Ok(KpiStatus::Validated));
        assert!(s.available_actions(rec).is_empty());
    }

    #[test]
    fn actions_without_document() {
        let mut s = session();
        let ghost = KpiId::new(1);
        assert_eq!(s.accept(ghost), Err(WorkflowError::NoDocument));
        assert!(matches!(s.finalize(), Err(WorkflowError::NoDocument)));
        assert!(s.available_actions(ghost).is_empty());
    }

    #[test]
    fn reset_clears_flags() {
        let mut s = session();
        s.upload("a.txt", "", b"uptime").unwrap();
        s.finalize().unwrap();
        s.reset();
        assert!(!s.document_uploaded());
        assert!(!s.review_finalized());
        assert!(s.preview().is_none());
    }

    #[test]
    fn snapshot_serializes_final_key() {
        let mut s = session();
        s.upload("a.txt", "", b"uptime").unwrap();
        s.finalize().unwrap();
        let json = serde_json::to_value(s.snapshot()).unwrap();
        assert_eq!(json["username"], "admin");
        assert_eq!(json["final"]["records"].as_array().unwrap().len(), 2);
        assert_eq!(json["extracted"]["records"][0]["status"], "Extracted");
    }
}
