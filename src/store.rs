//! In-memory KPI tables and the per-row status state machine.
//!
//! ```text
//!            preview                        final table
//! Extracted ──Accept──▶ Accepted ────────▶ Accepted   (terminal)
//!           ──Reject──▶ Rejected ────────▶ Rejected   (terminal)
//!           (none) ───────────────────────▶ Extracted ──Validate──▶ Validated
//!                                                    ──Reject────▶ Rejected
//! Recommended ───────────────────────────▶ Recommended ─Validate─▶ Validated
//!                                                    ──Reject────▶ Rejected
//! ```
//!
//! Rows are addressed by [`KpiId`]. Extracted rows keep their id in the
//! final table; recommended rows get their own id when derived.

use crate::error::WorkflowError;
use crate::model::{IdAllocator, KpiId, KpiRecord, KpiStatus, KpiTable, TableShape};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

/// A user action on one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReviewAction {
    /// Preview only: `Extracted → Accepted`.
    Accept,
    /// Preview: `Extracted → Rejected`. Final table: undecided row → `Rejected`.
    Reject,
    /// Final table only: undecided row → `Validated`.
    Validate,
}

impl ReviewAction {
    fn target(self) -> KpiStatus {
        match self {
            ReviewAction::Accept => KpiStatus::Accepted,
            ReviewAction::Reject => KpiStatus::Rejected,
            ReviewAction::Validate => KpiStatus::Validated,
        }
    }
}

/// Which table an action addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Preview,
    Final,
}

/// Actions a row in `status` offers at `stage`.
pub fn allowed_actions(stage: Stage, status: KpiStatus) -> &'static [ReviewAction] {
    match (stage, status) {
        (Stage::Preview, KpiStatus::Extracted) => &[ReviewAction::Accept, ReviewAction::Reject],
        (Stage::Final, KpiStatus::Extracted | KpiStatus::Recommended) => {
            &[ReviewAction::Validate, ReviewAction::Reject]
        }
        _ => &[],
    }
}

/// Build the recommended table: one `Recommended` row per extracted row,
/// same name and target, owner set to `owner`.
pub fn derive_recommendations(extracted: &KpiTable, ids: &mut IdAllocator, owner: &str) -> KpiTable {
    let mut table = KpiTable::new(TableShape::Recommended);
    for row in extracted {
        table.push(KpiRecord {
            id: ids.next_id(),
            name: row.name.clone(),
            description: row.description.clone(),
            target: row.target.clone(),
            owner: Some(owner.to_string()),
            status: KpiStatus::Recommended,
            source: Some(row.id),
        });
    }
    table
}

/// Tables and decisions for one analysed document.
#[derive(Debug, Clone)]
pub struct KpiRecordStore {
    extracted: KpiTable,
    recommended: KpiTable,
    decisions: BTreeMap<KpiId, KpiStatus>,
    final_table: Option<KpiTable>,
}

impl Default for KpiRecordStore {
    fn default() -> Self {
        Self {
            extracted: KpiTable::new(TableShape::Extracted),
            recommended: KpiTable::new(TableShape::Recommended),
            decisions: BTreeMap::new(),
            final_table: None,
        }
    }
}

impl KpiRecordStore {
    /// Replace all contents with a freshly classified table and its
    /// recommendations. Previous decisions are dropped.
    pub fn load(&mut self, extracted: KpiTable, ids: &mut IdAllocator, owner: &str) {
        let recommended = derive_recommendations(&extracted, ids, owner);
        *self = Self {
            extracted,
            recommended,
            ..Self::default()
        };
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn extracted(&self) -> &KpiTable {
        &self.extracted
    }

    pub fn recommended(&self) -> &KpiTable {
        &self.recommended
    }

    pub fn final_table(&self) -> Option<&KpiTable> {
        self.final_table.as_ref()
    }

    /// Preview decision recorded for an extracted row, if any.
    pub fn decision(&self, id: KpiId) -> Option<KpiStatus> {
        self.decisions.get(&id).copied()
    }

    /// Apply `Accept`/`Reject` to an extracted row.
    pub fn decide_preview(&mut self, id: KpiId, action: ReviewAction) -> Result<KpiStatus, WorkflowError> {
        let row = self
            .extracted
            .get_mut(id)
            .ok_or(WorkflowError::UnknownRecord(id, TableShape::Extracted.label()))?;
        let to = transition(Stage::Preview, row, action)?;
        self.decisions.insert(id, to);
        info!("Preview decision: {} '{}' → {}", id, row.name, to);
        Ok(to)
    }

    /// Build the final table: every extracted row (owner = `placeholder_owner`,
    /// status = its preview decision or `Extracted`), then every recommended
    /// row unchanged.
    pub fn merge_final(&mut self, placeholder_owner: &str) -> &KpiTable {
        let mut table = KpiTable::new(TableShape::Recommended);
        for row in &self.extracted {
            table.push(KpiRecord {
                owner: Some(placeholder_owner.to_string()),
                status: self.decision(row.id).unwrap_or(KpiStatus::Extracted),
                ..row.clone()
            });
        }
        for row in &self.recommended {
            table.push(row.clone());
        }
        info!("Final table built: {} rows", table.len());
        self.final_table.insert(table)
    }

    /// Apply `Validate`/`Reject` to a final-table row.
    pub fn decide_final(&mut self, id: KpiId, action: ReviewAction) -> Result<KpiStatus, WorkflowError> {
        let table = self.final_table.as_mut().ok_or(WorkflowError::NotFinalized)?;
        let row = table
            .get_mut(id)
            .ok_or(WorkflowError::UnknownRecord(id, "final"))?;
        let to = transition(Stage::Final, row, action)?;
        info!("Final decision: {} '{}' → {}", id, row.name, to);
        Ok(to)
    }

    /// Actions the row currently offers: final-table actions once the final
    /// table exists, preview actions before that.
    pub fn available_actions(&self, id: KpiId) -> &'static [ReviewAction] {
        match &self.final_table {
            Some(table) => table
                .get(id)
                .map(|r| allowed_actions(Stage::Final, r.status))
                .unwrap_or(&[]),
            None => self
                .extracted
                .get(id)
                .map(|r| allowed_actions(Stage::Preview, r.status))
                .unwrap_or(&[]),
        }
    }
}

fn transition(stage: Stage, row: &mut KpiRecord, action: ReviewAction) -> Result<KpiStatus, WorkflowError> {
    let to = action.target();
    if !allowed_actions(stage, row.status).contains(&action) {
        return Err(WorkflowError::TransitionNotAllowed {
            id: row.id,
            from: row.status,
            to,
        });
    }
    row.status = to;
    Ok(to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::config::AnalysisConfig;

    fn loaded(text: &str) -> (KpiRecordStore, IdAllocator) {
        let mut ids = IdAllocator::default();
        let table = classify(text, &mut ids, &AnalysisConfig::default());
        let mut store = KpiRecordStore::default();
        store.load(table, &mut ids, "Talent Acquisition / IT");
        (store, ids)
    }

    fn id_of(table: &KpiTable, name: &str) -> KpiId {
        table.iter().find(|r| r.name == name).map(|r| r.id).unwrap()
    }

    #[test]
    fn recommendations_mirror_extracted_rows() {
        let (store, _) = loaded("time to fill and uptime");
        let rec = store.recommended();
        assert_eq!(rec.len(), 2);
        for (r, e) in rec.iter().zip(store.extracted()) {
            assert_eq!(r.name, e.name);
            assert_eq!(r.target, e.target);
            assert_eq!(r.owner.as_deref(), Some("Talent Acquisition / IT"));
            assert_eq!(r.status, KpiStatus::Recommended);
            assert_eq!(r.source, Some(e.id));
            assert_ne!(r.id, e.id);
        }
    }

    #[test]
    fn undecided_row_merges_as_extracted() {
        let (mut store, _) = loaded("time to fill");
        let id = id_of(store.extracted(), "Time-to-Fill");
        let final_table = store.merge_final("-");
        assert_eq!(final_table.len(), 2);
        assert_eq!(final_table.get(id).unwrap().status, KpiStatus::Extracted);
        assert_eq!(final_table.get(id).unwrap().owner.as_deref(), Some("-"));
        assert_eq!(final_table.records()[1].status, KpiStatus::Recommended);
    }

    #[test]
    fn accepted_row_is_terminal_in_final_table() {
        let (mut store, _) = loaded("time to fill");
        let id = id_of(store.extracted(), "Time-to-Fill");
        assert_eq!(store.decide_preview(id, ReviewAction::Accept), Ok(KpiStatus::Accepted));
        store.merge_final("-");
        assert_eq!(store.final_table().unwrap().get(id).unwrap().status, KpiStatus::Accepted);
        assert!(store.available_actions(id).is_empty());
        assert!(matches!(
            store.decide_final(id, ReviewAction::Validate),
            Err(WorkflowError::TransitionNotAllowed { .. })
        ));
    }

    #[test]
    fn decisions_follow_ids_not_positions() {
        let (mut store, _) = loaded("uptime, automation");
        let uptime = id_of(store.extracted(), "System Uptime");
        let automation = id_of(store.extracted(), "Automation Rate");
        store.decide_preview(uptime, ReviewAction::Reject).unwrap();

        let final_table = store.merge_final("-");
        assert_eq!(final_table.get(uptime).unwrap().status, KpiStatus::Rejected);
        assert_eq!(final_table.get(automation).unwrap().status, KpiStatus::Extracted);
    }

    #[test]
    fn preview_decision_only_once() {
        let (mut store, _) = loaded("uptime");
        let id = id_of(store.extracted(), "System Uptime");
        store.decide_preview(id, ReviewAction::Reject).unwrap();
        let err = store.decide_preview(id, ReviewAction::Accept).unwrap_err();
        assert_eq!(
            err,
            WorkflowError::TransitionNotAllowed {
                id,
                from: KpiStatus::Rejected,
                to: KpiStatus::Accepted
            }
        );
    }

    #[test]
    fn validate_is_not_a_preview_action() {
        let (mut store, _) = loaded("uptime");
        let id = id_of(store.extracted(), "System Uptime");
        assert!(store.decide_preview(id, ReviewAction::Validate).is_err());
        assert_eq!(store.decision(id), None);
    }

    #[test]
    fn recommended_rows_validate_or_reject() {
        let (mut store, _) = loaded("uptime, automation");
        let rec_ids: Vec<KpiId> = store.recommended().iter().map(|r| r.id).collect();
        store.merge_final("-");

        assert_eq!(
            store.available_actions(rec_ids[0]),
            &[ReviewAction::Validate, ReviewAction::Reject]
        );
        assert_eq!(store.decide_final(rec_ids[0], ReviewAction::Validate), Ok(KpiStatus::Validated));
        assert_eq!(store.decide_final(rec_ids[1], ReviewAction::Reject), Ok(KpiStatus::Rejected));
        assert!(store.available_actions(rec_ids[0]).is_empty());
        assert!(store.decide_final(rec_ids[0], ReviewAction::Reject).is_err());
        assert!(store.decide_final(rec_ids[1], ReviewAction::Accept).is_err());
    }

    #[test]
    fn final_action_before_merge() {
        let (mut store, _) = loaded("uptime");
        let id = id_of(store.recommended(), "System Uptime");
        assert_eq!(
            store.decide_final(id, ReviewAction::Validate),
            Err(WorkflowError::NotFinalized)
        );
    }

    #[test]
    fn unknown_id() {
        let (mut store, mut ids) = loaded("uptime");
        let ghost = ids.next_id();
        assert!(matches!(
            store.decide_preview(ghost, ReviewAction::Accept),
            Err(WorkflowError::UnknownRecord(..))
        ));
        assert!(store.available_actions(ghost).is_empty());
    }

    #[test]
    fn load_drops_previous_decisions() {
        let (mut store, mut ids) = loaded("uptime");
        let old = id_of(store.extracted(), "System Uptime");
        store.decide_preview(old, ReviewAction::Accept).unwrap();
        store.merge_final("-");

        let table = classify("uptime", &mut ids, &AnalysisConfig::default());
        store.load(table, &mut ids, "TA");
        assert!(store.final_table().is_none());
        assert_eq!(store.decision(old), None);
        assert!(store.extracted().iter().all(|r| r.status == KpiStatus::Extracted));
    }
}
