//! Data model: KPI rows, their lifecycle status, and ordered tables of rows.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable row identifier, assigned when a record is created and carried
/// unchanged through preview, recommendation and merge.
///
/// Decisions are keyed by `KpiId`, never by table position, so filtering or
/// reordering a table cannot make a decision land on the wrong row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KpiId(u64);

impl KpiId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for KpiId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out increasing [`KpiId`]s for one session.
#[derive(Debug, Default, Clone)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn next_id(&mut self) -> KpiId {
        self.next += 1;
        KpiId(self.next)
    }
}

/// Lifecycle status of a KPI row.
///
/// ```text
/// Extracted ──▶ Accepted | Rejected          (preview decision)
/// Recommended ──▶ Validated | Rejected       (final-table decision)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KpiStatus {
    Extracted,
    Accepted,
    Rejected,
    Recommended,
    Validated,
}

impl KpiStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            KpiStatus::Extracted => "Extracted",
            KpiStatus::Accepted => "Accepted",
            KpiStatus::Rejected => "Rejected",
            KpiStatus::Recommended => "Recommended",
            KpiStatus::Validated => "Validated",
        }
    }
}

impl fmt::Display for KpiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of a KPI table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KpiRecord {
    pub id: KpiId,
    /// Human-readable KPI identifier, e.g. "Time-to-Fill". Unique per extracted table.
    pub name: String,
    pub description: String,
    /// Free-text target expression; `"-"` when unset.
    pub target: String,
    /// Owner/SME. Only present in the recommended/final shape.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    pub status: KpiStatus,
    /// The extracted row this one was derived from, for recommended and
    /// merged rows.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<KpiId>,
}

impl KpiRecord {
    /// A classifier-produced row in the `Extracted` state.
    pub fn extracted(
        id: KpiId,
        name: impl Into<String>,
        description: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            target: target.into(),
            owner: None,
            status: KpiStatus::Extracted,
            source: None,
        }
    }
}

/// Column layout of a [`KpiTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableShape {
    /// `KPI Name, Description, Target Value, Status`
    Extracted,
    /// `KPI Name, Owner/SME, Target Value, Status`
    Recommended,
}

impl TableShape {
    pub fn headers(self) -> [&'static str; 4] {
        match self {
            TableShape::Extracted => ["KPI Name", "Description", "Target Value", "Status"],
            TableShape::Recommended => ["KPI Name", "Owner/SME", "Target Value", "Status"],
        }
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            TableShape::Extracted => "extracted",
            TableShape::Recommended => "recommended",
        }
    }
}

/// An ordered sequence of rows sharing one [`TableShape`].
///
/// Insertion order is display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KpiTable {
    pub shape: TableShape,
    records: Vec<KpiRecord>,
}

impl KpiTable {
    pub fn new(shape: TableShape) -> Self {
        Self {
            shape,
            records: Vec::new(),
        }
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.records.iter().any(|r| r.name == name)
    }

    /// Append a row. Name uniqueness is the caller's concern: extracted
    /// tables are deduplicated by the classifier, while final tables hold
    /// the same KPI name twice (extracted row and its recommendation).
    pub fn push(&mut self, record: KpiRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[KpiRecord] {
        &self.records
    }

    pub fn get(&self, id: KpiId) -> Option<&KpiRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: KpiId) -> Option<&mut KpiRecord> {
        self.records.iter_mut().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, KpiRecord> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a KpiTable {
    type Item = &'a KpiRecord;
    type IntoIter = std::slice::Iter<'a, KpiRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Supported upload formats, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentKind {
    Docx,
    Pdf,
    Txt,
}

impl DocumentKind {
    /// Case-insensitive suffix match on the file name, checked in the order
    /// `.docx`, `.pdf`, `.txt`. The declared MIME type plays no part.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let lower = filename.to_lowercase();
        if lower.ends_with(".docx") {
            Some(DocumentKind::Docx)
        } else if lower.ends_with(".pdf") {
            Some(DocumentKind::Pdf)
        } else if lower.ends_with(".txt") {
            Some(DocumentKind::Txt)
        } else {
            None
        }
    }
}
