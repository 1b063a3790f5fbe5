//! KPI classification: plain text → deduplicated table of candidate KPIs.
//!
//! This is pattern matching over a fixed HR-recruitment vocabulary, not
//! language understanding. Three passes run in order:
//!
//! 1. **Rules** — each entry of [`RULES`] is tested against the lowercased
//!    text and contributes at most one row, however often its trigger occurs.
//! 2. **Fallback** — only when no rule fired: every trimmed, non-empty line
//!    mentioning one of [`FALLBACK_KEYWORDS`] becomes an "Inferred KPI"
//!    candidate, up to [`AnalysisConfig::fallback_max_records`] candidates.
//! 3. **Dedup** — candidates sharing a name collapse to the first one. All
//!    fallback candidates share the name "Inferred KPI", so the fallback
//!    contributes at most one row to the table.
//!
//! Rule order is output order.

use crate::config::AnalysisConfig;
use crate::model::{IdAllocator, KpiRecord, KpiTable, TableShape};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

/// One entry of the rule table.
#[derive(Debug)]
pub struct KpiRule {
    trigger: Regex,
    pub name: &'static str,
    pub description: &'static str,
    pub target: &'static str,
}

impl KpiRule {
    fn new(
        pattern: &str,
        name: &'static str,
        description: &'static str,
        target: &'static str,
    ) -> Self {
        Self {
            trigger: Regex::new(pattern).unwrap(),
            name,
            description,
            target,
        }
    }

    /// `lowered` must already be lowercase.
    pub fn matches(&self, lowered: &str) -> bool {
        self.trigger.is_match(lowered)
    }
}

/// The canonical rule table, in output order.
pub static RULES: Lazy<Vec<KpiRule>> = Lazy::new(|| {
    vec![
        KpiRule::new(
            r"drop[\s-]?off",
            "Application Drop-off Rate",
            "Percentage of candidates abandoning applications",
            "Reduce",
        ),
        KpiRule::new(
            r"time[\s-]?to[\s-]?fill",
            "Time-to-Fill",
            "Average days from requisition to offer",
            "< 30 days",
        ),
        KpiRule::new(
            r"candidate satisfaction|candidate experience|satisfaction score",
            "Candidate Satisfaction Score",
            "Candidate survey rating",
            "> 8/10",
        ),
        KpiRule::new(
            r"automation|automate",
            "Automation Rate",
            "Percentage of workflows automated",
            "> 80%",
        ),
        // "1000" and "requisition" on the same line, in that order.
        KpiRule::new(
            r"\b1000\b.*requisition|1000 requisition",
            "Requisition Throughput",
            "No. of requisitions handled per day",
            "1000/day",
        ),
        KpiRule::new(
            r"uptime|availability",
            "System Uptime",
            "Service availability percentage",
            "> 99%",
        ),
        KpiRule::new(
            r"recruiter productivity|productivity",
            "Recruiter Productivity",
            "Avg. requisitions closed per recruiter",
            "Increase",
        ),
        KpiRule::new(
            r"integrat",
            "Integration Success Rate",
            "Percent integrations working without manual intervention",
            "> 95%",
        ),
    ]
});

/// Keywords that qualify a line for the fallback pass.
pub const FALLBACK_KEYWORDS: [&str; 8] = [
    "success",
    "measure",
    "kpi",
    "drop",
    "time-to-fill",
    "satisfaction",
    "uptime",
    "automation",
];

pub const INFERRED_KPI_NAME: &str = "Inferred KPI";
const ELLIPSIS: &str = "...";

struct Candidate {
    name: String,
    description: String,
    target: String,
}

/// Classify `text`, assigning ids from `ids`.
///
/// Every returned row has status `Extracted`. An empty or KPI-free text
/// yields an empty table.
pub fn classify(text: &str, ids: &mut IdAllocator, config: &AnalysisConfig) -> KpiTable {
    let mut candidates = rule_candidates(text);

    if candidates.is_empty() {
        candidates = fallback_candidates(text, config);
        if !candidates.is_empty() {
            info!(
                "No rule matched; inferred {} candidate(s) from keyword lines",
                candidates.len()
            );
        }
    }

    let mut table = KpiTable::new(TableShape::Extracted);
    for c in candidates {
        if table.contains_name(&c.name) {
            debug!("Dropping duplicate KPI '{}'", c.name);
            continue;
        }
        table.push(KpiRecord::extracted(ids.next_id(), c.name, c.description, c.target));
    }
    table
}

/// [`classify`] with default settings and a fresh id sequence.
pub fn classify_text(text: &str) -> KpiTable {
    classify(text, &mut IdAllocator::default(), &AnalysisConfig::default())
}

// ── Pass 1: rule table ───────────────────────────────────────────────────────

fn rule_candidates(text: &str) -> Vec<Candidate> {
    let lowered = text.to_lowercase();
    RULES
        .iter()
        .filter(|rule| rule.matches(&lowered))
        .inspect(|rule| debug!("Rule hit: {}", rule.name))
        .map(|rule| Candidate {
            name: rule.name.to_string(),
            description: rule.description.to_string(),
            target: rule.target.to_string(),
        })
        .collect()
}

// ── Pass 2: keyword-line fallback ────────────────────────────────────────────

fn fallback_candidates(text: &str, config: &AnalysisConfig) -> Vec<Candidate> {
    split_lines(text)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| {
            let lowered = line.to_lowercase();
            FALLBACK_KEYWORDS.iter().any(|kw| lowered.contains(kw))
        })
        .take(config.fallback_max_records)
        .map(|line| Candidate {
            name: INFERRED_KPI_NAME.to_string(),
            description: shorten(line, config.fallback_description_limit),
            target: "-".to_string(),
        })
        .collect()
}

/// Line boundaries as understood by most text tooling: `\n`, `\r`, vertical
/// tab, form feed (PDF page breaks), file/group/record separators, NEL and
/// the Unicode line/paragraph separators.
fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| {
        matches!(
            c,
            '\n' | '\r' | '\u{0B}' | '\u{0C}' | '\u{1C}' | '\u{1D}' | '\u{1E}' | '\u{85}'
                | '\u{2028}' | '\u{2029}'
        )
    })
}

/// Cut `line` to `limit` characters, appending "..." only when something was cut.
fn shorten(line: &str, limit: usize) -> String {
    match line.char_indices().nth(limit) {
        Some((byte_idx, _)) => format!("{}{}", &line[..byte_idx], ELLIPSIS),
        None => line.to_string(),
    }
}
