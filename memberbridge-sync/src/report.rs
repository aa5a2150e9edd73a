//! Result of a complete pass.

use chrono::{DateTime, Utc};
use serde::Serialize;

use memberbridge_core::MemberCode;

use crate::reconcile::Outcome;

/// Outcome for one roster entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordResult {
    pub person: String,
    pub code: MemberCode,
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// Everything a pass did, in roster order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PassReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub dry_run: bool,
    pub roster_size: usize,
    pub directory_size: usize,
    pub records: Vec<RecordResult>,
}

/// Counts per outcome kind. Dry-run outcomes count as the action they preview.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl PassReport {
    pub fn summary(&self) -> Summary {
        let mut summary = Summary::default();
        for record in &self.records {
            match record.outcome {
                Outcome::Inserted { .. } | Outcome::WouldInsert { .. } => summary.inserted += 1,
                Outcome::Updated { .. } | Outcome::WouldUpdate { .. } => summary.updated += 1,
                Outcome::Unchanged { .. } => summary.unchanged += 1,
                Outcome::Skipped { .. } => summary.skipped += 1,
                Outcome::Failed { .. } => summary.failed += 1,
            }
        }
        summary
    }
}
