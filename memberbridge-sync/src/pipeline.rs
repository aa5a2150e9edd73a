//! Pass entrypoint shared by every CLI command that reconciles.

use chrono::Utc;
use tracing::info;

use crate::reconcile::{reconcile_person, ReconcileOptions};
use crate::report::{PassReport, RecordResult};
use crate::source::{Directory, MembershipSource};
use crate::SyncError;

/// Run one pass: authenticate, fetch the roster, fetch the directory
/// snapshot once, then reconcile every person in roster order.
///
/// Authentication, roster or snapshot failure aborts before any mutation.
/// Per-person failures are recorded in the report and never abort the pass.
pub fn run_pass<S, D>(
    source: &S,
    directory: &D,
    options: &ReconcileOptions,
) -> Result<PassReport, SyncError>
where
    S: MembershipSource,
    D: Directory,
{
    let started_at = Utc::now();

    let session = source.authenticate()?;
    let roster = source.list_people(&session)?;
    info!(members = roster.len(), "roster fetched");

    let snapshot = directory.list_all_accounts()?;

    let mut records = Vec::with_capacity(roster.len());
    for person in &roster {
        let outcome = reconcile_person(directory, person, &snapshot, options);
        records.push(RecordResult {
            person: person.display_name(),
            code: person.code.clone(),
            outcome,
        });
    }

    Ok(PassReport {
        started_at,
        finished_at: Utc::now(),
        dry_run: options.dry_run,
        roster_size: roster.len(),
        directory_size: snapshot.len(),
        records,
    })
}
