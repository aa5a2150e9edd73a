//! Per-person action: decide, build the request, call the directory, log.
//!
//! Every failure here is local to one person: it is logged, recorded as
//! [`Outcome::Failed`] or [`Outcome::Skipped`], and the pass moves on.

use serde::Serialize;
use tracing::{error, info, warn};

use memberbridge_core::address::{derive_primary_address, generate_password};
use memberbridge_core::{
    AccountPatch, AddressError, DirectoryAccount, ExternalId, Person, UserName,
};

use crate::classify::{classify, name_drift, Decision, StaleReason};
use crate::source::Directory;

// ---------------------------------------------------------------------------
// Options and outcome
// ---------------------------------------------------------------------------

/// Settings that shape every decision in a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Domain appended to derived primary addresses.
    pub domain: String,
    /// Organizational unit for new accounts.
    pub org_unit: String,
    /// Treat name drift as a reason to update.
    pub compare_names: bool,
    /// Classify and log only; issue no mutations.
    pub dry_run: bool,
}

/// The mutation a failed outcome was attempting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Insert,
    Update,
}

/// Outcome of reconciling a single person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// A new account was created.
    Inserted { primary_email: String },
    /// An existing account was corrected.
    Updated {
        primary_email: String,
        reasons: Vec<StaleReason>,
    },
    /// The matched account already reflects the person.
    Unchanged { primary_email: String },
    /// Dry run: an account *would* have been created.
    WouldInsert { primary_email: String },
    /// Dry run: an account *would* have been updated.
    WouldUpdate {
        primary_email: String,
        reasons: Vec<StaleReason>,
    },
    /// No request was attempted for this person.
    Skipped { reason: String },
    /// The directory rejected the request or could not be reached.
    Failed {
        action: Action,
        primary_email: String,
        error: String,
    },
}

// ---------------------------------------------------------------------------
// Request builders
// ---------------------------------------------------------------------------

/// Full account for a person with no directory entry yet.
pub fn new_account(
    person: &Person,
    options: &ReconcileOptions,
    password: String,
) -> Result<DirectoryAccount, AddressError> {
    let primary_email =
        derive_primary_address(&person.voornaam, &person.achternaam, &options.domain)?;
    Ok(DirectoryAccount {
        primary_email,
        name: UserName::new(&person.voornaam, &person.achternaam),
        password: Some(password),
        recovery_email: Some(person.email.clone()),
        change_password_at_next_login: Some(true),
        external_ids: vec![ExternalId::conscribo(&person.code)],
        org_unit_path: Some(options.org_unit.clone()),
        ..Default::default()
    })
}

/// Partial record correcting name, recovery address and external ids.
///
/// Entries of other external-id types are carried over; reserved entries are
/// collapsed to exactly one holding the person's code.
pub fn update_patch(person: &Person, account: &DirectoryAccount) -> AccountPatch {
    let mut external_ids: Vec<ExternalId> = account
        .external_ids
        .iter()
        .filter(|id| !id.is_conscribo())
        .cloned()
        .collect();
    external_ids.push(ExternalId::conscribo(&person.code));

    AccountPatch {
        name: Some(UserName::new(&person.voornaam, &person.achternaam)),
        recovery_email: Some(person.email.clone()),
        external_ids: Some(external_ids),
    }
}

// ---------------------------------------------------------------------------
// reconcile_person
// ---------------------------------------------------------------------------

/// Classify one person and carry out the resulting action.
pub fn reconcile_person<D: Directory>(
    directory: &D,
    person: &Person,
    snapshot: &[DirectoryAccount],
    options: &ReconcileOptions,
) -> Outcome {
    let who = person.display_name();

    if person.code.is_empty() {
        warn!(
            person = %who,
            "member has no code; its account will not be matched on later passes"
        );
    }

    match classify(person, snapshot, options.compare_names) {
        Decision::New => insert(directory, person, options),
        Decision::Stale { account, reasons } => update(directory, person, account, reasons, options),
        Decision::Synced { account } => {
            if name_drift(person, account) {
                warn!(
                    person = %who,
                    primary_email = %account.primary_email,
                    "name drift ignored; enable name comparison to update it"
                );
            }
            info!(person = %who, primary_email = %account.primary_email, "already up to date");
            Outcome::Unchanged {
                primary_email: account.primary_email.clone(),
            }
        }
    }
}

fn insert<D: Directory>(directory: &D, person: &Person, options: &ReconcileOptions) -> Outcome {
    let who = person.display_name();
    let account = match new_account(person, options, generate_password()) {
        Ok(account) => account,
        Err(err) => {
            warn!(person = %who, error = %err, "skipping member");
            return Outcome::Skipped {
                reason: err.to_string(),
            };
        }
    };
    let primary_email = account.primary_email.clone();

    if options.dry_run {
        info!(person = %who, %primary_email, "[dry-run] would create account");
        return Outcome::WouldInsert { primary_email };
    }

    info!(person = %who, %primary_email, "creating account");
    match directory.insert(&account) {
        Ok(()) => {
            info!(person = %who, %primary_email, "account created");
            Outcome::Inserted { primary_email }
        }
        Err(err) => {
            error!(person = %who, %primary_email, error = %err, "error creating account");
            Outcome::Failed {
                action: Action::Insert,
                primary_email,
                error: err.to_string(),
            }
        }
    }
}

fn update<D: Directory>(
    directory: &D,
    person: &Person,
    account: &DirectoryAccount,
    reasons: Vec<StaleReason>,
    options: &ReconcileOptions,
) -> Outcome {
    let who = person.display_name();
    let primary_email = account.primary_email.clone();
    let changed = reasons
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");

    if options.dry_run {
        info!(person = %who, %primary_email, %changed, "[dry-run] would update account");
        return Outcome::WouldUpdate {
            primary_email,
            reasons,
        };
    }

    let patch = update_patch(person, account);
    match directory.update(&patch, &primary_email) {
        Ok(()) => {
            info!(person = %who, %primary_email, %changed, "account updated");
            Outcome::Updated {
                primary_email,
                reasons,
            }
        }
        Err(err) => {
            error!(person = %who, %primary_email, error = %err, "error updating account");
            Outcome::Failed {
                action: Action::Update,
                primary_email,
                error: err.to_string(),
            }
        }
    }
}
