//! Per-person classification against the directory snapshot.
//!
//! States:
//! 1. `New`: no account carries the person's code
//! 2. `Stale`: an account matches but recovery address or reserved id differ
//!    (or the name, when name comparison is enabled)
//! 3. `Synced`: an account matches and nothing relevant differs

use std::fmt;

use serde::Serialize;

use memberbridge_core::matcher::find_by_code;
use memberbridge_core::{DirectoryAccount, Person, UserName};

/// Why a matched account needs an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StaleReason {
    RecoveryEmail,
    ExternalId,
    Name,
}

impl fmt::Display for StaleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaleReason::RecoveryEmail => write!(f, "recovery email"),
            StaleReason::ExternalId => write!(f, "external id"),
            StaleReason::Name => write!(f, "name"),
        }
    }
}

/// Classification of one person.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision<'a> {
    New,
    Synced {
        account: &'a DirectoryAccount,
    },
    Stale {
        account: &'a DirectoryAccount,
        reasons: Vec<StaleReason>,
    },
}

/// Classify `person` against `accounts`.
///
/// With `compare_names` off, a differing name alone leaves the account
/// `Synced`; see [`name_drift`].
pub fn classify<'a>(
    person: &Person,
    accounts: &'a [DirectoryAccount],
    compare_names: bool,
) -> Decision<'a> {
    let Some(account) = find_by_code(accounts, &person.code) else {
        return Decision::New;
    };

    let mut reasons = Vec::new();
    if account.recovery_email.as_deref() != Some(person.email.as_str()) {
        reasons.push(StaleReason::RecoveryEmail);
    }
    let ids: Vec<&str> = account.conscribo_ids().collect();
    if ids != [person.code.as_str()] {
        reasons.push(StaleReason::ExternalId);
    }
    if compare_names && name_drift(person, account) {
        reasons.push(StaleReason::Name);
    }

    if reasons.is_empty() {
        Decision::Synced { account }
    } else {
        Decision::Stale { account, reasons }
    }
}

/// `true` when the account's given/family name differs from the person's.
pub fn name_drift(person: &Person, account: &DirectoryAccount) -> bool {
    !account
        .name
        .same_as(&UserName::new(&person.voornaam, &person.achternaam))
}
