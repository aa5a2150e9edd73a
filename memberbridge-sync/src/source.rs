//! Seams between the reconciler and the two remote systems.

use memberbridge_conscribo::{ConscriboClient, ConscriboError, Session};
use memberbridge_core::{AccountPatch, DirectoryAccount, Person};
use memberbridge_directory::{DirectoryClient, DirectoryError};

/// Where the roster comes from.
pub trait MembershipSource {
    type Session;

    /// Obtain a session; failure aborts the pass.
    fn authenticate(&self) -> Result<Self::Session, ConscriboError>;

    /// The full roster. An `Err` means no data, never an empty roster.
    fn list_people(&self, session: &Self::Session) -> Result<Vec<Person>, ConscriboError>;
}

/// Where accounts live.
pub trait Directory {
    /// Every account, paginated transparently.
    fn list_all_accounts(&self) -> Result<Vec<DirectoryAccount>, DirectoryError>;

    fn insert(&self, account: &DirectoryAccount) -> Result<(), DirectoryError>;

    /// Overwrite the fields present in `patch` on the account keyed by `primary_email`.
    fn update(&self, patch: &AccountPatch, primary_email: &str) -> Result<(), DirectoryError>;
}

impl MembershipSource for ConscriboClient {
    type Session = Session;

    fn authenticate(&self) -> Result<Session, ConscriboError> {
        ConscriboClient::authenticate(self)
    }

    fn list_people(&self, session: &Session) -> Result<Vec<Person>, ConscriboError> {
        ConscriboClient::list_people(self, session)
    }
}

impl Directory for DirectoryClient {
    fn list_all_accounts(&self) -> Result<Vec<DirectoryAccount>, DirectoryError> {
        DirectoryClient::list_all_accounts(self)
    }

    fn insert(&self, account: &DirectoryAccount) -> Result<(), DirectoryError> {
        DirectoryClient::insert(self, account)
    }

    fn update(&self, patch: &AccountPatch, primary_email: &str) -> Result<(), DirectoryError> {
        DirectoryClient::update(self, patch, primary_email)
    }
}
