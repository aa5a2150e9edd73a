//! Error types for memberbridge-sync.

use thiserror::Error;

use memberbridge_conscribo::ConscriboError;
use memberbridge_directory::DirectoryError;

/// Failures that abort a whole pass before any account is touched.
///
/// Per-person failures never surface here; they are recorded as
/// [`Outcome::Failed`](crate::Outcome::Failed) and the pass continues.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Authentication or roster fetch against the membership API failed.
    #[error("membership source error: {0}")]
    Membership(#[from] ConscriboError),

    /// The directory snapshot could not be fetched.
    #[error("directory error: {0}")]
    Directory(#[from] DirectoryError),
}
