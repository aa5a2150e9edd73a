//! # memberbridge-sync
//!
//! Reconciliation of the membership roster into the directory.
//!
//! Call [`pipeline::run_pass`] with a [`MembershipSource`] and a
//! [`Directory`] to perform one pass.

pub mod classify;
pub mod error;
pub mod pipeline;
pub mod reconcile;
pub mod report;
pub mod source;

pub use classify::{classify, Decision, StaleReason};
pub use error::SyncError;
pub use reconcile::{Action, Outcome, ReconcileOptions};
pub use report::{PassReport, RecordResult, Summary};
pub use source::{Directory, MembershipSource};
