//! # memberbridge-directory
//!
//! Directory client for the Google Workspace Admin Directory API: full
//! paginated user listing plus single-account insert and update.

mod client;
pub mod error;

pub use client::{AccountPage, DirectoryClient, ORDER_BY};
pub use error::{DirectoryError, DirectoryResult};
