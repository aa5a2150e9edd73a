//! memberbridge core library: domain types, address derivation, matching, property store.
//!
//! - [`types`]: membership and directory records
//! - [`address`]: primary address derivation and initial passwords
//! - [`matcher`]: join between people and accounts
//! - [`properties`]: configuration loading
//! - [`error`]: [`PropertyError`], [`AddressError`]

pub mod address;
pub mod error;
pub mod matcher;
pub mod properties;
pub mod types;

pub use error::{AddressError, PropertyError};
pub use properties::Settings;
pub use types::{
    AccountPatch, DirectoryAccount, ExternalId, MemberCode, Person, UserName, CONSCRIBO_ID_TYPE,
    EXTERNAL_ID_TYPE,
};
