//! # memberbridge-conscribo
//!
//! Membership source client: authenticates against the Conscribo JSON API
//! and retrieves the member roster.

mod client;
pub mod error;
mod wire;

pub use client::{
    ConscriboClient, FieldDefinition, Session, API_VERSION, MEMBER_ENTITY, PERSON_FIELDS,
};
pub use error::{CallError, ConscriboError, ConscriboResult};
