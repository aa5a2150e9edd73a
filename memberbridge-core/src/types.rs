//! Domain types shared by the membership client, directory client and reconciler.
//!
//! Directory types serialize with the Admin Directory API field names
//! (camelCase). Absent optional fields are never serialized, so the same
//! structs double as request bodies.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// `type` value of the reserved external identifier entry.
pub const EXTERNAL_ID_TYPE: &str = "custom";

/// `customType` value of the reserved external identifier entry.
pub const CONSCRIBO_ID_TYPE: &str = "conscriboID";

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// The stable identifier of a member in the membership system.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct MemberCode(pub String);

impl MemberCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for MemberCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for MemberCode {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for MemberCode {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Source record
// ---------------------------------------------------------------------------

/// A membership record as returned by the `listRelations` command.
///
/// Conscribo returns every field as a string, a number or not at all; all of
/// them are normalised to strings here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Person {
    #[serde(default, deserialize_with = "lenient_string")]
    pub voornaam: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub achternaam: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient_code")]
    pub code: MemberCode,
    #[serde(default, deserialize_with = "lenient_string")]
    pub membership_ended: String,
}

impl Person {
    /// "First Last", used in log lines and CLI output.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.voornaam, self.achternaam)
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
        Flag(bool),
        Null(()),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Float(n) => n.to_string(),
        Raw::Flag(b) => b.to_string(),
        Raw::Null(()) => String::new(),
    })
}

fn lenient_code<'de, D>(deserializer: D) -> Result<MemberCode, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_string(deserializer).map(MemberCode)
}

// ---------------------------------------------------------------------------
// Directory records
// ---------------------------------------------------------------------------

/// Given/family name pair of a directory account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserName {
    #[serde(default)]
    pub given_name: String,
    #[serde(default)]
    pub family_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

impl UserName {
    pub fn new(given_name: impl Into<String>, family_name: impl Into<String>) -> Self {
        Self {
            given_name: given_name.into(),
            family_name: family_name.into(),
            full_name: None,
        }
    }

    /// Compares given and family name only; `fullName` is server-computed.
    pub fn same_as(&self, other: &UserName) -> bool {
        self.given_name == other.given_name && self.family_name == other.family_name
    }
}

/// A typed key/value annotation on a directory account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalId {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_type: Option<String>,
    #[serde(default)]
    pub value: String,
}

impl ExternalId {
    /// The reserved entry that carries a membership code.
    pub fn conscribo(code: &MemberCode) -> Self {
        Self {
            kind: EXTERNAL_ID_TYPE.to_owned(),
            custom_type: Some(CONSCRIBO_ID_TYPE.to_owned()),
            value: code.0.clone(),
        }
    }

    /// `true` for entries of the reserved `custom`/`conscriboID` type.
    pub fn is_conscribo(&self) -> bool {
        self.kind == EXTERNAL_ID_TYPE && self.custom_type.as_deref() == Some(CONSCRIBO_ID_TYPE)
    }
}

/// A user account in the directory service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryAccount {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub primary_email: String,
    #[serde(default)]
    pub name: UserName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recovery_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_password_at_next_login: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub external_ids: Vec<ExternalId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_unit_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suspended: Option<bool>,
}

impl DirectoryAccount {
    /// Values of every reserved external identifier entry on this account.
    pub fn conscribo_ids(&self) -> impl Iterator<Item = &str> {
        self.external_ids
            .iter()
            .filter(|id| id.is_conscribo())
            .map(|id| id.value.as_str())
    }
}

/// Partial account used for updates: only the supplied fields are overwritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AccountPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<UserName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recovery_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_ids: Option<Vec<ExternalId>>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
