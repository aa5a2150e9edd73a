//! Blocking HTTP client for the Conscribo membership API.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, error, info};

use memberbridge_core::properties::{ConscriboSettings, Secret};
use memberbridge_core::Person;

use crate::error::{CallError, ConscriboError, ConscriboResult};
use crate::wire::{self, Keyed};

/// Value of the `X-Conscribo-API-Version` header.
pub const API_VERSION: &str = "0.20161212";

/// Entity type of membership records.
pub const MEMBER_ENTITY: &str = "lid";

/// Fields requested for every membership record.
pub const PERSON_FIELDS: [&str; 5] = ["voornaam", "achternaam", "email", "code", "membership_ended"];

const AUTH_COMMAND: &str = "authenticateWithUserAndPass";
const LIST_RELATIONS: &str = "listRelations";
const LIST_FIELD_DEFINITIONS: &str = "listFieldDefinitions";

/// An authenticated session; passed back on every data command.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    id: Secret,
}

impl Session {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Secret::new(id),
        }
    }

    pub fn id(&self) -> &str {
        self.id.expose()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}

/// One field of the membership entity, as reported by `listFieldDefinitions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    #[serde(default)]
    pub field_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthResult {
    session_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RelationsResult {
    #[serde(default)]
    relations: Keyed<Person>,
    #[serde(default)]
    result_count: Option<Value>,
}

#[derive(Deserialize)]
struct FieldsResult {
    #[serde(default)]
    fields: Keyed<FieldDefinition>,
}

/// Conscribo API client. Holds credentials; sessions are explicit values.
#[derive(Debug)]
pub struct ConscriboClient {
    agent: ureq::Agent,
    url: String,
    username: String,
    password: Secret,
}

impl ConscriboClient {
    /// Creates a client for the endpoint in `settings`.
    pub fn new(settings: &ConscriboSettings, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            agent,
            url: settings.url.clone(),
            username: settings.username.clone(),
            password: settings.password.clone(),
        }
    }

    /// Log in with username and passphrase.
    ///
    /// # Errors
    ///
    /// [`ConscriboError::Auth`] on rejected credentials, transport failure or
    /// a non-success status. Server notifications are logged and carried in the error.
    pub fn authenticate(&self) -> ConscriboResult<Session> {
        let params = json!({
            "userName": self.username,
            "passPhrase": self.password.expose(),
        });
        let result = self
            .call(AUTH_COMMAND, params, None)
            .map_err(ConscriboError::Auth)?;
        let auth: AuthResult = wire::decode(result).map_err(ConscriboError::Auth)?;
        info!(user = %self.username, "authenticated with conscribo");
        Ok(Session::new(auth.session_id))
    }

    /// Fetch every membership record with the fields in [`PERSON_FIELDS`].
    ///
    /// # Errors
    ///
    /// [`ConscriboError::Fetch`] when the roster could not be obtained. An
    /// empty `Vec` always means the server reported zero members.
    pub fn list_people(&self, session: &Session) -> ConscriboResult<Vec<Person>> {
        let params = json!({
            "entityType": MEMBER_ENTITY,
            "requestedFields": { "fieldName": PERSON_FIELDS },
        });
        let fetch_err = |source: CallError| ConscriboError::Fetch {
            command: LIST_RELATIONS,
            source,
        };
        let result = self
            .call(LIST_RELATIONS, params, Some(session))
            .map_err(fetch_err)?;
        let relations: RelationsResult = wire::decode(result).map_err(fetch_err)?;

        let people = relations.relations.into_values();
        debug!(
            result_count = ?relations.result_count,
            received = people.len(),
            "listed relations"
        );
        Ok(people)
    }

    /// Fetch the field definitions of the membership entity.
    ///
    /// # Errors
    ///
    /// [`ConscriboError::Fetch`] on any failure.
    pub fn list_field_definitions(&self, session: &Session) -> ConscriboResult<Vec<FieldDefinition>> {
        let fetch_err = |source: CallError| ConscriboError::Fetch {
            command: LIST_FIELD_DEFINITIONS,
            source,
        };
        let result = self
            .call(
                LIST_FIELD_DEFINITIONS,
                json!({ "entityType": MEMBER_ENTITY }),
                Some(session),
            )
            .map_err(fetch_err)?;
        let fields: FieldsResult = wire::decode(result).map_err(fetch_err)?;
        Ok(fields.fields.into_values())
    }

    fn call(
        &self,
        command: &'static str,
        params: Value,
        session: Option<&Session>,
    ) -> Result<Value, CallError> {
        debug!(command, "conscribo request");
        let mut request = self
            .agent
            .post(&self.url)
            .set("X-Conscribo-API-Version", API_VERSION);
        if let Some(session) = session {
            request = request.set("X-Conscribo-SessionId", session.id());
        }

        let response = request.send_json(wire::envelope(command, params))?;
        let body: Value = serde_json::from_reader(response.into_reader())?;

        wire::unwrap_result(body).map_err(|err| {
            if let CallError::Rejected { notifications } = &err {
                for notification in notifications {
                    error!(command, %notification, "conscribo notification");
                }
            }
            err
        })
    }
}
