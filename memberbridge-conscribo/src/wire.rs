//! Request envelope and response unwrapping for the Conscribo JSON API.
//!
//! Every call is `{"request": {"command": ..., ...params}}`; every answer is
//! `{"result": {"success": ..., "notifications": ..., ...payload}}`.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::error::CallError;

/// Build the request body for `command` with `params` merged next to it.
pub(crate) fn envelope(command: &str, params: Value) -> Value {
    let mut request = Map::new();
    request.insert("command".to_owned(), Value::String(command.to_owned()));
    if let Value::Object(params) = params {
        request.extend(params);
    }
    json!({ "request": request })
}

/// Extract `result` from a response, turning a failure flag into [`CallError::Rejected`].
pub(crate) fn unwrap_result(body: Value) -> Result<Value, CallError> {
    let Value::Object(mut top) = body else {
        return Err(CallError::Body("top level is not an object".into()));
    };
    let Some(result) = top.remove("result") else {
        return Err(CallError::Body("missing 'result'".into()));
    };

    if !is_success(result.get("success")) {
        return Err(CallError::Rejected {
            notifications: notifications(result.get("notifications")),
        });
    }
    Ok(result)
}

/// Decode the `result` payload into `T`.
pub(crate) fn decode<T: DeserializeOwned>(result: Value) -> Result<T, CallError> {
    serde_json::from_value(result).map_err(CallError::from)
}

// `success` has been seen as `true`, `1` and `"1"`.
fn is_success(flag: Option<&Value>) -> bool {
    match flag {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_i64() == Some(1),
        Some(Value::String(s)) => s == "1" || s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

// Either a plain list or `{"notification": [...]}`.
fn notifications(raw: Option<&Value>) -> Vec<String> {
    let list = match raw {
        Some(Value::Array(items)) => items.as_slice(),
        Some(Value::Object(map)) => match map.get("notification") {
            Some(Value::Array(items)) => items.as_slice(),
            Some(single) => std::slice::from_ref(single),
            None => &[],
        },
        Some(Value::String(s)) => return vec![s.clone()],
        _ => &[],
    };
    list.iter()
        .map(|n| match n {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect()
}

/// A keyed collection that PHP encodes as `[]` when empty.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Keyed<T> {
    Map(BTreeMap<String, T>),
    List(Vec<T>),
}

impl<T> Default for Keyed<T> {
    fn default() -> Self {
        Keyed::List(Vec::new())
    }
}

impl<T> Keyed<T> {
    /// Values ordered by key, numeric keys ascending first.
    pub(crate) fn into_values(self) -> Vec<T> {
        match self {
            Keyed::List(items) => items,
            Keyed::Map(map) => {
                let mut entries: Vec<(String, T)> = map.into_iter().collect();
                entries.sort_by(|(a, _), (b, _)| {
                    match (a.parse::<u64>(), b.parse::<u64>()) {
                        (Ok(x), Ok(y)) => x.cmp(&y),
                        (Ok(_), Err(_)) => std::cmp::Ordering::Less,
                        (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
                        (Err(_), Err(_)) => a.cmp(b),
                    }
                });
                entries.into_iter().map(|(_, v)| v).collect()
            }
        }
    }
}
