//! Property store: credentials and tuning read once at process start.
//!
//! # Storage layout
//!
//! ```text
//! ~/.memberbridge/
//!   properties.yaml   (optional; flat `conscribo.url: ...` keys or nested maps)
//! ```
//!
//! Every key has an environment variable that overrides the file value.
//!
//! # API pattern
//!
//! - `load_at(home, explicit, env)`: explicit home and environment lookup; used in tests
//! - `load(explicit)`: derives home from `dirs::home_dir()` and reads the process environment
//!
//! Tests must NEVER call the no-arg wrapper; always use `_at`.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_yaml::Value;

use crate::address::DEFAULT_DOMAIN;
use crate::error::PropertyError;

pub const CONSCRIBO_URL: Key = Key::new("conscribo.url", "CONSCRIBO_URL");
pub const CONSCRIBO_USERNAME: Key = Key::new("conscribo.username", "CONSCRIBO_USERNAME");
pub const CONSCRIBO_PASSWORD: Key = Key::new("conscribo.password", "CONSCRIBO_PASSWORD");
pub const DIRECTORY_ACCESS_TOKEN: Key = Key::new("directory.access_token", "GOOGLE_ACCESS_TOKEN");
pub const DIRECTORY_BASE_URL: Key = Key::new("directory.base_url", "DIRECTORY_BASE_URL");
pub const DIRECTORY_DOMAIN: Key = Key::new("directory.domain", "DIRECTORY_DOMAIN");
pub const DIRECTORY_ORG_UNIT: Key = Key::new("directory.org_unit", "DIRECTORY_ORG_UNIT");
pub const DIRECTORY_PAGE_SIZE: Key = Key::new("directory.page_size", "DIRECTORY_PAGE_SIZE");
pub const SYNC_COMPARE_NAMES: Key = Key::new("sync.compare_names", "SYNC_COMPARE_NAMES");
pub const HTTP_TIMEOUT_SECS: Key = Key::new("http.timeout_secs", "HTTP_TIMEOUT_SECS");

pub const DEFAULT_DIRECTORY_BASE_URL: &str = "https://admin.googleapis.com/admin/directory/v1";
pub const DEFAULT_ORG_UNIT: &str = "/Member";
pub const DEFAULT_PAGE_SIZE: u32 = 100;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// A property name together with the environment variable that overrides it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Key {
    pub name: &'static str,
    pub env: &'static str,
}

impl Key {
    const fn new(name: &'static str, env: &'static str) -> Self {
        Self { name, env }
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// A configuration value that must never appear in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConscriboSettings {
    pub url: String,
    pub username: String,
    pub password: Secret,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectorySettings {
    pub access_token: Secret,
    pub base_url: String,
    pub domain: String,
    pub org_unit: String,
    pub page_size: u32,
}

/// Fully resolved configuration for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub conscribo: ConscriboSettings,
    pub directory: DirectorySettings,
    pub compare_names: bool,
    pub timeout: Duration,
}

// ---------------------------------------------------------------------------
// 1. Path helpers
// ---------------------------------------------------------------------------

/// `<home>/.memberbridge/properties.yaml`. Pure, no I/O.
pub fn properties_path_at(home: &Path) -> PathBuf {
    home.join(".memberbridge").join("properties.yaml")
}

// ---------------------------------------------------------------------------
// 2. Load
// ---------------------------------------------------------------------------

/// Read a properties file into a flat `dotted.key -> value` map.
///
/// Nested mappings are flattened (`conscribo: {url: x}` becomes `conscribo.url`).
/// Returns `PropertyError::Parse` (with path + line context) if malformed YAML.
pub fn read_file(path: &Path) -> Result<BTreeMap<String, String>, PropertyError> {
    let contents = std::fs::read_to_string(path).map_err(|source| PropertyError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_yaml::from_str(&contents).map_err(|source| PropertyError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let mut out = BTreeMap::new();
    match value {
        Value::Null => {}
        Value::Mapping(_) => flatten("", &value, &mut out),
        _ => {
            return Err(PropertyError::Invalid {
                key: "<root>",
                reason: format!("{} must contain a mapping", path.display()),
            })
        }
    }
    Ok(out)
}

fn flatten(prefix: &str, value: &Value, out: &mut BTreeMap<String, String>) {
    match value {
        Value::Mapping(map) => {
            for (k, v) in map {
                let Some(k) = scalar(k) else { continue };
                let key = if prefix.is_empty() {
                    k
                } else {
                    format!("{prefix}.{k}")
                };
                flatten(&key, v, out);
            }
        }
        other => {
            if let Some(s) = scalar(other) {
                out.insert(prefix.to_owned(), s);
            }
        }
    }
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Resolve [`Settings`] from an optional properties file plus an environment lookup.
///
/// `explicit` must exist when given; the default `<home>/.memberbridge/properties.yaml`
/// is optional. Environment values win over file values.
pub fn load_at<E>(home: &Path, explicit: Option<&Path>, env: E) -> Result<Settings, PropertyError>
where
    E: Fn(&str) -> Option<String>,
{
    let file = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(PropertyError::NotFound {
                    path: path.to_path_buf(),
                });
            }
            read_file(path)?
        }
        None => {
            let path = properties_path_at(home);
            if path.exists() {
                read_file(&path)?
            } else {
                BTreeMap::new()
            }
        }
    };
    resolve(&file, env)
}

/// `load_at` convenience wrapper.
pub fn load(explicit: Option<&Path>) -> Result<Settings, PropertyError> {
    let env = |name: &str| std::env::var(name).ok();
    match (explicit, dirs::home_dir()) {
        (_, Some(home)) => load_at(&home, explicit, env),
        (Some(path), None) => load_at(Path::new(""), Some(path), env),
        (None, None) => Err(PropertyError::HomeNotFound),
    }
}

fn resolve<E>(file: &BTreeMap<String, String>, env: E) -> Result<Settings, PropertyError>
where
    E: Fn(&str) -> Option<String>,
{
    let lookup = |key: Key| -> Option<String> {
        env(key.env)
            .or_else(|| file.get(key.name).cloned())
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty())
    };
    let required = |key: Key| {
        lookup(key).ok_or(PropertyError::Missing {
            key: key.name,
            env: key.env,
        })
    };

    let page_size = match lookup(DIRECTORY_PAGE_SIZE) {
        Some(raw) => parse_page_size(&raw)?,
        None => DEFAULT_PAGE_SIZE,
    };
    let compare_names = match lookup(SYNC_COMPARE_NAMES) {
        Some(raw) => parse_bool(SYNC_COMPARE_NAMES, &raw)?,
        None => false,
    };
    let timeout_secs = match lookup(HTTP_TIMEOUT_SECS) {
        Some(raw) => raw.parse::<u64>().map_err(|e| PropertyError::Invalid {
            key: HTTP_TIMEOUT_SECS.name,
            reason: e.to_string(),
        })?,
        None => DEFAULT_TIMEOUT_SECS,
    };

    Ok(Settings {
        conscribo: ConscriboSettings {
            url: required(CONSCRIBO_URL)?,
            username: required(CONSCRIBO_USERNAME)?,
            password: Secret::new(required(CONSCRIBO_PASSWORD)?),
        },
        directory: DirectorySettings {
            access_token: Secret::new(required(DIRECTORY_ACCESS_TOKEN)?),
            base_url: lookup(DIRECTORY_BASE_URL)
                .unwrap_or_else(|| DEFAULT_DIRECTORY_BASE_URL.to_owned())
                .trim_end_matches('/')
                .to_owned(),
            domain: lookup(DIRECTORY_DOMAIN).unwrap_or_else(|| DEFAULT_DOMAIN.to_owned()),
            org_unit: lookup(DIRECTORY_ORG_UNIT).unwrap_or_else(|| DEFAULT_ORG_UNIT.to_owned()),
            page_size,
        },
        compare_names,
        timeout: Duration::from_secs(timeout_secs),
    })
}

// The Admin Directory API caps `maxResults` at 500.
fn parse_page_size(raw: &str) -> Result<u32, PropertyError> {
    let invalid = |reason: String| PropertyError::Invalid {
        key: DIRECTORY_PAGE_SIZE.name,
        reason,
    };
    let n = raw.parse::<u32>().map_err(|e| invalid(e.to_string()))?;
    if !(1..=500).contains(&n) {
        return Err(invalid(format!("{n} is outside 1..=500")));
    }
    Ok(n)
}

fn parse_bool(key: Key, raw: &str) -> Result<bool, PropertyError> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(PropertyError::Invalid {
            key: key.name,
            reason: format!("expected true or false, got '{other}'"),
        }),
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn required_env(name: &str) -> Option<String> {
        match name {
            "CONSCRIBO_URL" => Some("https://secure.conscribo.nl/test/request.json".into()),
            "CONSCRIBO_USERNAME" => Some("sync".into()),
            "CONSCRIBO_PASSWORD" => Some("hunter2".into()),
            "GOOGLE_ACCESS_TOKEN" => Some("ya29.token".into()),
            _ => None,
        }
    }

    #[test]
    fn defaults_apply_when_only_required_keys_set() {
        let settings = resolve(&BTreeMap::new(), required_env).expect("resolve");
        assert_eq!(settings.directory.domain, "aegee-delft.nl");
        assert_eq!(settings.directory.org_unit, "/Member");
        assert_eq!(settings.directory.page_size, 100);
        assert_eq!(settings.directory.base_url, DEFAULT_DIRECTORY_BASE_URL);
        assert!(!settings.compare_names);
        assert_eq!(settings.timeout, Duration::from_secs(30));
    }

    #[test]
    fn secrets_are_redacted_in_debug_output() {
        let settings = resolve(&BTreeMap::new(), required_env).expect("resolve");
        let debug = format!("{settings:?}");
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("ya29.token"));
        assert_eq!(settings.conscribo.password.expose(), "hunter2");
    }

    #[test]
    fn page_size_out_of_range_is_invalid() {
        let mut file = BTreeMap::new();
        file.insert("directory.page_size".to_owned(), "1000".to_owned());
        let err = resolve(&file, required_env).unwrap_err();
        assert!(matches!(err, PropertyError::Invalid { key: "directory.page_size", .. }));
    }

    #[test]
    fn bool_parsing_accepts_common_spellings() {
        assert!(parse_bool(SYNC_COMPARE_NAMES, "YES").expect("bool"));
        assert!(!parse_bool(SYNC_COMPARE_NAMES, "0").expect("bool"));
        assert!(parse_bool(SYNC_COMPARE_NAMES, "maybe").is_err());
    }

    #[test]
    fn blank_values_count_as_missing() {
        let env = |name: &str| {
            if name == "CONSCRIBO_USERNAME" {
                Some("   ".into())
            } else {
                required_env(name)
            }
        };
        let err = resolve(&BTreeMap::new(), env).unwrap_err();
        assert!(matches!(err, PropertyError::Missing { key: "conscribo.username", .. }));
    }

    #[test]
    fn scalar_leaves_of_any_type_are_read_as_strings() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("properties.yaml");
        std::fs::write(
            &path,
            "directory:\n  page_size: 250\nsync:\n  compare_names: true\nhttp:\n  timeout_secs: 5\n",
        )
        .expect("write");

        let map = read_file(&path).expect("read");
        assert_eq!(map.get("directory.page_size").map(String::as_str), Some("250"));
        assert_eq!(map.get("sync.compare_names").map(String::as_str), Some("true"));
        assert_eq!(map.get("http.timeout_secs").map(String::as_str), Some("5"));
    }

    #[test]
    fn path_is_under_dot_memberbridge() {
        let path = properties_path_at(Path::new("/home/sync"));
        assert!(path.ends_with(".memberbridge/properties.yaml"));
    }
}
