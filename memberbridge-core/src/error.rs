//! Error types for memberbridge-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from loading the property store.
#[derive(Debug, Error)]
pub enum PropertyError {
    /// Underlying I/O failure (permission denied, etc.).
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error on load; includes file path and line context from serde_yaml.
    #[error("failed to parse properties at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// An explicitly requested properties file does not exist.
    #[error("properties file not found at {path}")]
    NotFound { path: PathBuf },

    /// `dirs::home_dir()` returned `None`; cannot locate `~/.memberbridge/`.
    #[error("cannot determine home directory; set $HOME or pass --properties")]
    HomeNotFound,

    /// A required key is absent from both the file and the environment.
    #[error("missing property '{key}' (set it in the properties file or via ${env})")]
    Missing { key: &'static str, env: &'static str },

    /// A key is present but its value cannot be parsed.
    #[error("invalid value for property '{key}': {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Failure to derive a primary address from a person's name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("cannot derive an address from name '{given} {family}'")]
    InvalidName { given: String, family: String },
}
