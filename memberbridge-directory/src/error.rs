//! Error types for memberbridge-directory.

use serde::Deserialize;
use thiserror::Error;

/// Result type alias using [`DirectoryError`].
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Errors from a single directory API call.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The API answered with a non-success status.
    #[error("directory API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Connection, DNS, TLS or timeout failure.
    #[error("transport error: {0}")]
    Transport(#[source] Box<ureq::Transport>),

    /// JSON decoding error while reading a response.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DirectoryError {
    /// `true` when the account already exists (e.g. two members deriving the same address).
    pub fn is_conflict(&self) -> bool {
        matches!(self, DirectoryError::Api { status: 409, .. })
    }
}

/// Google API error envelope: `{"error": {"code": 409, "message": "..."}}`.
#[derive(Debug, Deserialize)]
struct GoogleError {
    error: GoogleErrorBody,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    #[serde(default)]
    message: String,
}

impl From<ureq::Error> for DirectoryError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(status, response) => {
                let body = response.into_string().unwrap_or_default();
                let message = match serde_json::from_str::<GoogleError>(&body) {
                    Ok(parsed) if !parsed.error.message.is_empty() => parsed.error.message,
                    _ => body,
                };
                DirectoryError::Api { status, message }
            }
            ureq::Error::Transport(transport) => DirectoryError::Transport(Box::new(transport)),
        }
    }
}
