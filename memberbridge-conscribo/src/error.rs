//! Error types for memberbridge-conscribo.

use thiserror::Error;

/// Result type alias using [`ConscriboError`].
pub type ConscriboResult<T> = Result<T, ConscriboError>;

/// Failure of a single request/response exchange with the membership API.
#[derive(Debug, Error)]
pub enum CallError {
    /// Connection, DNS, TLS or timeout failure.
    #[error("transport error: {0}")]
    Transport(#[source] Box<ureq::Transport>),

    /// The API answered with a non-success HTTP status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The API answered but set its failure flag.
    #[error("request rejected: {}", .notifications.join("; "))]
    Rejected { notifications: Vec<String> },

    /// The response body is not the expected JSON shape.
    #[error("unexpected response body: {0}")]
    Body(String),

    /// JSON decoding error while reading the response.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ureq::Error> for CallError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(status, response) => CallError::Status {
                status,
                body: response.into_string().unwrap_or_default(),
            },
            ureq::Error::Transport(transport) => CallError::Transport(Box::new(transport)),
        }
    }
}

/// All errors surfaced by the membership client.
#[derive(Debug, Error)]
pub enum ConscriboError {
    /// No session could be obtained; nothing else in the pass can run.
    #[error("authentication failed: {0}")]
    Auth(#[source] CallError),

    /// A data command failed; its result is unusable for this pass.
    #[error("{command} failed: {source}")]
    Fetch {
        command: &'static str,
        #[source]
        source: CallError,
    },
}

impl ConscriboError {
    /// Notifications returned by the server, when the failure was an explicit rejection.
    pub fn notifications(&self) -> &[String] {
        let source = match self {
            ConscriboError::Auth(source) => source,
            ConscriboError::Fetch { source, .. } => source,
        };
        match source {
            CallError::Rejected { notifications } => notifications,
            _ => &[],
        }
    }
}
