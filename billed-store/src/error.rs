use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a remote store call. Every variant renders a human-readable message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{status} {message}")]
    Http { status: u16, message: String },

    #[error("Bill not found: {id}")]
    NotFound { id: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("No store configured")]
    Unavailable,
}

impl StoreError {
    /// HTTP failure with the canonical reason phrase, e.g. `404 Not Found`.
    pub fn http(status: u16) -> Self {
        let message = StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Unknown Status")
            .to_string();
        Self::Http { status, message }
    }

    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            StoreError::Decode(e.to_string())
        } else {
            StoreError::Transport(e.to_string())
        }
    }
}
