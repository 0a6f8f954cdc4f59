//! Errors returned by backend platform calls.

use thiserror::Error;

/// Errors that can occur while talking to the backend platform.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    /// The platform answered with a non-success status.
    #[error("backend returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Error message reported by the platform.
        message: String,
        /// Platform error type (e.g. `document_not_found`), if any.
        kind: Option<String>,
    },

    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// The addressed resource does not exist.
    #[error("{0} not found")]
    NotFound(String),
}

impl BackendError {
    /// Whether this error means the addressed resource is missing.
    pub fn is_not_found(&self) -> bool {
        match self {
            BackendError::NotFound(_) => true,
            BackendError::Status { status, .. } => *status == 404,
            _ => false,
        }
    }

    /// Whether the platform rejected the caller's credentials.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, BackendError::Status { status: 401, .. })
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            BackendError::Decode(e.to_string())
        } else {
            BackendError::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(e: serde_json::Error) -> Self {
        BackendError::Decode(e.to_string())
    }
}
