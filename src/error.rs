//! Error types for Cloudstash.

use thiserror::Error;

use crate::backend::BackendError;

/// Broad category of a failure, used by callers to decide how to render it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected input; nothing was sent to the backend.
    Validation,
    /// The backend platform failed (network, auth, quota, ...).
    External,
    /// An application invariant did not hold (no current user, no OTP, ...).
    Invariant,
}

/// Common error type for Cloudstash actions.
#[derive(Error, Debug)]
pub enum VaultError {
    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// A call to the backend platform failed.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// The request carries no valid session or the session has no user document.
    #[error("no user found")]
    NoCurrentUser,

    /// Sign-in was requested for an email without a user document.
    #[error("user not found: {0}")]
    UserNotFound(String),

    /// The file does not exist or is not visible to the acting user.
    #[error("file not found: {0}")]
    FileNotFound(String),

    /// The acting user can see the file but does not own it.
    #[error("file {0} is not owned by the current user")]
    NotFileOwner(String),

    /// The platform did not return an account id for the email token.
    #[error("failed to send OTP to {0}")]
    OtpIssuance(String),

    /// Metadata creation failed and the uploaded blob could not be removed either.
    #[error("upload failed: {source}; removing blob also failed: {cleanup}")]
    UploadRollback {
        /// The metadata-creation failure.
        source: BackendError,
        /// The compensating blob-delete failure.
        cleanup: BackendError,
    },

    /// The metadata document was deleted but its blob was not.
    #[error("file document deleted but blob {blob_id} remains: {source}")]
    OrphanedBlob {
        /// Identifier of the blob left behind.
        blob_id: String,
        /// The blob-delete failure.
        source: BackendError,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl VaultError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            VaultError::Validation(_) | VaultError::Config(_) => ErrorKind::Validation,
            VaultError::Backend(_)
            | VaultError::UploadRollback { .. }
            | VaultError::OrphanedBlob { .. }
            | VaultError::Io(_) => ErrorKind::External,
            VaultError::NoCurrentUser
            | VaultError::UserNotFound(_)
            | VaultError::FileNotFound(_)
            | VaultError::NotFileOwner(_)
            | VaultError::OtpIssuance(_) => ErrorKind::Invariant,
        }
    }
}

/// Log a failed backend call for `action` and convert the error.
pub(crate) fn log_backend(action: &'static str) -> impl FnOnce(BackendError) -> VaultError {
    move |e| {
        tracing::error!(error = %e, "{action}");
        VaultError::Backend(e)
    }
}

/// Result type alias for Cloudstash operations.
pub type Result<T> = std::result::Result<T, VaultError>;
