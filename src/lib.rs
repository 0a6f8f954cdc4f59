//! Cloudstash - personal cloud storage on a backend-as-a-service platform.
//!
//! Users sign in with an emailed one-time passcode, then upload, list,
//! rename, share and delete files. Content and metadata live in the
//! platform; this crate validates input and sequences the platform calls.

pub mod backend;
pub mod config;
pub mod error;
pub mod file;
pub mod logging;
pub mod revalidate;
pub mod user;
pub mod web;

pub use backend::{BackendError, Gateway};
pub use config::Config;
pub use error::{ErrorKind, Result, VaultError};
pub use file::{
    DeleteStatus, FileList, FileQuery, FileRecord, FileService, FileType, UploadRequest,
};
pub use revalidate::{RevalidationLog, Revalidator};
pub use user::{SessionVerifier, UserDirectory, UserRecord};
