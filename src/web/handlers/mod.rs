//! API handlers.

pub mod auth;
pub mod file;

pub use auth::*;
pub use file::*;

use axum::{
    http::HeaderValue,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::backend::Gateway;
use crate::config::{Config, SessionConfig};
use crate::file::DEFAULT_MAX_FILE_SIZE;
use crate::revalidate::RevalidationLog;
use crate::web::dto::ApiResponse;
use crate::web::REVALIDATE_PATH_HEADER;

/// Application state shared by all handlers.
pub struct AppState {
    /// Backend services.
    pub gateway: Gateway,
    /// Session cookie settings.
    pub session: SessionConfig,
    /// Maximum upload size in bytes.
    pub max_upload_size: u64,
}

impl AppState {
    /// Create a new application state.
    pub fn new(gateway: Gateway) -> Self {
        Self {
            gateway,
            session: SessionConfig::default(),
            max_upload_size: DEFAULT_MAX_FILE_SIZE,
        }
    }

    /// Create the state described by `config`.
    pub fn from_config(gateway: Gateway, config: &Config) -> Self {
        Self::new(gateway)
            .with_session_config(config.session.clone())
            .with_max_upload_size(config.files.max_upload_bytes())
    }

    /// Set session cookie settings.
    pub fn with_session_config(mut self, session: SessionConfig) -> Self {
        self.session = session;
        self
    }

    /// Set the maximum upload size in bytes.
    pub fn with_max_upload_size(mut self, max_upload_size: u64) -> Self {
        self.max_upload_size = max_upload_size;
        self
    }
}

/// Wrap `data` in a JSON response carrying the latest revalidation path.
pub(crate) fn revalidated<T: Serialize>(log: &RevalidationLog, data: T) -> Response {
    let mut response = Json(ApiResponse::new(data)).into_response();
    if let Some(value) = log.last().and_then(|p| HeaderValue::from_str(&p).ok()) {
        response
            .headers_mut()
            .insert(REVALIDATE_PATH_HEADER, value);
    }
    response
}
