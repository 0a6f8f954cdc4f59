//! Response DTOs for the web API.

use serde::Serialize;

use crate::file::DeleteStatus;

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Account a passcode was sent for.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountIdResponse {
    pub account_id: String,
}

/// Session created by passcode verification.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub session_id: String,
}

/// Outcome of a delete.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub status: DeleteStatus,
}
