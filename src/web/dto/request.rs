//! Request DTOs for the web API.

use serde::Deserialize;
use validator::Validate;

use super::validation::{no_control_chars, not_empty_trimmed};

/// Sign-up request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    /// Full name.
    #[validate(
        length(max = 50, message = "Must be at most 50 characters"),
        custom(function = "not_empty_trimmed"),
        custom(function = "no_control_chars")
    )]
    pub full_name: String,
    /// Email address.
    #[validate(custom(function = "not_empty_trimmed"))]
    pub email: String,
}

/// Sign-in request.
#[derive(Debug, Deserialize, Validate)]
pub struct SignInRequest {
    /// Email address.
    #[validate(custom(function = "not_empty_trimmed"))]
    pub email: String,
}

/// Passcode verification request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    /// Account ID returned by sign-up or sign-in.
    #[validate(custom(function = "not_empty_trimmed"))]
    pub account_id: String,
    /// Emailed passcode.
    #[validate(length(equal = 6, message = "Must be 6 digits"))]
    pub password: String,
}

/// Query parameters for listing files.
#[derive(Debug, Default, Deserialize)]
pub struct ListFilesQuery {
    /// Comma-separated file types, e.g. `image,video`.
    #[serde(default)]
    pub types: String,
    /// Name substring.
    #[serde(default)]
    pub search: String,
    /// `field-direction`, e.g. `size-asc`.
    #[serde(default)]
    pub sort: String,
    /// Maximum number of results.
    pub limit: Option<u32>,
}

fn root_path() -> String {
    "/".to_string()
}

/// Rename request.
#[derive(Debug, Deserialize, Validate)]
pub struct RenameFileRequest {
    /// New base name.
    #[validate(custom(function = "not_empty_trimmed"))]
    pub name: String,
    /// Extension appended to the base name.
    #[serde(default)]
    pub extension: String,
    /// Page path to revalidate.
    #[serde(default = "root_path")]
    pub path: String,
}

/// Share request.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateFileUsersRequest {
    /// Emails that may see the file; replaces the current list.
    #[serde(default)]
    pub emails: Vec<String>,
    /// Page path to revalidate.
    #[serde(default = "root_path")]
    pub path: String,
}

/// Query parameters for deleting a file.
///
/// The blob to delete is read from the stored file, never from the request.
#[derive(Debug, Deserialize)]
pub struct DeleteFileQuery {
    /// Page path to revalidate.
    #[serde(default = "root_path")]
    pub path: String,
}
