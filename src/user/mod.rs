//! User directory and session handling.
//!
//! Accounts and sessions belong to the backend platform's account service;
//! this module keeps a user document per email alongside them and drives
//! the email-passcode sign-in flow.

mod directory;
mod session;
pub mod validation;

use serde::{Deserialize, Serialize};

pub use directory::{UserDirectory, DEFAULT_AVATAR_URL};
pub use session::SessionVerifier;
pub use validation::ValidationError;

/// A user document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Document ID.
    #[serde(rename = "$id")]
    pub id: String,
    /// Full name given at sign-up.
    #[serde(rename = "fullName")]
    pub full_name: String,
    /// Email address.
    pub email: String,
    /// Avatar image URL.
    pub avatar: String,
    /// Account ID in the platform's account service.
    #[serde(rename = "accountId")]
    pub account_id: String,
}

/// Attributes of a user document to be created.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewUserRecord {
    #[serde(rename = "fullName")]
    pub full_name: String,
    pub email: String,
    pub avatar: String,
    #[serde(rename = "accountId")]
    pub account_id: String,
}
