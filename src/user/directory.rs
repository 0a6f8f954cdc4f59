//! User directory: user documents and passcode issuance.

use tracing::{debug, info};

use crate::backend::{to_data, unique_id, Gateway, Query};
use crate::error::log_backend;
use crate::{Result, VaultError};

use super::validation::{normalize_email, validate_email, validate_full_name};
use super::{NewUserRecord, UserRecord};

/// Avatar assigned to every new user.
pub const DEFAULT_AVATAR_URL: &str =
    "https://img.freepik.com/psd-gratis/ilustracion-3d-avatar-o-perfil-humano_23-2150671142.jpg";

/// Looks up and creates user documents.
pub struct UserDirectory<'a> {
    gateway: &'a Gateway,
}

impl<'a> UserDirectory<'a> {
    /// Create a directory over the given gateway.
    pub fn new(gateway: &'a Gateway) -> Self {
        Self { gateway }
    }

    async fn find_one(&self, attribute: &str, value: &str) -> Result<Option<UserRecord>> {
        let list = self
            .gateway
            .documents()
            .list_documents(
                &self.gateway.collections().users,
                &[Query::equal(attribute, value)],
            )
            .await
            .map_err(log_backend("Failed to look up user"))?;

        match list.documents.into_iter().next() {
            Some(doc) => Ok(Some(doc.decode()?)),
            None => Ok(None),
        }
    }

    /// First user document with this email, if any.
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        self.find_one("email", &normalize_email(email)).await
    }

    /// User document bound to a platform account, if any.
    pub async fn get_user_by_account(&self, account_id: &str) -> Result<Option<UserRecord>> {
        self.find_one("accountId", account_id).await
    }

    /// Send a one-time passcode to `email` and return the account ID it belongs to.
    pub async fn send_email_otp(&self, email: &str) -> Result<String> {
        let token = self
            .gateway
            .accounts()
            .create_email_token(&unique_id(), email)
            .await
            .map_err(log_backend("Failed to send email OTP"))?;

        if token.user_id.is_empty() {
            tracing::error!(email, "Email token carried no account ID");
            return Err(VaultError::OtpIssuance(email.to_string()));
        }
        debug!(email, account_id = %token.user_id, "Sent email OTP");
        Ok(token.user_id)
    }

    /// Sign up: issue a passcode and make sure a user document exists.
    ///
    /// A passcode is sent on every call. The user document is created only
    /// for an email that has none yet.
    pub async fn create_account(&self, full_name: &str, email: &str) -> Result<String> {
        let email = normalize_email(email);
        validate_email(&email)?;
        validate_full_name(full_name)?;

        let existing = self.get_user_by_email(&email).await?;
        let account_id = self.send_email_otp(&email).await?;

        if existing.is_none() {
            let new_user = NewUserRecord {
                full_name: full_name.trim().to_string(),
                email: email.clone(),
                avatar: DEFAULT_AVATAR_URL.to_string(),
                account_id: account_id.clone(),
            };
            self.gateway
                .documents()
                .create_document(
                    &self.gateway.collections().users,
                    &unique_id(),
                    to_data(&new_user)?,
                )
                .await
                .map_err(log_backend("Failed to create user document"))?;
            info!(email = %email, account_id = %account_id, "Created user");
        }

        Ok(account_id)
    }

    /// Sign in: issue a passcode for an existing user.
    pub async fn sign_in(&self, email: &str) -> Result<String> {
        let email = normalize_email(email);
        validate_email(&email)?;

        match self.get_user_by_email(&email).await? {
            Some(_) => self.send_email_otp(&email).await,
            None => {
                debug!(email = %email, "Sign-in for unknown email");
                Err(VaultError::UserNotFound(email))
            }
        }
    }
}
