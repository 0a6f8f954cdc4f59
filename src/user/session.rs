//! Passcode verification and session-bound lookups.

use tracing::{debug, info};

use crate::backend::{Gateway, Session};
use crate::error::log_backend;
use crate::{Result, VaultError};

use super::directory::UserDirectory;
use super::validation::validate_otp;
use super::UserRecord;

/// Exchanges passcodes for sessions and resolves sessions to users.
pub struct SessionVerifier<'a> {
    gateway: &'a Gateway,
}

impl<'a> SessionVerifier<'a> {
    /// Create a verifier over the given gateway.
    pub fn new(gateway: &'a Gateway) -> Self {
        Self { gateway }
    }

    /// Exchange an account ID and emailed passcode for a session.
    ///
    /// The caller stores `session.secret` in the session cookie.
    pub async fn verify_secret(&self, account_id: &str, otp: &str) -> Result<Session> {
        if account_id.trim().is_empty() {
            return Err(VaultError::Validation("account id is required".to_string()));
        }
        validate_otp(otp)?;

        let session = self
            .gateway
            .accounts()
            .create_session(account_id, otp)
            .await
            .map_err(log_backend("Failed to verify OTP"))?;

        info!(account_id, session_id = %session.id, "Session created");
        Ok(session)
    }

    /// The user document behind a session secret.
    ///
    /// Fails with [`VaultError::NoCurrentUser`] when the session is unknown
    /// or its account has no user document.
    pub async fn get_current_user(&self, session_secret: &str) -> Result<UserRecord> {
        let account = match self.gateway.accounts().get_account(session_secret).await {
            Ok(account) => account,
            Err(e) if e.is_unauthorized() || e.is_not_found() => {
                debug!(error = %e, "Session rejected");
                return Err(VaultError::NoCurrentUser);
            }
            Err(e) => return Err(log_backend("Failed to resolve session")(e)),
        };

        UserDirectory::new(self.gateway)
            .get_user_by_account(&account.id)
            .await?
            .ok_or(VaultError::NoCurrentUser)
    }

    /// End the session identified by its secret.
    pub async fn sign_out(&self, session_secret: &str) -> Result<()> {
        self.gateway
            .accounts()
            .delete_session(session_secret)
            .await
            .map_err(log_backend("Failed to sign out"))?;
        debug!("Session deleted");
        Ok(())
    }
}
