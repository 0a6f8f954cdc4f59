//! Session cookie handling.

use std::sync::Arc;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::config::SessionConfig;
use crate::user::{SessionVerifier, UserRecord};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// Extractor for the signed-in user.
///
/// Reads the session secret from the session cookie and resolves it to a
/// user document. Rejects with 401 when either step fails.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// The user document.
    pub user: UserRecord,
    /// The session secret from the cookie.
    pub secret: String,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let secret = jar
            .get(&state.session.cookie_name)
            .map(|c| c.value().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ApiError::unauthorized("no user found"))?;

        let user = SessionVerifier::new(&state.gateway)
            .get_current_user(&secret)
            .await?;

        Ok(CurrentUser { user, secret })
    }
}

/// The session cookie carrying `secret`.
pub fn session_cookie(config: &SessionConfig, secret: impl Into<String>) -> Cookie<'static> {
    let secret: String = secret.into();
    Cookie::build((config.cookie_name.clone(), secret))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(config.secure)
        .build()
}

/// Remove the session cookie from `jar`.
pub fn clear_session_cookie(jar: CookieJar, config: &SessionConfig) -> CookieJar {
    jar.remove(Cookie::build(config.cookie_name.clone()).path("/"))
}
