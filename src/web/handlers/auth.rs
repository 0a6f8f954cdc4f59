//! Authentication handlers: email passcode sign-up and sign-in.

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

use crate::user::{SessionVerifier, UserDirectory, UserRecord};
use crate::web::dto::{
    AccountIdResponse, ApiResponse, SessionResponse, SignInRequest, SignUpRequest, ValidatedJson,
    VerifyRequest,
};
use crate::web::error::ApiError;
use crate::web::middleware::{clear_session_cookie, session_cookie, CurrentUser};

use super::AppState;

/// Shown by the sign-up and sign-in form for any non-validation failure.
const AUTH_FORM_FAILED: &str = "Failed to create account. Please try again.";
const VERIFY_FAILED: &str = "Failed to verify OTP. Please try again.";

/// POST /api/auth/sign-up - Create an account and send a passcode.
pub async fn sign_up(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<SignUpRequest>,
) -> Result<Json<ApiResponse<AccountIdResponse>>, ApiError> {
    let account_id = UserDirectory::new(&state.gateway)
        .create_account(&req.full_name, &req.email)
        .await
        .map_err(|e| ApiError::for_form(e, AUTH_FORM_FAILED))?;

    Ok(Json(ApiResponse::new(AccountIdResponse { account_id })))
}

/// POST /api/auth/sign-in - Send a passcode to an existing user.
///
/// An unknown email fails exactly like any other sign-in error.
pub async fn sign_in(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<SignInRequest>,
) -> Result<Json<ApiResponse<AccountIdResponse>>, ApiError> {
    let account_id = UserDirectory::new(&state.gateway)
        .sign_in(&req.email)
        .await
        .map_err(|e| ApiError::for_form(e, AUTH_FORM_FAILED))?;

    Ok(Json(ApiResponse::new(AccountIdResponse { account_id })))
}

/// POST /api/auth/verify - Exchange a passcode for a session cookie.
pub async fn verify(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<VerifyRequest>,
) -> Result<(CookieJar, Json<ApiResponse<SessionResponse>>), ApiError> {
    let session = SessionVerifier::new(&state.gateway)
        .verify_secret(req.account_id.trim(), req.password.trim())
        .await
        .map_err(|e| ApiError::for_form(e, VERIFY_FAILED))?;

    let jar = jar.add(session_cookie(&state.session, session.secret));
    Ok((
        jar,
        Json(ApiResponse::new(SessionResponse {
            session_id: session.id,
        })),
    ))
}

/// GET /api/auth/me - The signed-in user.
pub async fn me(CurrentUser { user, .. }: CurrentUser) -> Json<ApiResponse<UserRecord>> {
    Json(ApiResponse::new(user))
}

/// POST /api/auth/sign-out - End the session and clear the cookie.
pub async fn sign_out(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    current: CurrentUser,
) -> Result<(CookieJar, StatusCode), ApiError> {
    SessionVerifier::new(&state.gateway)
        .sign_out(&current.secret)
        .await?;

    tracing::info!(user_id = %current.user.id, "User signed out");
    Ok((clear_session_cookie(jar, &state.session), StatusCode::NO_CONTENT))
}
