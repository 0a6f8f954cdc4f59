//! Router configuration for the web API.

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post, put},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{
    delete_file, list_files, me, rename_file, sign_in, sign_out, sign_up, update_file_users,
    upload_file, verify, AppState,
};
use super::middleware::create_cors_layer;

/// Slack on top of the upload limit for multipart framing.
const MULTIPART_OVERHEAD: u64 = 64 * 1024;

/// Create the main API router.
pub fn create_router(app_state: Arc<AppState>, cors_origins: &[String]) -> Router {
    let body_limit = usize::try_from(app_state.max_upload_size.saturating_add(MULTIPART_OVERHEAD))
        .unwrap_or(usize::MAX);

    let auth_routes = Router::new()
        .route("/sign-up", post(sign_up))
        .route("/sign-in", post(sign_in))
        .route("/verify", post(verify))
        .route("/sign-out", post(sign_out))
        .route("/me", get(me));

    let file_routes = Router::new()
        .route("/", get(list_files).post(upload_file))
        .route("/:id", delete(delete_file))
        .route("/:id/name", patch(rename_file))
        .route("/:id/users", put(update_file_users));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/files", file_routes);

    Router::new()
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}
