//! Web API module for Cloudstash.
//!
//! Exposes the account and file actions as a JSON/multipart API under
//! `/api`. The session secret travels in an HTTP-only cookie.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use router::{create_health_router, create_router};
pub use server::WebServer;

/// Response header naming the page path whose data changed.
pub const REVALIDATE_PATH_HEADER: &str = "x-revalidate-path";
