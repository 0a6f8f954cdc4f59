//! Middleware and extractors for the web API.

pub mod cors;
pub mod session;

pub use cors::create_cors_layer;
pub use session::{clear_session_cookie, session_cookie, CurrentUser};
