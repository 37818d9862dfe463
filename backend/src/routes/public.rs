use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints that the access gate never sees. Reachable with or without a session cookie.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness check for monitoring and load balancer checks.
        .route("/health", get(|| async { "ok" }))
        // POST /logout
        // Ends the session and clears the cookie. Harmless without one.
        .route("/logout", post(handlers::logout))
}
