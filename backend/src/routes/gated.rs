use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Gated Router Module
///
/// The routes the access gate is layered onto: the auth pages (`/login`, `/register`) and
/// everything under `/dashboard`. The layer itself is attached in `create_router` with
/// `route_layer`, so it runs only when one of these routes matched.
///
/// Access Control Strategy:
/// The gate only checks for the presence of the session cookie. Dashboard handlers additionally
/// take the `SessionUser` extractor, which verifies the session before any data is returned.
pub fn gated_routes() -> Router<AppState> {
    Router::new()
        // GET/POST /login
        // Sign-in page and credential submission. Signed-in visitors are sent to /dashboard.
        .route("/login", get(handlers::login_page).post(handlers::login))
        // GET/POST /register
        // Registration page and account creation. Signed-in visitors are sent to /dashboard.
        .route(
            "/register",
            get(handlers::register_page).post(handlers::register),
        )
        // GET /dashboard
        // Overview statistics. Anonymous visitors are sent to /login.
        .route("/dashboard", get(handlers::get_dashboard))
        // The catch-all below needs a non-empty segment, so the trailing-slash form is explicit.
        .route("/dashboard/", get(handlers::get_dashboard))
        // GET /dashboard/profile
        .route("/dashboard/profile", get(handlers::get_profile))
        // GET /dashboard/{*section}
        // Catch-all so unknown dashboard paths are gated too.
        .route("/dashboard/{*section}", get(handlers::dashboard_not_found))
}
