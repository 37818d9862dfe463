use axum::{
    Router,
    extract::FromRef,
    http::HeaderName,
    middleware,
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Request access control and session handling.
pub mod auth;
pub mod gate;
pub mod password;
pub mod session;

// Data, persistence and configuration.
pub mod config;
pub mod error;
pub mod models;
pub mod repository;

// HTTP surface.
pub mod dashboard;
pub mod handlers;
pub mod pages;
pub mod routes;
use routes::{gated, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use repository::{InMemoryRepository, PostgresRepository, RepositoryState};
pub use session::{SessionService, SessionState, TokenSessionService};

/// ApiDoc
///
/// OpenAPI document for the JSON endpoints, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::register, handlers::login, handlers::logout,
        handlers::get_dashboard, handlers::get_profile
    ),
    components(
        schemas(
            models::RegisterRequest, models::LoginRequest, models::CurrentUser,
            models::ErrorResponse, models::DashboardOverview, models::StatCard,
            models::RecentOrder, models::TopProduct, models::Trend,
        )
    ),
    tags(
        (name = "dashboard-portal", description = "Session-gated dashboard API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, immutable container shared by every request.
#[derive(Clone)]
pub struct AppState {
    /// Session capability: sign-up, sign-in, sign-out and session verification.
    pub sessions: SessionState,
    /// The loaded, immutable environment configuration.
    pub config: AppConfig,
}

impl AppState {
    /// Wires the token session service over the given repository.
    pub fn new(repo: RepositoryState, config: AppConfig) -> Self {
        let sessions: SessionState = Arc::new(TokenSessionService::from_config(repo, &config));
        Self { sessions, config }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for SessionState {
    fn from_ref(app_state: &AppState) -> SessionState {
        app_state.sessions.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the routing structure, attaches the access gate to the gated routes and wraps
/// everything in the observability layers.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        // `route_layer` keeps the gate off unmatched paths: it runs for /login, /register and
        // /dashboard/* only.
        .merge(
            gated::gated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                gate::access_gate,
            )),
        )
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span for `TraceLayer` carrying method, URI and the `x-request-id` set by the layer above, so
/// every log line of one request shares an id.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
