use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
    response::Response,
};
use dashboard_portal::{
    AppState, InMemoryRepository, create_router,
    config::AppConfig,
    gate::RouteMatching,
    models::{CurrentUser, DashboardOverview, ErrorResponse},
};
use serde_json::json;
use std::sync::Arc;
use tower::util::ServiceExt;

const COOKIE_NAME: &str = "session_token";

// --- Test Utilities ---

fn test_app_with(config: AppConfig) -> Router {
    create_router(AppState::new(Arc::new(InMemoryRepository::new()), config))
}

fn test_app() -> Router {
    test_app_with(AppConfig::default())
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(token) = cookie {
        builder = builder.header(header::COOKIE, format!("{}={}", COOKIE_NAME, token));
    }
    builder.body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: serde_json::Value, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = cookie {
        builder = builder.header(header::COOKIE, format!("{}={}", COOKIE_NAME, token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
}

/// Value of the session cookie set by the response, if any.
fn session_cookie_value(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|value| {
            value
                .strip_prefix(&format!("{}=", COOKIE_NAME))
                .map(|rest| rest.split(';').next().unwrap_or("").to_string())
        })
}

async fn json_body<T: serde::de::DeserializeOwned>(response: Response) -> T {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn registration(email: &str) -> serde_json::Value {
    json!({
        "name": "Jane Smith",
        "email": email,
        "password": "correct-horse",
        "confirm_password": "correct-horse",
    })
}

async fn register(app: &Router, email: &str) -> String {
    let response = app
        .clone()
        .oneshot(post_json("/register", registration(email), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    session_cookie_value(&response).expect("registration should set the session cookie")
}

// --- Gate Behaviour ---

#[tokio::test]
async fn test_health_is_not_gated() {
    let response = test_app().oneshot(get("/health", Some("x"))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_dashboard_without_cookie_redirects_to_login() {
    let app = test_app();

    for uri in ["/dashboard", "/dashboard/settings", "/dashboard/profile"] {
        let response = app.clone().oneshot(get(uri, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT, "{}", uri);
        assert_eq!(location(&response), "/login");
    }
}

#[tokio::test]
async fn test_auth_pages_with_cookie_redirect_to_dashboard() {
    let app = test_app();

    for uri in ["/login", "/register"] {
        let response = app.clone().oneshot(get(uri, Some("anything"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT, "{}", uri);
        assert_eq!(location(&response), "/dashboard");
    }
}

#[tokio::test]
async fn test_auth_pages_without_cookie_render() {
    let app = test_app();

    for uri in ["/login", "/register"] {
        let response = app.clone().oneshot(get(uri, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{}", uri);
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.starts_with("text/html"));
    }
}

#[tokio::test]
async fn test_dashboard_trailing_slash_is_gated() {
    let app = test_app();

    let response = app.clone().oneshot(get("/dashboard/", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/login");

    let token = register(&app, "jane@example.com").await;
    let response = app.clone().oneshot(get("/dashboard/", Some(&token))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_signed_in_post_to_login_keeps_its_method() {
    let app = test_app();
    let token = register(&app, "jane@example.com").await;
    let credentials = json!({ "email": "jane@example.com", "password": "correct-horse" });

    let response = app
        .clone()
        .oneshot(post_json("/login", credentials.clone(), Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/dashboard");

    // A client following the 307 repeats the POST, which the dashboard does not accept.
    let response = app
        .clone()
        .oneshot(post_json("/dashboard", credentials, Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_empty_cookie_value_still_counts_as_present() {
    let request = Request::builder()
        .uri("/login")
        .header(header::COOKIE, format!("{}=", COOKIE_NAME))
        .body(Body::empty())
        .unwrap();

    let response = test_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/dashboard");
}

#[tokio::test]
async fn test_other_cookie_names_are_ignored() {
    let request = Request::builder()
        .uri("/dashboard")
        .header(header::COOKIE, "theme=dark; session=abc")
        .body(Body::empty())
        .unwrap();

    let response = test_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_custom_cookie_name_is_honoured() {
    let config = AppConfig {
        session_cookie_name: "portal.session".to_string(),
        ..AppConfig::default()
    };
    let request = Request::builder()
        .uri("/login")
        .header(header::COOKIE, "portal.session=abc")
        .body(Body::empty())
        .unwrap();

    let response = test_app_with(config).oneshot(request).await.unwrap();

    assert_eq!(location(&response), "/dashboard");
}

#[tokio::test]
async fn test_segment_matching_config_reaches_the_gate() {
    let config = AppConfig {
        route_matching: RouteMatching::Segment,
        ..AppConfig::default()
    };

    let response = test_app_with(config)
        .oneshot(get("/dashboard/orders", None))
        .await
        .unwrap();

    assert_eq!(location(&response), "/login");
}

// --- Session Flow ---

#[tokio::test]
async fn test_register_unlocks_dashboard() {
    let app = test_app();
    let token = register(&app, "jane@example.com").await;

    let response = app.clone().oneshot(get("/dashboard", Some(&token))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let overview: DashboardOverview = json_body(response).await;
    assert_eq!(overview.user.email, "jane@example.com");
    assert_eq!(overview.stats.len(), 4);
    assert_eq!(overview.recent_orders.len(), 5);
    assert_eq!(overview.top_products.len(), 4);

    let response = app
        .clone()
        .oneshot(get("/dashboard/profile", Some(&token)))
        .await
        .unwrap();
    let profile: CurrentUser = json_body(response).await;
    assert_eq!(profile.name, "Jane Smith");
}

#[tokio::test]
async fn test_register_sets_hardened_cookie() {
    let response = test_app()
        .oneshot(post_json("/register", registration("jane@example.com"), None))
        .await
        .unwrap();

    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("Path=/"));
    assert!(set_cookie.contains("SameSite=Lax"));
    assert!(set_cookie.contains("Max-Age=604800"));
}

#[tokio::test]
async fn test_register_validation_error_is_reported() {
    let body = json!({
        "name": "Jane Smith",
        "email": "jane@example.com",
        "password": "correct-horse",
        "confirm_password": "correct-pony",
    });

    let response = test_app()
        .oneshot(post_json("/register", body, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = json_body(response).await;
    assert_eq!(error.message, "Passwords do not match");
}

#[tokio::test]
async fn test_register_duplicate_email_conflicts() {
    let app = test_app();
    register(&app, "jane@example.com").await;

    let response = app
        .clone()
        .oneshot(post_json("/register", registration("jane@example.com"), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_login_with_valid_credentials_sets_cookie() {
    let app = test_app();
    register(&app, "jane@example.com").await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/login",
            json!({ "email": "jane@example.com", "password": "correct-horse" }),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let token = session_cookie_value(&response).unwrap();

    let response = app.clone().oneshot(get("/dashboard", Some(&token))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_with_wrong_password_is_unauthorized() {
    let app = test_app();
    register(&app, "jane@example.com").await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/login",
            json!({ "email": "jane@example.com", "password": "wrong-horse" }),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(session_cookie_value(&response), None);
}

#[tokio::test]
async fn test_login_with_oversized_password_is_unauthorized() {
    let app = test_app();
    register(&app, "jane@example.com").await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/login",
            json!({ "email": "jane@example.com", "password": "a".repeat(1_000_000) }),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(session_cookie_value(&response), None);
}

#[tokio::test]
async fn test_forged_cookie_passes_gate_but_not_dashboard() {
    let response = test_app()
        .oneshot(get("/dashboard", Some("forged-token")))
        .await
        .unwrap();

    // The gate let it through; the handler's verification sent it back with the cookie cleared.
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/login");
    assert_eq!(session_cookie_value(&response).as_deref(), Some(""));
}

#[tokio::test]
async fn test_unknown_dashboard_section_is_not_found_for_signed_in_users() {
    let app = test_app();
    let token = register(&app, "jane@example.com").await;

    let response = app
        .clone()
        .oneshot(get("/dashboard/does-not-exist", Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_logout_revokes_session_and_clears_cookie() {
    let app = test_app();
    let token = register(&app, "jane@example.com").await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/logout")
        .header(header::COOKIE, format!("{}={}", COOKIE_NAME, token))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
    assert_eq!(session_cookie_value(&response).as_deref(), Some(""));

    // Replaying the old token passes the gate but fails verification.
    let response = app.clone().oneshot(get("/dashboard", Some(&token))).await.unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_logout_without_cookie_still_redirects() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/logout")
        .body(Body::empty())
        .unwrap();

    let response = test_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let response = test_app().oneshot(get("/health", None)).await.unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}
