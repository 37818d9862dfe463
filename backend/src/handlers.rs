use crate::{
    AppState,
    auth::{SessionUser, removal_cookie, session_cookie},
    dashboard,
    error::AuthError,
    gate::LOGIN_PATH,
    models::{CurrentUser, DashboardOverview, ErrorResponse, LoginRequest, RegisterRequest},
    pages,
};
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{Html, Redirect},
};
use axum_extra::extract::CookieJar;

// --- Auth Pages ---

/// [Gated Route] Sign-in page. Visitors who already carry a session cookie never reach it.
pub async fn login_page() -> Html<&'static str> {
    Html(pages::LOGIN_PAGE)
}

/// [Gated Route] Registration page.
pub async fn register_page() -> Html<&'static str> {
    Html(pages::REGISTER_PAGE)
}

// --- Auth Actions ---

/// register
///
/// [Gated Route] Creates an account, signs it in and sets the session cookie.
///
/// *Errors*: validation failures (400) and an already registered email (409) carry a message
/// meant for the form.
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registered and signed in", body = CurrentUser),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<CurrentUser>), AuthError> {
    let issued = state.sessions.sign_up(payload).await?;
    let jar = jar.add(session_cookie(&state.config, issued.token));
    Ok((StatusCode::CREATED, jar, Json(issued.user)))
}

/// login
///
/// [Gated Route] Verifies credentials and sets the session cookie.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = CurrentUser),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<CurrentUser>), AuthError> {
    let issued = state
        .sessions
        .create_session(&payload.email, &payload.password)
        .await?;
    let jar = jar.add(session_cookie(&state.config, issued.token));
    Ok((jar, Json(issued.user)))
}

/// logout
///
/// [Public Route] Ends the current session, clears the cookie and sends the client to the
/// sign-in page. Always succeeds from the client's point of view.
#[utoipa::path(
    post,
    path = "/logout",
    responses((status = 303, description = "Signed out, redirect to /login"))
)]
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Redirect) {
    if let Some(cookie) = jar.get(&state.config.session_cookie_name) {
        if let Err(e) = state.sessions.end_session(cookie.value()).await {
            tracing::error!("Logout error: {}", e);
        }
    }

    (jar.remove(removal_cookie(&state.config)), Redirect::to(LOGIN_PATH))
}

// --- Dashboard ---

/// get_dashboard
///
/// [Gated Route] Dashboard overview for the verified user.
#[utoipa::path(
    get,
    path = "/dashboard",
    responses(
        (status = 200, description = "Overview", body = DashboardOverview),
        (status = 307, description = "No valid session, redirect to /login")
    )
)]
pub async fn get_dashboard(SessionUser { user, .. }: SessionUser) -> Json<DashboardOverview> {
    Json(dashboard::overview(user))
}

/// get_profile
///
/// [Gated Route] The signed-in user's profile.
#[utoipa::path(
    get,
    path = "/dashboard/profile",
    responses(
        (status = 200, description = "Profile", body = CurrentUser),
        (status = 307, description = "No valid session, redirect to /login")
    )
)]
pub async fn get_profile(SessionUser { user, .. }: SessionUser) -> Json<CurrentUser> {
    Json(user)
}

/// [Gated Route] Any other `/dashboard/*` path. Still requires a verified session so the
/// response does not reveal which sections exist.
pub async fn dashboard_not_found(_user: SessionUser) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            message: "Page not found".to_string(),
        }),
    )
}
