use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;

use crate::config::AppConfig;

pub const LOGIN_PATH: &str = "/login";
pub const REGISTER_PATH: &str = "/register";
pub const DASHBOARD_PATH: &str = "/dashboard";

/// RouteClass
///
/// Classification of a request path. Derived on every request, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// `/login` or `/register`: pages a signed-in user has no reason to see.
    AuthPage,
    /// Anything under `/dashboard`.
    ProtectedPage,
    Other,
}

/// Decision
///
/// The outcome of the access gate for a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    RedirectToLogin,
    RedirectToDashboard,
}

impl Decision {
    /// Location the client is sent to, or `None` when the request passes through.
    pub fn redirect_target(&self) -> Option<&'static str> {
        match self {
            Decision::Allow => None,
            Decision::RedirectToLogin => Some(LOGIN_PATH),
            Decision::RedirectToDashboard => Some(DASHBOARD_PATH),
        }
    }
}

/// RouteMatching
///
/// How paths are compared against the gated route roots.
///
/// `Prefix` is a plain string-prefix test, so `/loginhelp` counts as the login page.
/// `Segment` requires the root to be the whole path or to be followed by `/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RouteMatching {
    #[default]
    Prefix,
    Segment,
}

impl RouteMatching {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "prefix" => Some(RouteMatching::Prefix),
            "segment" => Some(RouteMatching::Segment),
            _ => None,
        }
    }

    fn matches(&self, path: &str, root: &str) -> bool {
        match self {
            RouteMatching::Prefix => path.starts_with(root),
            RouteMatching::Segment => path
                .strip_prefix(root)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/')),
        }
    }
}

/// classify
///
/// Maps a path onto exactly one `RouteClass`. Total: unknown or empty paths are `Other`.
pub fn classify(path: &str, matching: RouteMatching) -> RouteClass {
    if matching.matches(path, LOGIN_PATH) || matching.matches(path, REGISTER_PATH) {
        RouteClass::AuthPage
    } else if matching.matches(path, DASHBOARD_PATH) {
        RouteClass::ProtectedPage
    } else {
        RouteClass::Other
    }
}

/// decide
///
/// The access rule with prefix classification. A pure function of its inputs.
pub fn decide(path: &str, has_session_cookie: bool) -> Decision {
    decide_with(path, has_session_cookie, RouteMatching::Prefix)
}

/// decide_with
///
/// Same rules as `decide`, with the classifier chosen by the caller.
pub fn decide_with(path: &str, has_session_cookie: bool, matching: RouteMatching) -> Decision {
    match (classify(path, matching), has_session_cookie) {
        (RouteClass::AuthPage, true) => Decision::RedirectToDashboard,
        (RouteClass::ProtectedPage, false) => Decision::RedirectToLogin,
        _ => Decision::Allow,
    }
}

/// has_session_cookie
///
/// Presence check only. The value is never read, so an empty or forged token counts.
pub fn has_session_cookie(jar: &CookieJar, cookie_name: &str) -> bool {
    jar.get(cookie_name).is_some()
}

/// access_gate
///
/// Middleware applied to the gated routes (`/login`, `/register`, `/dashboard/*`).
///
/// *Mechanism*: looks only at whether the session cookie exists. It does not verify the token;
/// protected handlers do that through the `SessionUser` extractor. Redirects use
/// `307 Temporary Redirect`, which keeps the method: a signed-in `POST /login` is replayed as
/// `POST /dashboard` and answered with `405`.
pub async fn access_gate(
    State(config): State<AppConfig>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();
    let has_cookie = has_session_cookie(&jar, &config.session_cookie_name);
    let decision = decide_with(path, has_cookie, config.route_matching);

    tracing::debug!(path, has_cookie, ?decision, "access gate decision");

    match decision.redirect_target() {
        Some(target) => Redirect::temporary(target).into_response(),
        None => next.run(request).await,
    }
}
