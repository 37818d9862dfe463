use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::{AppConfig, Env},
    error::AuthError,
    gate::LOGIN_PATH,
    models::CurrentUser,
    session::SessionState,
};

/// Claims
///
/// Payload of a session token. Signed with the configured session secret.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the user id.
    pub sub: Uuid,
    /// Session id: the row in the session store this token stands for.
    pub sid: Uuid,
    /// Expiration Time (exp), seconds since the epoch.
    pub exp: usize,
    /// Issued At (iat), seconds since the epoch.
    pub iat: usize,
}

pub fn encode_token(claims: &Claims, secret: &str) -> Result<String, AuthError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::Internal(format!("token encoding failed: {}", e)))
}

/// decode_token
///
/// Verifies the signature and, when `check_expiry` is set, the `exp` claim. Any failure
/// (bad signature, malformed token, expired) yields `None`.
pub fn decode_token(token: &str, secret: &str, check_expiry: bool) -> Option<Claims> {
    let mut validation = Validation::default();
    validation.validate_exp = check_expiry;
    if !check_expiry {
        validation.required_spec_claims.clear();
    }

    match decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation) {
        Ok(data) => Some(data.claims),
        Err(e) => {
            tracing::debug!(kind = ?e.kind(), "session token rejected");
            None
        }
    }
}

/// session_cookie
///
/// The cookie carrying a freshly issued session token.
pub fn session_cookie(config: &AppConfig, token: String) -> Cookie<'static> {
    Cookie::build((config.session_cookie_name.clone(), token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.env == Env::Production)
        .max_age(time::Duration::seconds(config.session_ttl_secs))
        .build()
}

/// removal_cookie
///
/// Matches the attributes of `session_cookie` so `CookieJar::remove` clears the right cookie.
pub fn removal_cookie(config: &AppConfig) -> Cookie<'static> {
    Cookie::build((config.session_cookie_name.clone(), ""))
        .path("/")
        .build()
}

/// SessionUser
///
/// The verified identity behind a request. Protected handlers take this as an argument; the
/// access gate in front of them only checked that a session cookie exists.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub user: CurrentUser,
    /// The raw token from the cookie.
    pub token: String,
}

/// SessionUser Extractor Implementation
///
/// 1. Reads the session cookie named in `AppConfig`.
/// 2. Resolves it through `SessionService::get_current_user` (signature, expiry, session row,
///    user existence).
///
/// Rejection: a `307` to the login page that also deletes the cookie. Leaving a dead cookie in
/// place would make the access gate send the client from `/login` straight back here.
impl<S> FromRequestParts<S> for SessionUser
where
    S: Send + Sync,
    SessionState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let sessions = SessionState::from_ref(state);
        let config = AppConfig::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);

        let Some(token) = jar
            .get(&config.session_cookie_name)
            .map(|cookie| cookie.value().to_string())
        else {
            return Err(Redirect::temporary(LOGIN_PATH).into_response());
        };

        match sessions.get_current_user(&token).await {
            Some(user) => Ok(SessionUser { user, token }),
            None => {
                tracing::info!(path = %parts.uri.path(), "session cookie failed verification");
                Err((
                    jar.remove(removal_cookie(&config)),
                    Redirect::temporary(LOGIN_PATH),
                )
                    .into_response())
            }
        }
    }
}
