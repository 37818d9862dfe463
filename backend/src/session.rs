use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    auth::{self, Claims},
    config::AppConfig,
    error::AuthError,
    models::{CurrentUser, IssuedSession, NewUser, RegisterRequest, Session, User},
    password::{MAX_PASSWORD_LEN, hash_password_off_thread, verify_password_off_thread},
    repository::RepositoryState,
};

pub const MIN_PASSWORD_LEN: usize = 8;

/// SessionService
///
/// The capability interface over process-wide authentication state. Handlers use it to sign
/// users up, in and out, and to resolve the user behind a session token. The access gate never
/// calls it.
#[async_trait]
pub trait SessionService: Send + Sync {
    /// Creates the account and signs it in.
    async fn sign_up(&self, request: RegisterRequest) -> Result<IssuedSession, AuthError>;

    /// Verifies credentials and opens a new session.
    async fn create_session(&self, email: &str, password: &str)
    -> Result<IssuedSession, AuthError>;

    /// Revokes the session named by `token`. Ending an unknown or already ended session is not
    /// an error.
    async fn end_session(&self, token: &str) -> Result<(), AuthError>;

    /// Full verification of a session token. `None` for anything that is not a live session of
    /// an existing user.
    async fn get_current_user(&self, token: &str) -> Option<CurrentUser>;
}

/// SessionState
///
/// The concrete type used to share the session capability across the application state.
pub type SessionState = Arc<dyn SessionService>;

/// normalize_email
///
/// Emails are compared trimmed and lower-cased, so `A@B.com ` and `a@b.com` are one account.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// validate_registration
///
/// Server-side counterpart of the registration form checks, in the order the form reports them.
pub fn validate_registration(request: &RegisterRequest) -> Result<(), AuthError> {
    if request.name.trim().is_empty() {
        return Err(AuthError::Validation("Name is required".to_string()));
    }
    if !request.email.contains('@') {
        return Err(AuthError::Validation(
            "Please enter a valid email address".to_string(),
        ));
    }
    if request.password != request.confirm_password {
        return Err(AuthError::Validation("Passwords do not match".to_string()));
    }
    if request.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::Validation(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LEN
        )));
    }
    if request.password.len() > MAX_PASSWORD_LEN {
        return Err(AuthError::Validation(format!(
            "Password must be at most {} bytes long",
            MAX_PASSWORD_LEN
        )));
    }
    Ok(())
}

/// TokenSessionService
///
/// `SessionService` issuing signed session tokens. Each token names a row in the session store,
/// which makes logout effective immediately rather than at token expiry.
pub struct TokenSessionService {
    repo: RepositoryState,
    secret: String,
    ttl_secs: i64,
}

impl TokenSessionService {
    pub fn new(repo: RepositoryState, secret: impl Into<String>, ttl_secs: i64) -> Self {
        Self {
            repo,
            secret: secret.into(),
            ttl_secs,
        }
    }

    pub fn from_config(repo: RepositoryState, config: &AppConfig) -> Self {
        Self::new(repo, config.session_secret.clone(), config.session_ttl_secs)
    }

    async fn issue(&self, user: User) -> Result<IssuedSession, AuthError> {
        let now = Utc::now();
        let expires_at = Duration::try_seconds(self.ttl_secs)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| {
                AuthError::Internal(format!("session lifetime out of range: {}s", self.ttl_secs))
            })?;
        let session = Session {
            id: Uuid::new_v4(),
            user_id: user.id,
            created_at: now,
            expires_at,
        };
        self.repo.insert_session(session.clone()).await?;

        let purged = self.repo.purge_expired_sessions(now).await;
        if purged > 0 {
            tracing::debug!(purged, "expired sessions removed");
        }

        let claims = Claims {
            sub: user.id,
            sid: session.id,
            iat: now.timestamp() as usize,
            exp: session.expires_at.timestamp() as usize,
        };
        let token = auth::encode_token(&claims, &self.secret)?;

        tracing::info!(user_id = %user.id, session_id = %session.id, "session created");

        Ok(IssuedSession {
            token,
            user: user.into(),
            expires_at: session.expires_at,
        })
    }
}

#[async_trait]
impl SessionService for TokenSessionService {
    async fn sign_up(&self, request: RegisterRequest) -> Result<IssuedSession, AuthError> {
        validate_registration(&request)?;

        let user = self
            .repo
            .create_user(NewUser {
                name: request.name.trim().to_string(),
                email: normalize_email(&request.email),
                password_hash: hash_password_off_thread(request.password).await?,
            })
            .await?;

        tracing::info!(user_id = %user.id, "user registered");

        self.issue(user).await
    }

    async fn create_session(
        &self,
        email: &str,
        password: &str,
    ) -> Result<IssuedSession, AuthError> {
        if password.len() > MAX_PASSWORD_LEN {
            return Err(AuthError::InvalidCredentials);
        }

        let user = self
            .repo
            .find_user_by_email(&normalize_email(email))
            .await
            .ok_or(AuthError::InvalidCredentials)?;

        let verified =
            verify_password_off_thread(password.to_string(), user.password_hash.clone()).await?;
        if !verified {
            tracing::debug!(user_id = %user.id, "password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        self.issue(user).await
    }

    async fn end_session(&self, token: &str) -> Result<(), AuthError> {
        // Expired tokens still name a row worth removing.
        let Some(claims) = auth::decode_token(token, &self.secret, false) else {
            return Ok(());
        };

        if self.repo.delete_session(claims.sid).await {
            tracing::info!(user_id = %claims.sub, session_id = %claims.sid, "session ended");
        }
        Ok(())
    }

    async fn get_current_user(&self, token: &str) -> Option<CurrentUser> {
        let claims = auth::decode_token(token, &self.secret, true)?;

        let session = self.repo.get_session(claims.sid).await?;
        if session.is_expired(Utc::now()) {
            self.repo.delete_session(session.id).await;
            return None;
        }
        if session.user_id != claims.sub {
            return None;
        }

        // The user may have been deleted after the session was issued.
        let user = self.repo.get_user(session.user_id).await?;
        Some(user.into())
    }
}
