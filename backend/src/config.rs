use std::env;

use crate::gate::RouteMatching;

/// Fallback signing secret for local runs. Never accepted in production.
const LOCAL_SESSION_SECRET: &str = "super-secure-test-secret-value-local";

/// Seven days, matching the lifetime of the session cookie.
const DEFAULT_SESSION_TTL_SECS: i64 = 60 * 60 * 24 * 7;

/// Longest accepted session lifetime: one year.
pub const MAX_SESSION_TTL_SECS: i64 = 60 * 60 * 24 * 365;

/// AppConfig
///
/// Holds the application's entire configuration state. Immutable once loaded and
/// pulled into handlers and middleware through `FromRef`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Postgres connection string. `None` selects the in-memory store (local only).
    pub db_url: Option<String>,
    // Runtime environment marker. Controls log format and cookie hardening.
    pub env: Env,
    // Secret used to sign and verify session tokens.
    pub session_secret: String,
    // Name of the cookie carrying the session token. The access gate only checks its presence.
    pub session_cookie_name: String,
    // Lifetime of an issued session, in seconds.
    pub session_ttl_secs: i64,
    // How the access gate classifies request paths.
    pub route_matching: RouteMatching,
    // Socket address the HTTP server binds to.
    pub bind_addr: String,
}

/// Env
///
/// Defines the runtime context: local development (pretty logs, in-memory fallback)
/// or production (JSON logs, mandatory secrets, secure cookies).
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// Safe, non-panicking values for test state setup.
    fn default() -> Self {
        Self {
            db_url: None,
            env: Env::Local,
            session_secret: LOCAL_SESSION_SECRET.to_string(),
            session_cookie_name: "session_token".to_string(),
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            route_matching: RouteMatching::Prefix,
            bind_addr: "0.0.0.0:3000".to_string(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads all parameters from environment variables and fails fast.
    ///
    /// # Panics
    /// Panics in production when `DATABASE_URL` or `SESSION_SECRET` is missing, and in any
    /// environment when a numeric or enumerated variable cannot be parsed or is out of range.
    pub fn load() -> Self {
        let defaults = Self::default();

        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let (db_url, session_secret) = match env {
            Env::Production => (
                Some(env::var("DATABASE_URL").expect("FATAL: DATABASE_URL required in prod")),
                env::var("SESSION_SECRET")
                    .expect("FATAL: SESSION_SECRET must be set in production."),
            ),
            Env::Local => (
                env::var("DATABASE_URL").ok(),
                env::var("SESSION_SECRET").unwrap_or(defaults.session_secret),
            ),
        };

        let session_ttl_secs = match env::var("SESSION_TTL_SECS") {
            Ok(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|secs| (1..=MAX_SESSION_TTL_SECS).contains(secs))
                .expect("FATAL: SESSION_TTL_SECS must be between 1 and 31536000 seconds"),
            Err(_) => defaults.session_ttl_secs,
        };

        let route_matching = match env::var("GATE_ROUTE_MATCHING") {
            Ok(raw) => RouteMatching::parse(&raw)
                .expect("FATAL: GATE_ROUTE_MATCHING must be 'prefix' or 'segment'"),
            Err(_) => defaults.route_matching,
        };

        Self {
            db_url,
            env,
            session_secret,
            session_cookie_name: env::var("SESSION_COOKIE_NAME")
                .unwrap_or(defaults.session_cookie_name),
            session_ttl_secs,
            route_matching,
            bind_addr: env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
        }
    }
}
