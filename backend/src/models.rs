use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Stored Records ---

/// User
///
/// The account record in the `users` table. The password hash never leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    // Stored trimmed and lower-cased; unique.
    pub email: String,
    pub image: Option<String>,
    #[serde(skip)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Session
///
/// A row in the `sessions` table. The signed token handed to the client names this row by `id`,
/// so deleting the row revokes the token even before it expires.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// NewUser
///
/// Validated sign-up data handed to the repository.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

// --- Request Payloads ---

/// RegisterRequest
///
/// Input payload for POST /register. The password is hashed before storage and never logged.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// LoginRequest
///
/// Input payload for POST /login.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// --- Responses ---

/// CurrentUser
///
/// The signed-in user as exposed to the frontend. A missing avatar is the empty string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CurrentUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub image: String,
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            image: user.image.unwrap_or_default(),
        }
    }
}

/// IssuedSession
///
/// Result of a successful sign-up or sign-in: the token to place in the session cookie.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub user: CurrentUser,
    pub expires_at: DateTime<Utc>,
}

/// ErrorResponse
///
/// Body of every failed auth request.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ErrorResponse {
    pub message: String,
}

// --- Dashboard ---

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Trend {
    Up,
    Down,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct StatCard {
    pub title: String,
    pub value: String,
    pub change: String,
    pub trend: Trend,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RecentOrder {
    pub id: String,
    pub customer: String,
    pub amount: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct TopProduct {
    pub name: String,
    pub sales: u32,
    pub revenue: String,
}

/// DashboardOverview
///
/// Output schema for GET /dashboard. Everything except `user` is fixed sample data.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct DashboardOverview {
    pub user: CurrentUser,
    pub stats: Vec<StatCard>,
    pub recent_orders: Vec<RecentOrder>,
    pub top_products: Vec<TopProduct>,
}
