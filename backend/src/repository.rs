use crate::{
    error::AuthError,
    models::{NewUser, Session, User},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Repository Trait
///
/// Persistence contract for accounts and sessions. The session capability talks to this trait
/// only, so the same logic runs against Postgres in production and the in-memory store in
/// tests and database-less local runs.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    // Fails with `AuthError::EmailTaken` when the (normalized) email already exists.
    async fn create_user(&self, user: NewUser) -> Result<User, AuthError>;
    async fn get_user(&self, id: Uuid) -> Option<User>;
    async fn find_user_by_email(&self, email: &str) -> Option<User>;

    // --- Sessions ---
    async fn insert_session(&self, session: Session) -> Result<(), AuthError>;
    async fn get_session(&self, id: Uuid) -> Option<Session>;
    // Returns true if a row was removed.
    async fn delete_session(&self, id: Uuid) -> bool;
    // Removes every session expired at `now`, returning how many were dropped.
    async fn purge_expired_sessions(&self, now: DateTime<Utc>) -> u64;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// `Repository` backed by PostgreSQL. Schema lives in `migrations/`.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the embedded migrations. Safe to call on every startup.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn create_user(&self, user: NewUser) -> Result<User, AuthError> {
        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, image, password_hash, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user.name)
        .bind(user.email)
        .bind(user.password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn get_user(&self, id: Uuid) -> Option<User> {
        let result = sqlx::query_as::<_, User>(
            "SELECT id, name, email, image, password_hash, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;

        match result {
            Ok(user) => user,
            Err(e) => {
                tracing::error!("get_user error: {:?}", e);
                None
            }
        }
    }

    async fn find_user_by_email(&self, email: &str) -> Option<User> {
        let result = sqlx::query_as::<_, User>(
            "SELECT id, name, email, image, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await;

        match result {
            Ok(user) => user,
            Err(e) => {
                tracing::error!("find_user_by_email error: {:?}", e);
                None
            }
        }
    }

    async fn insert_session(&self, session: Session) -> Result<(), AuthError> {
        sqlx::query(
            "INSERT INTO sessions (id, user_id, created_at, expires_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(session.id)
        .bind(session.user_id)
        .bind(session.created_at)
        .bind(session.expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_session(&self, id: Uuid) -> Option<Session> {
        let result = sqlx::query_as::<_, Session>(
            "SELECT id, user_id, created_at, expires_at FROM sessions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;

        match result {
            Ok(session) => session,
            Err(e) => {
                tracing::error!("get_session error: {:?}", e);
                None
            }
        }
    }

    async fn delete_session(&self, id: Uuid) -> bool {
        match sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
        {
            Ok(result) => result.rows_affected() > 0,
            Err(e) => {
                tracing::error!("delete_session error: {:?}", e);
                false
            }
        }
    }

    async fn purge_expired_sessions(&self, now: DateTime<Utc>) -> u64 {
        match sqlx::query("DELETE FROM sessions WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await
        {
            Ok(result) => result.rows_affected(),
            Err(e) => {
                tracing::error!("purge_expired_sessions error: {:?}", e);
                0
            }
        }
    }
}

/// InMemoryRepository
///
/// `Repository` kept in process memory. Used by the test suites and for local runs without a
/// `DATABASE_URL`; everything is lost on restart.
#[derive(Default)]
pub struct InMemoryRepository {
    users: RwLock<HashMap<Uuid, User>>,
    sessions: RwLock<HashMap<Uuid, Session>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn create_user(&self, user: NewUser) -> Result<User, AuthError> {
        let mut users = self.users.write().await;

        if users.values().any(|existing| existing.email == user.email) {
            return Err(AuthError::EmailTaken);
        }

        let created = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            image: None,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        users.insert(created.id, created.clone());

        Ok(created)
    }

    async fn get_user(&self, id: Uuid) -> Option<User> {
        self.users.read().await.get(&id).cloned()
    }

    async fn find_user_by_email(&self, email: &str) -> Option<User> {
        self.users
            .read()
            .await
            .values()
            .find(|user| user.email == email)
            .cloned()
    }

    async fn insert_session(&self, session: Session) -> Result<(), AuthError> {
        self.sessions.write().await.insert(session.id, session);
        Ok(())
    }

    async fn get_session(&self, id: Uuid) -> Option<Session> {
        self.sessions.read().await.get(&id).cloned()
    }

    async fn delete_session(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    async fn purge_expired_sessions(&self, now: DateTime<Utc>) -> u64 {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(now));
        (before - sessions.len()) as u64
    }
}
