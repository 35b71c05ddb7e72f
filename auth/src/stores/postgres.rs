//! PostgreSQL admin directory and session store.
//!
//! Tables (see `booking/migrations`):
//!
//! - `admin_users(email, password_hash, created_at)`
//! - `admin_sessions(token, email, issued_at, expires_at)`
//!
//! # Example
//!
//! ```no_run
//! use billetterie_auth::stores::postgres::{PostgresAdminDirectory, PostgresSessionStore};
//! use sqlx::PgPool;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = PgPool::connect("postgresql://localhost/billetterie").await?;
//! let directory = PostgresAdminDirectory::new(pool.clone());
//! let sessions = PostgresSessionStore::new(pool);
//! # Ok(())
//! # }
//! ```

use crate::error::{AuthError, Result};
use crate::password::{hash_password, verify_password};
use crate::providers::{AdminDirectory, SessionStore};
use crate::state::AdminSession;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

fn database_error(context: &str, error: &sqlx::Error) -> AuthError {
    AuthError::DatabaseError(format!("{context}: {error}"))
}

/// Admin directory backed by the `admin_users` table.
#[derive(Clone)]
pub struct PostgresAdminDirectory {
    /// PostgreSQL connection pool.
    pool: PgPool,
}

impl PostgresAdminDirectory {
    /// Create a new directory over `pool`.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AdminDirectory for PostgresAdminDirectory {
    async fn authenticate(&self, email: &str, password: &str) -> Result<String> {
        let row: Option<(String, String)> = sqlx::query_as(
            r"
            SELECT email, password_hash
            FROM admin_users
            WHERE lower(email) = lower($1)
            ",
        )
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error("Failed to load admin", &e))?;

        match row {
            Some((email, hash)) if verify_password(password, &hash) => Ok(email),
            _ => Err(AuthError::InvalidCredentials),
        }
    }

    async fn ensure_admin(&self, email: &str, password: &str) -> Result<()> {
        let hash = hash_password(password)?;
        sqlx::query(
            r"
            INSERT INTO admin_users (email, password_hash)
            VALUES ($1, $2)
            ON CONFLICT (email) DO NOTHING
            ",
        )
        .bind(email.trim().to_lowercase())
        .bind(hash)
        .execute(&self.pool)
        .await
        .map_err(|e| database_error("Failed to seed admin", &e))?;
        Ok(())
    }
}

/// Session store backed by the `admin_sessions` table.
#[derive(Clone)]
pub struct PostgresSessionStore {
    /// PostgreSQL connection pool.
    pool: PgPool,
}

impl PostgresSessionStore {
    /// Create a new session store over `pool`.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Delete sessions that expired before `now`. Returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM admin_sessions WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| database_error("Failed to purge sessions", &e))?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl SessionStore for PostgresSessionStore {
    async fn create(&self, session: AdminSession) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO admin_sessions (token, email, issued_at, expires_at)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(&session.token)
        .bind(&session.email)
        .bind(session.issued_at)
        .bind(session.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| database_error("Failed to create session", &e))?;
        Ok(())
    }

    async fn find(&self, token: &str) -> Result<Option<AdminSession>> {
        let row: Option<(String, String, DateTime<Utc>, DateTime<Utc>)> = sqlx::query_as(
            r"
            SELECT token, email, issued_at, expires_at
            FROM admin_sessions
            WHERE token = $1
            ",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error("Failed to load session", &e))?;

        Ok(row.map(|(token, email, issued_at, expires_at)| AdminSession {
            email,
            token,
            issued_at,
            expires_at,
        }))
    }

    async fn delete(&self, token: &str) -> Result<()> {
        sqlx::query("DELETE FROM admin_sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(|e| database_error("Failed to delete session", &e))?;
        Ok(())
    }
}
