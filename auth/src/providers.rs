//! Provider traits for admin authentication.
//!
//! Both traits are `#[async_trait]` so they can be held as
//! `Arc<dyn AdminDirectory>` / `Arc<dyn SessionStore>` in the environment and
//! called from inside effects.
//!
//! # Implementations
//!
//! - [`PostgresAdminDirectory`](crate::stores::postgres::PostgresAdminDirectory),
//!   [`PostgresSessionStore`](crate::stores::postgres::PostgresSessionStore): production
//! - [`InMemoryAdminDirectory`](crate::stores::memory::InMemoryAdminDirectory),
//!   [`InMemorySessionStore`](crate::stores::memory::InMemorySessionStore): tests and local runs

use crate::error::Result;
use crate::state::AdminSession;
use async_trait::async_trait;

/// Source of truth for admin credentials.
#[async_trait]
pub trait AdminDirectory: Send + Sync {
    /// Verify an email/password pair.
    ///
    /// Returns the canonical admin email on success.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidCredentials`](crate::AuthError::InvalidCredentials):
    ///   unknown email or wrong password
    /// - [`AuthError::DatabaseError`](crate::AuthError::DatabaseError): backend failure
    async fn authenticate(&self, email: &str, password: &str) -> Result<String>;

    /// Create the admin if the email is not registered yet.
    ///
    /// Used to seed the first admin from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if hashing or the backend fails.
    async fn ensure_admin(&self, email: &str, password: &str) -> Result<()>;
}

/// Storage for issued admin sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist a newly issued session.
    ///
    /// # Errors
    ///
    /// Returns error if the backend fails.
    async fn create(&self, session: AdminSession) -> Result<()>;

    /// Look a session up by token, expired or not.
    ///
    /// # Errors
    ///
    /// Returns error if the backend fails.
    async fn find(&self, token: &str) -> Result<Option<AdminSession>>;

    /// Delete a session. Deleting an unknown token succeeds.
    ///
    /// # Errors
    ///
    /// Returns error if the backend fails.
    async fn delete(&self, token: &str) -> Result<()>;
}
