//! In-memory admin directory and session store.
//!
//! Used by tests and by `STORAGE=memory` deployments. Data is lost on restart.

use crate::error::{AuthError, Result};
use crate::password::{hash_password, verify_password};
use crate::providers::{AdminDirectory, SessionStore};
use crate::state::AdminSession;
use async_trait::async_trait;
use crate::token::tokens_match;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

fn lock_error() -> AuthError {
    AuthError::InternalError("Mutex lock failed".to_string())
}

fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

/// In-memory admin directory holding Argon2 hashes.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAdminDirectory {
    admins: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryAdminDirectory {
    /// Create an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a directory with one admin.
    ///
    /// # Errors
    ///
    /// Returns error if the password cannot be hashed.
    pub fn with_admin(email: &str, password: &str) -> Result<Self> {
        let directory = Self::new();
        directory.insert(email, password)?;
        Ok(directory)
    }

    /// Number of registered admins.
    ///
    /// # Errors
    ///
    /// Returns error if lock is poisoned.
    pub fn admin_count(&self) -> Result<usize> {
        Ok(self.admins.lock().map_err(|_| lock_error())?.len())
    }

    fn insert(&self, email: &str, password: &str) -> Result<()> {
        let hash = hash_password(password)?;
        self.admins
            .lock()
            .map_err(|_| lock_error())?
            .insert(normalize(email), hash);
        Ok(())
    }
}

#[async_trait]
impl AdminDirectory for InMemoryAdminDirectory {
    async fn authenticate(&self, email: &str, password: &str) -> Result<String> {
        let email = normalize(email);
        let hash = self
            .admins
            .lock()
            .map_err(|_| lock_error())?
            .get(&email)
            .cloned()
            .ok_or(AuthError::InvalidCredentials)?;

        if verify_password(password, &hash) {
            Ok(email)
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }

    async fn ensure_admin(&self, email: &str, password: &str) -> Result<()> {
        let exists = self
            .admins
            .lock()
            .map_err(|_| lock_error())?
            .contains_key(&normalize(email));
        if !exists {
            self.insert(email, password)?;
        }
        Ok(())
    }
}

/// In-memory session store.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<Mutex<Vec<AdminSession>>>,
}

impl InMemorySessionStore {
    /// Create an empty session store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get count of stored sessions.
    ///
    /// # Errors
    ///
    /// Returns error if lock is poisoned.
    pub fn session_count(&self) -> Result<usize> {
        Ok(self.sessions.lock().map_err(|_| lock_error())?.len())
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self, session: AdminSession) -> Result<()> {
        let mut sessions = self.sessions.lock().map_err(|_| lock_error())?;
        sessions.retain(|s| !tokens_match(&s.token, &session.token));
        sessions.push(session);
        Ok(())
    }

    async fn find(&self, token: &str) -> Result<Option<AdminSession>> {
        let sessions = self.sessions.lock().map_err(|_| lock_error())?;
        Ok(sessions.iter().find(|s| tokens_match(token, &s.token)).cloned())
    }

    async fn delete(&self, token: &str) -> Result<()> {
        self.sessions
            .lock()
            .map_err(|_| lock_error())?
            .retain(|s| !tokens_match(token, &s.token));
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use billetterie_core::environment::Clock;
    use billetterie_testing::test_clock;
    use chrono::Duration;

    fn session(token: &str) -> AdminSession {
        let now = test_clock().now();
        AdminSession {
            email: "admin@example.com".to_string(),
            token: token.to_string(),
            issued_at: now,
            expires_at: now + Duration::hours(8),
        }
    }

    #[tokio::test]
    async fn directory_checks_password() {
        let directory = InMemoryAdminDirectory::with_admin("Admin@Example.com", "admin123").unwrap();

        assert_eq!(
            directory.authenticate("admin@example.com ", "admin123").await.unwrap(),
            "admin@example.com"
        );
        assert_eq!(
            directory.authenticate("admin@example.com", "wrong").await,
            Err(AuthError::InvalidCredentials)
        );
        assert_eq!(
            directory.authenticate("other@example.com", "admin123").await,
            Err(AuthError::InvalidCredentials)
        );
    }

    #[tokio::test]
    async fn ensure_admin_keeps_existing_password() {
        let directory = InMemoryAdminDirectory::with_admin("admin@example.com", "first").unwrap();
        directory.ensure_admin("admin@example.com", "second").await.unwrap();

        assert_eq!(directory.admin_count().unwrap(), 1);
        assert!(directory.authenticate("admin@example.com", "first").await.is_ok());
    }

    #[tokio::test]
    async fn sessions_roundtrip_and_delete_is_idempotent() {
        let store = InMemorySessionStore::new();
        store.create(session("tok-1")).await.unwrap();

        assert_eq!(store.find("tok-1").await.unwrap(), Some(session("tok-1")));
        assert_eq!(store.find("tok-2").await.unwrap(), None);

        store.delete("tok-1").await.unwrap();
        store.delete("tok-1").await.unwrap();
        assert_eq!(store.session_count().unwrap(), 0);
    }
}
