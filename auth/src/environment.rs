//! Dependencies injected into the admin authentication reducer and guard.

use crate::config::AuthConfig;
use crate::providers::{AdminDirectory, SessionStore};
use billetterie_core::environment::Clock;
use std::sync::Arc;

/// Admin authentication environment.
#[derive(Clone)]
pub struct AuthEnvironment {
    /// Credential verification.
    pub directory: Arc<dyn AdminDirectory>,
    /// Issued sessions.
    pub sessions: Arc<dyn SessionStore>,
    /// Time source for issuing and checking sessions.
    pub clock: Arc<dyn Clock>,
    /// TTL and guard policy.
    pub config: AuthConfig,
}

impl AuthEnvironment {
    /// Create a new environment.
    #[must_use]
    pub fn new(
        directory: Arc<dyn AdminDirectory>,
        sessions: Arc<dyn SessionStore>,
        clock: Arc<dyn Clock>,
        config: AuthConfig,
    ) -> Self {
        Self {
            directory,
            sessions,
            clock,
            config,
        }
    }
}

impl std::fmt::Debug for AuthEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthEnvironment")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
