//! Admin route guard.
//!
//! Evaluated once per request. The resulting [`AdminSession`] is handed to
//! the handler as an explicit value.

use crate::config::GuardPolicy;
use crate::error::{AuthError, Result};
use crate::providers::SessionStore;
use crate::state::AdminSession;
use crate::token::legacy_token_email;
use billetterie_core::environment::Clock;
use std::sync::Arc;

/// Decides whether a bearer token grants access to admin routes.
#[derive(Clone)]
pub struct AdminGuard {
    policy: GuardPolicy,
    sessions: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
}

impl AdminGuard {
    /// Create a guard applying `policy`.
    #[must_use]
    pub fn new(policy: GuardPolicy, sessions: Arc<dyn SessionStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            policy,
            sessions,
            clock,
        }
    }

    /// Policy in force.
    #[must_use]
    pub const fn policy(&self) -> GuardPolicy {
        self.policy
    }

    /// Resolve `token` into an admin session.
    ///
    /// # Errors
    ///
    /// - [`AuthError::MissingToken`]: empty token (both policies)
    /// - [`AuthError::SessionNotFound`] / [`AuthError::SessionExpired`]: under
    ///   [`GuardPolicy::Verified`]
    /// - [`AuthError::DatabaseError`]: session store failure
    pub async fn authorize(&self, token: &str) -> Result<AdminSession> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }

        let now = self.clock.now();
        let stored = self.sessions.find(token).await?;

        match self.policy {
            GuardPolicy::Verified => {
                let session = stored.ok_or(AuthError::SessionNotFound)?;
                if session.is_live(now) {
                    Ok(session)
                } else {
                    tracing::warn!(email = %session.email, "Rejected expired admin session");
                    Err(AuthError::SessionExpired)
                }
            },
            GuardPolicy::PresenceOnly => Ok(stored.unwrap_or_else(|| AdminSession {
                email: legacy_token_email(token).unwrap_or_default(),
                token: token.to_string(),
                issued_at: now,
                expires_at: now,
            })),
        }
    }
}

impl std::fmt::Debug for AdminGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminGuard")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
