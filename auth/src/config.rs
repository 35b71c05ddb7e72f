//! Authentication configuration.
//!
//! Values come from the application's configuration, never hardcoded here.

use chrono::Duration;
use std::str::FromStr;

/// How the admin guard treats a bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GuardPolicy {
    /// The token must be a live, unexpired session in the session store.
    #[default]
    Verified,
    /// Any non-empty token grants access.
    ///
    /// Reproduces the historical browser-side guard, which only checked
    /// that a token was stored. Opt-in only.
    PresenceOnly,
}

impl FromStr for GuardPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "verified" => Ok(Self::Verified),
            "presence_only" | "presence-only" => Ok(Self::PresenceOnly),
            other => Err(format!("unknown guard policy: {other}")),
        }
    }
}

/// Admin authentication configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Lifetime of an admin session.
    ///
    /// Default: 8 hours
    pub session_ttl: Duration,

    /// Guard policy applied to admin routes.
    pub policy: GuardPolicy,
}

impl AuthConfig {
    /// Create a configuration with the given policy and default TTL.
    #[must_use]
    pub const fn new(policy: GuardPolicy) -> Self {
        Self {
            session_ttl: Duration::hours(8),
            policy,
        }
    }

    /// Set the session lifetime.
    #[must_use]
    pub const fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new(GuardPolicy::Verified)
    }
}
