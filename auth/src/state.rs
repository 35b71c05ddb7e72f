//! Admin session and reducer state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An authenticated admin session.
///
/// Issued on login and handed to admin handlers by the guard, so handlers
/// never consult ambient authentication state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSession {
    /// Admin email the session was issued to.
    pub email: String,
    /// Opaque bearer token.
    pub token: String,
    /// When the session was issued.
    pub issued_at: DateTime<Utc>,
    /// When the session stops being accepted.
    pub expires_at: DateTime<Utc>,
}

impl AdminSession {
    /// Whether the session is still valid at `now`.
    #[must_use]
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// State of the admin authentication reducer.
///
/// Sessions themselves live in the `SessionStore`; the reducer only keeps
/// login bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    /// Successful logins since startup.
    pub successful_logins: u64,
    /// Rejected login attempts since startup.
    pub failed_logins: u64,
    /// Most recent successful login.
    pub last_login_at: Option<DateTime<Utc>>,
    /// Logins whose directory check is still running.
    pub pending_logins: usize,
}
