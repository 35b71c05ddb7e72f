//! Admin authentication actions.

use crate::error::AuthError;
use crate::state::AdminSession;
use uuid::Uuid;

/// Actions of the [`AdminAuthReducer`](crate::reducers::AdminAuthReducer).
#[derive(Debug, Clone, PartialEq)]
pub enum AuthAction {
    // ═══════════════════════════════════════════════════════════════
    // Commands
    // ═══════════════════════════════════════════════════════════════

    /// Check credentials against the admin directory and issue a session.
    Login {
        /// Server-issued id of the request this action answers or starts.
        request_id: Uuid,
        /// Admin email as typed.
        email: String,
        /// Password as typed.
        password: String,
    },

    /// Delete the session behind `token`. Idempotent.
    Logout {
        /// Server-issued id of the request this action answers or starts.
        request_id: Uuid,
        /// Bearer token to revoke.
        token: String,
    },

    // ═══════════════════════════════════════════════════════════════
    // Results
    // ═══════════════════════════════════════════════════════════════

    /// Credentials accepted and the session stored.
    LoginSucceeded {
        /// Server-issued id of the request this action answers or starts.
        request_id: Uuid,
        /// The new session.
        session: AdminSession,
    },

    /// Credentials rejected, or the directory/session store failed.
    LoginFailed {
        /// Server-issued id of the request this action answers or starts.
        request_id: Uuid,
        /// Email of the attempt.
        email: String,
        /// Why it failed.
        error: AuthError,
    },

    /// Logout finished.
    LoggedOut {
        /// Server-issued id of the request this action answers or starts.
        request_id: Uuid,
        /// Session store failure, if any.
        error: Option<AuthError>,
    },
}

impl AuthAction {
    /// Request id carried by the action.
    #[must_use]
    pub const fn request_id(&self) -> Uuid {
        match self {
            Self::Login { request_id, .. }
            | Self::Logout { request_id, .. }
            | Self::LoginSucceeded { request_id, .. }
            | Self::LoginFailed { request_id, .. }
            | Self::LoggedOut { request_id, .. } => *request_id,
        }
    }

    /// Whether this is the result of the login or logout with `request_id`.
    #[must_use]
    pub fn is_result_for(&self, request_id: Uuid) -> bool {
        matches!(
            self,
            Self::LoginSucceeded { .. } | Self::LoginFailed { .. } | Self::LoggedOut { .. }
        ) && self.request_id() == request_id
    }
}
