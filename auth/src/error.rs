//! Error types for admin authentication.

use thiserror::Error;

/// Result type alias for authentication operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Failure modes of admin login and the admin guard.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    // ═══════════════════════════════════════════════════════════
    // Authentication Errors
    // ═══════════════════════════════════════════════════════════

    /// Email unknown or password mismatch. Never says which.
    #[error("Invalid credentials")]
    InvalidCredentials,

    // ═══════════════════════════════════════════════════════════
    // Session Errors
    // ═══════════════════════════════════════════════════════════

    /// No bearer token was presented.
    #[error("Missing admin token")]
    MissingToken,

    /// Token unknown to the session store.
    #[error("Session not found")]
    SessionNotFound,

    /// Session existed but its expiry has passed.
    #[error("Session has expired")]
    SessionExpired,

    // ═══════════════════════════════════════════════════════════
    // System Errors
    // ═══════════════════════════════════════════════════════════

    /// Database operation failed.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Password hashing or other internal failure.
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AuthError {
    /// Whether the caller should be answered with 401.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials
                | Self::MissingToken
                | Self::SessionNotFound
                | Self::SessionExpired
        )
    }
}
