//! Admin route guard as an Axum extractor.
//!
//! ```rust,ignore
//! async fn dashboard(RequireAdmin(session): RequireAdmin) -> WebResult<Json<..>> {
//!     tracing::debug!(admin = %session.email, "Dashboard requested");
//!     ..
//! }
//! ```

use crate::server::state::AppState;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use billetterie_auth::{AdminSession, AuthError};
use billetterie_web::{AppError, BearerToken};

/// Authenticated admin.
///
/// Evaluates the guard once per request: a missing or malformed
/// `Authorization` header, or a token the guard refuses, is a 401.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub AdminSession);

#[async_trait]
impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let BearerToken(token) = BearerToken::from_request_parts(parts, state).await?;

        match state.guard.authorize(&token).await {
            Ok(session) => Ok(Self(session)),
            Err(error) => {
                tracing::warn!(error = %error, path = %parts.uri.path(), "Admin access refused");
                Err(auth_error(error))
            },
        }
    }
}

/// Map an auth failure to its HTTP error.
pub(crate) fn auth_error(error: AuthError) -> AppError {
    match error {
        AuthError::InvalidCredentials => AppError::unauthorized("Invalid email or password"),
        AuthError::MissingToken => AppError::unauthorized("Missing admin token"),
        AuthError::SessionNotFound => AppError::unauthorized("Unknown admin session"),
        AuthError::SessionExpired => AppError::unauthorized("Admin session has expired"),
        AuthError::DatabaseError(_) | AuthError::InternalError(_) => {
            AppError::internal("Authentication failed").with_source(error.into())
        },
    }
}
