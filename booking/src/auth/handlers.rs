//! Admin login, logout and session handlers.

use crate::auth::middleware::{auth_error, RequireAdmin};
use crate::server::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use billetterie_auth::{AdminSession, AuthAction};
use billetterie_web::{AppError, CorrelationId, WebResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Login request body.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoginRequest {
    /// Admin email
    pub email: String,
    /// Admin password
    pub password: String,
}

/// Issued session, returned by login and by the session endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionResponse {
    /// Bearer token to send as `Authorization: Bearer <token>`
    pub token: String,
    /// Admin email
    pub email: String,
    /// When the session was issued
    pub issued_at: DateTime<Utc>,
    /// When the token stops being accepted
    pub expires_at: DateTime<Utc>,
}

impl From<AdminSession> for SessionResponse {
    fn from(session: AdminSession) -> Self {
        Self {
            token: session.token,
            email: session.email,
            issued_at: session.issued_at,
            expires_at: session.expires_at,
        }
    }
}

/// Log an admin in.
///
/// # Endpoint
///
/// ```text
/// POST /api/admin/login
/// {"email": "admin@example.com", "password": "..."}
/// ```
///
/// # Errors
///
/// - 401: unknown email or wrong password
/// - 408: the directory did not answer in time
pub async fn login(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    Json(request): Json<LoginRequest>,
) -> WebResult<Json<SessionResponse>> {
    if request.email.trim().is_empty() || request.password.is_empty() {
        return Err(AppError::validation("Email and password are required"));
    }

    // The correlation header is client-controlled; results are matched on a
    // nonce only this request knows.
    let request_id = Uuid::new_v4();
    tracing::debug!(correlation_id = %correlation_id.0, %request_id, "Login requested");
    let action = AuthAction::Login {
        request_id,
        email: request.email,
        password: request.password,
    };

    let result = state
        .auth
        .send_and_wait_for(action, |a| a.is_result_for(request_id), state.request_timeout)
        .await?;

    match result {
        AuthAction::LoginSucceeded { session, .. } => Ok(Json(session.into())),
        AuthAction::LoginFailed { error, .. } => Err(auth_error(error)),
        _ => Err(AppError::internal("Unexpected response from login")),
    }
}

/// Revoke the caller's session. Always 204 for a guarded caller.
///
/// # Errors
///
/// - 401: guard refused the token
/// - 500: the session store failed
pub async fn logout(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    RequireAdmin(session): RequireAdmin,
) -> WebResult<StatusCode> {
    let request_id = Uuid::new_v4();
    tracing::debug!(correlation_id = %correlation_id.0, %request_id, admin = %session.email, "Logout requested");
    let action = AuthAction::Logout {
        request_id,
        token: session.token,
    };

    let result = state
        .auth
        .send_and_wait_for(action, |a| a.is_result_for(request_id), state.request_timeout)
        .await?;

    match result {
        AuthAction::LoggedOut { error: None, .. } => Ok(StatusCode::NO_CONTENT),
        AuthAction::LoggedOut { error: Some(error), .. } => Err(auth_error(error)),
        _ => Err(AppError::internal("Unexpected response from logout")),
    }
}

/// The session context the guard resolved for this request.
///
/// # Errors
///
/// - 401: guard refused the token
#[allow(clippy::unused_async)]
pub async fn current_session(RequireAdmin(session): RequireAdmin) -> WebResult<Json<SessionResponse>> {
    Ok(Json(session.into()))
}
