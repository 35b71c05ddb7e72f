//! Admin authentication reducer.
//!
//! # Flow
//!
//! 1. `Login` checks the credentials against the [`AdminDirectory`](crate::providers::AdminDirectory)
//! 2. On success a session is issued and stored in the [`SessionStore`](crate::providers::SessionStore)
//! 3. `LoginSucceeded` / `LoginFailed` carry the outcome back to the HTTP handler
//! 4. `Logout` deletes the session (`LoggedOut`)
//!
//! Under [`GuardPolicy::PresenceOnly`] the issued token is the legacy
//! `base64("email:millis")` string instead of a random token.

use crate::actions::AuthAction;
use crate::config::GuardPolicy;
use crate::environment::AuthEnvironment;
use crate::state::{AdminSession, AuthState};
use crate::token::{generate_session_token, legacy_token};
use billetterie_core::effect::Effect;
use billetterie_core::environment::Clock;
use billetterie_core::reducer::Reducer;
use billetterie_core::{smallvec, SmallVec};
use std::sync::Arc;

/// Admin login/logout reducer.
#[derive(Debug, Clone, Default)]
pub struct AdminAuthReducer;

impl AdminAuthReducer {
    /// Create a new reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for AdminAuthReducer {
    type State = AuthState;
    type Action = AuthAction;
    type Environment = AuthEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ═══════════════════════════════════════════════════════════════
            // Login: verify credentials, then issue a session
            // ═══════════════════════════════════════════════════════════════
            AuthAction::Login {
                request_id,
                email,
                password,
            } => {
                state.pending_logins += 1;

                let directory = Arc::clone(&env.directory);
                let sessions = Arc::clone(&env.sessions);
                let issued_at = env.clock.now();
                let expires_at = issued_at + env.config.session_ttl;
                let policy = env.config.policy;

                smallvec![Effect::future(async move {
                    let outcome = async {
                        let email = directory.authenticate(&email, &password).await?;
                        let token = match policy {
                            GuardPolicy::Verified => generate_session_token(),
                            GuardPolicy::PresenceOnly => legacy_token(&email, issued_at),
                        };
                        let session = AdminSession {
                            email,
                            token,
                            issued_at,
                            expires_at,
                        };
                        sessions.create(session.clone()).await?;
                        Ok::<_, crate::AuthError>(session)
                    }
                    .await;

                    Some(match outcome {
                        Ok(session) => AuthAction::LoginSucceeded {
                            request_id,
                            session,
                        },
                        Err(error) => AuthAction::LoginFailed {
                            request_id,
                            email,
                            error,
                        },
                    })
                })]
            },

            AuthAction::LoginSucceeded { session, .. } => {
                state.pending_logins = state.pending_logins.saturating_sub(1);
                state.successful_logins += 1;
                state.last_login_at = Some(session.issued_at);
                tracing::info!(email = %session.email, expires_at = %session.expires_at, "Admin logged in");
                smallvec![Effect::None]
            },

            AuthAction::LoginFailed { email, error, .. } => {
                state.pending_logins = state.pending_logins.saturating_sub(1);
                state.failed_logins += 1;
                if error.is_unauthorized() {
                    tracing::warn!(email = %email, "Admin login rejected");
                } else {
                    tracing::error!(email = %email, error = %error, "Admin login failed");
                }
                smallvec![Effect::None]
            },

            // ═══════════════════════════════════════════════════════════════
            // Logout: delete the session
            // ═══════════════════════════════════════════════════════════════
            AuthAction::Logout {
                request_id,
                token,
            } => {
                let sessions = Arc::clone(&env.sessions);

                smallvec![Effect::future(async move {
                    let error = sessions.delete(&token).await.err();
                    Some(AuthAction::LoggedOut {
                        request_id,
                        error,
                    })
                })]
            },

            AuthAction::LoggedOut { error, .. } => {
                match error {
                    Some(error) => tracing::error!(error = %error, "Admin logout failed"),
                    None => tracing::info!("Admin logged out"),
                }
                smallvec![Effect::None]
            },
        }
    }
}
