//! Admin authentication setup: builds the `AuthEnvironment`, `Store` and guard.
//!
//! The directory and session store are either both Postgres-backed
//! (`admin_users`, `admin_sessions`) or both in memory.

use billetterie_auth::stores::postgres::{PostgresAdminDirectory, PostgresSessionStore};
use billetterie_auth::stores::{InMemoryAdminDirectory, InMemorySessionStore};
use billetterie_auth::{
    AdminAuthReducer, AdminDirectory, AdminGuard, AuthAction, AuthConfig, AuthEnvironment, AuthState, SessionStore,
};
use billetterie_core::environment::Clock;
use billetterie_runtime::Store;
use sqlx::PgPool;
use std::sync::Arc;

/// Type alias for the admin auth `Store`.
pub type AdminAuthStore = Store<AuthState, AuthAction, AuthEnvironment, AdminAuthReducer>;

/// Environment backed by the `admin_users` and `admin_sessions` tables.
#[must_use]
pub fn postgres_auth_environment(pool: &PgPool, clock: Arc<dyn Clock>, config: AuthConfig) -> AuthEnvironment {
    let directory: Arc<dyn AdminDirectory> = Arc::new(PostgresAdminDirectory::new(pool.clone()));
    let sessions: Arc<dyn SessionStore> = Arc::new(PostgresSessionStore::new(pool.clone()));
    AuthEnvironment::new(directory, sessions, clock, config)
}

/// Environment held in process memory.
#[must_use]
pub fn memory_auth_environment(
    directory: InMemoryAdminDirectory,
    clock: Arc<dyn Clock>,
    config: AuthConfig,
) -> AuthEnvironment {
    AuthEnvironment::new(
        Arc::new(directory),
        Arc::new(InMemorySessionStore::new()),
        clock,
        config,
    )
}

/// Build the auth `Store` with `AdminAuthReducer`.
#[must_use]
pub fn build_auth_store(environment: AuthEnvironment) -> Arc<AdminAuthStore> {
    Arc::new(Store::new(AuthState::default(), AdminAuthReducer::new(), environment))
}

/// Guard sharing the store's session backend, clock and policy.
#[must_use]
pub fn build_guard(environment: &AuthEnvironment) -> AdminGuard {
    AdminGuard::new(
        environment.config.policy,
        Arc::clone(&environment.sessions),
        Arc::clone(&environment.clock),
    )
}
