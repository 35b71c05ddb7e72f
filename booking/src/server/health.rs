//! Readiness endpoint.
//!
//! Liveness (`/health`) comes from `billetterie-web`.

use super::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use billetterie_runtime::{HealthCheck, HealthReport};
use billetterie_web::handlers::readiness_response;

/// Readiness check endpoint.
///
/// - Each store is unhealthy once it is shutting down
/// - The database is unhealthy when the event repository ping fails
/// - Mail is degraded when confirmations are only logged or dropped
///
/// ```bash
/// curl http://localhost:8080/ready
/// ```
pub async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    let mut checks = vec![
        renamed(state.checkout.health(), "checkout_store"),
        renamed(state.dashboard.health(), "dashboard_store"),
        renamed(state.auth.health(), "auth_store"),
    ];

    checks.push(match state.events.ping().await {
        Ok(()) => HealthCheck::healthy("database"),
        Err(error) => {
            tracing::warn!(error = %error, "Readiness: database ping failed");
            HealthCheck::unhealthy("database", error.to_string())
        },
    });

    let notifier = state.checkout.environment().notifier.name();
    checks.push(match notifier {
        "console" | "disabled" => {
            HealthCheck::degraded("mail", format!("Confirmations are not delivered ({notifier} provider)"))
        },
        _ => HealthCheck::healthy("mail").with_metadata("provider", notifier),
    });

    readiness_response(HealthReport::new(checks))
}

fn renamed(mut check: HealthCheck, component: &str) -> HealthCheck {
    check.component = component.to_string();
    check
}
