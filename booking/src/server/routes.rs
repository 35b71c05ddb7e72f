//! Router configuration for billetterie.
//!
//! Builds the complete Axum router with all endpoints.

use super::health::readiness_check;
use super::state::AppState;
use crate::api::{admin, checkout, events};
use crate::auth::handlers as auth;
use axum::{
    routing::{get, post, put},
    Router,
};
use billetterie_web::handlers::health_check;
use billetterie_web::{correlation_id_layer, cors_layer, trace_layer};

/// Build the complete Axum router.
///
/// - Health checks
/// - Public event pages and maps
/// - Checkout wizard and confirmation
/// - Admin login and dashboard (guarded by [`RequireAdmin`](crate::auth::RequireAdmin))
pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/events", get(events::list_events))
        .route("/events/:id", get(events::get_event))
        .route("/events/:id/map", get(events::event_map))
        .route("/map", get(events::events_map))
        .route("/events/:id/checkout", post(checkout::start_checkout))
        .route(
            "/checkout/:checkout_id",
            get(checkout::get_checkout).delete(checkout::abandon_checkout),
        )
        .route("/checkout/:checkout_id/tickets", post(checkout::adjust_tickets))
        .route("/checkout/:checkout_id/contact", put(checkout::update_contact))
        .route("/checkout/:checkout_id/next", post(checkout::next_step))
        .route("/checkout/:checkout_id/back", post(checkout::previous_step))
        .route("/checkout/:checkout_id/submit", post(checkout::submit_checkout))
        .route("/confirmation/:checkout_id", get(checkout::get_confirmation));

    let admin_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/session", get(auth::current_session))
        .route("/dashboard", get(admin::dashboard))
        .route("/events", post(admin::create_event))
        .route("/events/:id", put(admin::update_event).delete(admin::delete_event))
        .route("/reservations/:id/approve", post(admin::approve_reservation))
        .route("/reservations/:id/reject", post(admin::reject_reservation))
        .route("/geocode", post(admin::geocode_address));

    Router::new()
        // Health checks (no authentication)
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .nest("/api", public_routes.nest("/admin", admin_routes))
        .layer(trace_layer())
        .layer(correlation_id_layer())
        .layer(cors_layer())
        .with_state(state)
}
