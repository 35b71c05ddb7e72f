//! Application state for the billetterie HTTP server.
//!
//! Contains all shared resources needed by HTTP handlers:
//! - Repositories (for plain reads)
//! - Checkout, dashboard and admin auth stores (for commands)
//! - The admin guard
//! - The geocoder and map settings

use crate::admin::DashboardStore;
use crate::auth::setup::AdminAuthStore;
use crate::checkout::CheckoutStore;
use crate::geocoding::Geocoder;
use crate::map::MapConfig;
use crate::store::{EventRepository, ReservationRepository};
use axum::extract::FromRef;
use billetterie_auth::AdminGuard;
use std::sync::Arc;
use std::time::Duration;

/// Application state shared across all HTTP handlers.
///
/// Cloned (cheaply via Arc) for each request.
#[derive(Clone)]
pub struct AppState {
    /// Event storage, read directly by the public pages
    pub events: Arc<dyn EventRepository>,

    /// Reservation storage
    pub reservations: Arc<dyn ReservationRepository>,

    /// Visitor checkouts
    pub checkout: Arc<CheckoutStore>,

    /// Admin dashboard
    pub dashboard: Arc<DashboardStore>,

    /// Admin login and logout
    pub auth: Arc<AdminAuthStore>,

    /// Resolves bearer tokens on admin routes
    pub guard: AdminGuard,

    /// Address lookup for the event form
    pub geocoder: Arc<dyn Geocoder>,

    /// Tile settings for map views
    pub map: Arc<MapConfig>,

    /// How long a handler waits for its reducer's answer
    pub request_timeout: Duration,
}

impl AppState {
    /// Shut every store down, waiting up to `timeout` each for in-flight effects.
    pub async fn shutdown(&self, timeout: Duration) {
        let (checkout, dashboard, auth) = tokio::join!(
            self.checkout.shutdown(timeout),
            self.dashboard.shutdown(timeout),
            self.auth.shutdown(timeout),
        );

        for (store, result) in [("checkout", checkout), ("dashboard", dashboard), ("auth", auth)] {
            if let Err(error) = result {
                tracing::warn!(store, error = %error, "Store did not drain before shutdown");
            }
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("guard", &self.guard)
            .field("geocoder", &self.geocoder.name())
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

impl FromRef<AppState> for Arc<CheckoutStore> {
    fn from_ref(app_state: &AppState) -> Self {
        Arc::clone(&app_state.checkout)
    }
}

impl FromRef<AppState> for Arc<DashboardStore> {
    fn from_ref(app_state: &AppState) -> Self {
        Arc::clone(&app_state.dashboard)
    }
}

impl FromRef<AppState> for Arc<AdminAuthStore> {
    fn from_ref(app_state: &AppState) -> Self {
        Arc::clone(&app_state.auth)
    }
}
