//! HTTP server module for billetterie.
//!
//! - Application state management
//! - Readiness endpoint
//! - Router configuration

pub mod health;
pub mod routes;
pub mod state;

pub use routes::build_router;
pub use state::AppState;
