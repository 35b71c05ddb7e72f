//! Admin authentication for billetterie.
//!
//! Wires `billetterie-auth` into the HTTP server:
//! - Environment, store and guard setup
//! - The [`RequireAdmin`](middleware::RequireAdmin) extractor
//! - Login, logout and session handlers

pub mod handlers;
pub mod middleware;
pub mod setup;

pub use middleware::RequireAdmin;
pub use setup::{build_auth_store, build_guard, AdminAuthStore};
