//! HTTP handlers shared by every billetterie service.

pub mod health;

pub use health::{health_check, readiness_response};
