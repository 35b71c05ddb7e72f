//! Storage backends for the admin directory and sessions.

pub mod memory;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use memory::{InMemoryAdminDirectory, InMemorySessionStore};
