//! # Billetterie Admin Authentication
//!
//! Admin login, sessions and the guard protecting admin routes.
//!
//! ## Architecture
//!
//! Login and logout are a reducer ([`AdminAuthReducer`]); credential checks
//! and session storage are providers injected through [`AuthEnvironment`]:
//!
//! ```text
//! Login → AdminAuthReducer → Effect (AdminDirectory + SessionStore) → LoginSucceeded | LoginFailed
//! ```
//!
//! Admin routes run the [`AdminGuard`] once per request and receive the
//! resulting [`AdminSession`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use billetterie_auth::*;
//!
//! let guard = AdminGuard::new(GuardPolicy::Verified, sessions, clock);
//! let session = guard.authorize(&bearer_token).await?;
//! tracing::info!(email = %session.email, "Admin request");
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

pub mod actions;
pub mod config;
pub mod environment;
pub mod error;
pub mod guard;
pub mod password;
pub mod providers;
pub mod reducers;
pub mod state;
pub mod stores;
pub mod token;

pub use actions::AuthAction;
pub use config::{AuthConfig, GuardPolicy};
pub use environment::AuthEnvironment;
pub use error::{AuthError, Result};
pub use guard::AdminGuard;
pub use providers::{AdminDirectory, SessionStore};
pub use reducers::AdminAuthReducer;
pub use state::{AdminSession, AuthState};
pub use token::{generate_session_token, legacy_token};
