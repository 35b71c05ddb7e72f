//! Billetterie - event ticketing backend
//!
//! Visitors browse events and book tickets through a three-step checkout
//! wizard; an administrator manages events and moderates reservations from a
//! dashboard. Built on the billetterie runtime: each interactive surface is a
//! reducer driven by a [`Store`](billetterie_runtime::Store).
//!
//! # Architecture
//!
//! ```text
//!   HTTP (axum)                       Stores                      Side effects
//! ┌──────────────┐   actions   ┌──────────────────┐   effects  ┌──────────────────┐
//! │ /api/events  │────────────▶│  CheckoutStore   │───────────▶│ Reservations     │
//! │ /api/checkout│             │  (wizard state)  │            │ Confirmation mail│
//! ├──────────────┤             ├──────────────────┤            ├──────────────────┤
//! │ /api/admin   │────────────▶│  DashboardStore  │───────────▶│ Events CRUD      │
//! │ (Bearer)     │             │  AdminAuthStore  │            │ Admin sessions   │
//! └──────────────┘             └──────────────────┘            └──────────────────┘
//!                                        │
//!                         PostgreSQL or in-memory repositories
//! ```
//!
//! # Modules
//!
//! - [`types`]: events, tickets, money and reservations
//! - [`checkout`]: the visitor wizard (tickets, contact, review, submit)
//! - [`admin`]: dashboard reducer and the event form
//! - [`store`]: repository traits with `PostgreSQL` and in-memory backends
//! - [`geocoding`] and [`map`]: address lookup and map views
//! - [`auth`], [`api`] and [`server`]: the HTTP surface
//! - [`app`] and [`config`]: bootstrap from the environment

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod admin;
pub mod api;
pub mod app;
pub mod auth;
pub mod checkout;
pub mod config;
pub mod geocoding;
pub mod map;
pub mod metrics;
pub mod server;
pub mod store;
pub mod types;

pub use admin::{DashboardAction, DashboardReducer, DashboardStore};
pub use app::{build_state, serve, AppSettings, BootstrapError, Services};
pub use checkout::{CheckoutAction, CheckoutReducer, CheckoutStore};
pub use config::Config;
pub use server::{build_router, AppState};
pub use types::*;
