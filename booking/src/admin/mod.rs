//! Admin dashboard: event management and reservation moderation.

pub mod form;
pub mod reducer;

pub use form::{EventForm, FormError};
pub use reducer::{
    notices, DashboardAction, DashboardEnvironment, DashboardError, DashboardReducer, DashboardState,
    DashboardStore, DashboardTab, Notice, NoticeLevel,
};
