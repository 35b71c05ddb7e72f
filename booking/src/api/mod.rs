//! HTTP API handlers, organized by audience:
//! - Events: public listing, detail and maps
//! - Checkout: the visitor's ticket wizard and confirmation
//! - Admin: dashboard, event CRUD, moderation and geocoding
//!
//! Domain errors become [`AppError`] here, so handlers can use `?`.

pub mod admin;
pub mod checkout;
pub mod events;

use crate::admin::DashboardError;
use crate::checkout::CheckoutError;
use crate::geocoding::GeocodeError;
use crate::store::RepositoryError;
use axum::http::StatusCode;
use billetterie_web::AppError;

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => Self::not_found(entity, id),
            RepositoryError::Conflict(message) => Self::conflict(message),
            RepositoryError::Invalid(message) => Self::validation(message),
            RepositoryError::Database(_) | RepositoryError::Decode(_) => {
                Self::internal("Storage failure").with_source(err.into())
            },
        }
    }
}

impl From<CheckoutError> for AppError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::NotFound => Self::new(StatusCode::NOT_FOUND, err.to_string(), "NOT_FOUND".to_string()),
            CheckoutError::SubmissionInFlight => Self::conflict(err.to_string()),
            CheckoutError::SubmissionFailed(_) => {
                Self::internal("Erreur lors de la réservation").with_source(err.into())
            },
            CheckoutError::TicketNotOffered(_)
            | CheckoutError::TooManyTickets { .. }
            | CheckoutError::NoTickets
            | CheckoutError::MissingContact(_)
            | CheckoutError::InvalidStep { .. } => Self::validation(err.to_string()),
        }
    }
}

impl From<DashboardError> for AppError {
    fn from(err: DashboardError) -> Self {
        match err {
            DashboardError::Form(_) | DashboardError::ConfirmationRequired | DashboardError::InvalidStatus(_) => {
                Self::validation(err.to_string())
            },
            DashboardError::AlreadyModerated { .. } => Self::conflict(err.to_string()),
            DashboardError::Repository(inner) => inner.into(),
        }
    }
}

impl From<GeocodeError> for AppError {
    fn from(err: GeocodeError) -> Self {
        match err {
            GeocodeError::EmptyAddress => Self::validation(err.to_string()),
            GeocodeError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, err.notice().to_string(), "NOT_FOUND".to_string()),
            GeocodeError::Transport(_) | GeocodeError::Decode(_) => {
                Self::bad_gateway(err.notice()).with_source(err.into())
            },
        }
    }
}
