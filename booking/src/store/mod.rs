//! Persistence of events and reservations.
//!
//! Reducers and handlers talk to the repositories through `Arc<dyn ...>`, so
//! the same code runs against Postgres in production and against
//! [`InMemoryStore`] in tests and local runs.

use crate::types::{
    Event, EventDraft, EventId, NewReservation, Reservation, ReservationId, ReservationStatus,
};
use async_trait::async_trait;
use thiserror::Error;

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PostgresStore;

/// Repository errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// The addressed row does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of row (`event`, `reservation`)
        entity: &'static str,
        /// Requested identifier
        id: String,
    },

    /// The write conflicts with existing rows.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The value cannot be stored (e.g. outside the column range).
    #[error("Invalid value: {0}")]
    Invalid(String),

    /// The database rejected or failed the query.
    #[error("Database error: {0}")]
    Database(String),

    /// A stored row could not be turned into a domain value.
    #[error("Invalid stored data: {0}")]
    Decode(String),
}

impl RepositoryError {
    /// Shorthand for a missing event.
    #[must_use]
    pub fn event_not_found(id: EventId) -> Self {
        Self::NotFound {
            entity: "event",
            id: id.to_string(),
        }
    }

    /// Shorthand for a missing reservation.
    #[must_use]
    pub fn reservation_not_found(id: ReservationId) -> Self {
        Self::NotFound {
            entity: "reservation",
            id: id.to_string(),
        }
    }
}

/// Result type for repository operations
pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Event storage.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// All events, ordered by date then time, ascending.
    async fn list_events(&self) -> Result<Vec<Event>>;

    /// One event.
    async fn find_event(&self, id: EventId) -> Result<Option<Event>>;

    /// Insert a new event and return it.
    async fn insert_event(&self, draft: EventDraft) -> Result<Event>;

    /// Overwrite every editable field of event `id`.
    ///
    /// Fails with [`RepositoryError::NotFound`] when the event does not exist.
    async fn update_event(&self, id: EventId, draft: EventDraft) -> Result<Event>;

    /// Delete event `id`.
    ///
    /// Fails with [`RepositoryError::NotFound`] when the event does not exist
    /// and with [`RepositoryError::Conflict`] when reservations reference it.
    async fn delete_event(&self, id: EventId) -> Result<()>;

    /// Cheap connectivity check for readiness probes.
    async fn ping(&self) -> Result<()>;
}

/// Reservation storage.
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Insert a booking with status `pending` and return the stored row.
    ///
    /// Fails with [`RepositoryError::NotFound`] when the event does not exist.
    async fn insert_reservation(&self, reservation: NewReservation) -> Result<Reservation>;

    /// All reservations, newest first.
    async fn list_reservations(&self) -> Result<Vec<Reservation>>;

    /// One reservation.
    async fn find_reservation(&self, id: ReservationId) -> Result<Option<Reservation>>;

    /// Change the moderation status of reservation `id`. Nothing else is touched.
    async fn set_reservation_status(
        &self,
        id: ReservationId,
        status: ReservationStatus,
    ) -> Result<Reservation>;
}
