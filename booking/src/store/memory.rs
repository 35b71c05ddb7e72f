//! In-memory repositories for tests and `STORAGE=memory` runs.

use super::{EventRepository, RepositoryError, ReservationRepository, Result};
use async_trait::async_trait;
use crate::types::{
    Event, EventDraft, EventId, NewReservation, Reservation, ReservationId, ReservationStatus,
};
use billetterie_core::environment::Clock;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Default)]
struct Tables {
    events: Vec<Event>,
    /// Insertion order, oldest first.
    reservations: Vec<Reservation>,
}

/// Events and reservations held in process memory.
///
/// One value implements both repositories so that deleting a booked event
/// is refused the way the database foreign key refuses it.
#[derive(Clone)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryStore {
    /// Create an empty store stamping rows with `clock`.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            tables: Arc::new(Mutex::new(Tables::default())),
            clock,
        }
    }

    /// Insert `event` as is. For seeding tests and demos.
    ///
    /// # Errors
    ///
    /// Returns error if the internal lock is poisoned.
    pub fn seed_event(&self, event: Event) -> Result<()> {
        self.lock()?.events.push(event);
        Ok(())
    }

    /// Number of stored reservations.
    #[must_use]
    pub fn reservation_count(&self) -> usize {
        self.lock().map(|t| t.reservations.len()).unwrap_or_default()
    }

    /// Number of stored events.
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.lock().map(|t| t.events.len()).unwrap_or_default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| RepositoryError::Database("Mutex lock failed".to_string()))
    }
}

impl std::fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStore")
            .field("events", &self.event_count())
            .field("reservations", &self.reservation_count())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl EventRepository for InMemoryStore {
    async fn list_events(&self) -> Result<Vec<Event>> {
        let mut events = self.lock()?.events.clone();
        events.sort_by(|a, b| (a.date, a.time).cmp(&(b.date, b.time)));
        Ok(events)
    }

    async fn find_event(&self, id: EventId) -> Result<Option<Event>> {
        Ok(self.lock()?.events.iter().find(|e| e.id == id).cloned())
    }

    async fn insert_event(&self, draft: EventDraft) -> Result<Event> {
        let event = Event::from_draft(EventId::new(), draft, self.clock.now());
        self.lock()?.events.push(event.clone());
        Ok(event)
    }

    async fn update_event(&self, id: EventId, draft: EventDraft) -> Result<Event> {
        let mut tables = self.lock()?;
        let slot = tables
            .events
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| RepositoryError::event_not_found(id))?;
        *slot = Event::from_draft(id, draft, slot.created_at);
        Ok(slot.clone())
    }

    async fn delete_event(&self, id: EventId) -> Result<()> {
        let mut tables = self.lock()?;
        let position = tables
            .events
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| RepositoryError::event_not_found(id))?;
        if tables.reservations.iter().any(|r| r.event_id == id) {
            return Err(RepositoryError::Conflict(format!("event {id} has reservations")));
        }
        tables.events.remove(position);
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        self.lock().map(|_| ())
    }
}

#[async_trait]
impl ReservationRepository for InMemoryStore {
    async fn insert_reservation(&self, reservation: NewReservation) -> Result<Reservation> {
        let mut tables = self.lock()?;
        if !tables.events.iter().any(|e| e.id == reservation.event_id) {
            return Err(RepositoryError::event_not_found(reservation.event_id));
        }
        let stored = reservation.into_reservation(ReservationId::new(), self.clock.now());
        tables.reservations.push(stored.clone());
        Ok(stored)
    }

    async fn list_reservations(&self) -> Result<Vec<Reservation>> {
        // Newest first; equal timestamps keep reverse insertion order.
        let mut reservations: Vec<Reservation> =
            self.lock()?.reservations.iter().rev().cloned().collect();
        reservations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reservations)
    }

    async fn find_reservation(&self, id: ReservationId) -> Result<Option<Reservation>> {
        Ok(self.lock()?.reservations.iter().find(|r| r.id == id).cloned())
    }

    async fn set_reservation_status(
        &self,
        id: ReservationId,
        status: ReservationStatus,
    ) -> Result<Reservation> {
        let mut tables = self.lock()?;
        let reservation = tables
            .reservations
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| RepositoryError::reservation_not_found(id))?;
        reservation.status = status;
        Ok(reservation.clone())
    }
}
