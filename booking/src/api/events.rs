//! Public event endpoints.
//!
//! - GET /api/events - All events, date ascending
//! - GET /api/events/:id - Event detail with its ticket catalog
//! - GET /api/events/:id/map - Map of one event
//! - GET /api/map - Map of every located event
//!
//! Every request reads the repository; nothing is cached.

use crate::map::MapView;
use crate::server::state::AppState;
use crate::store::RepositoryError;
use crate::types::{Event, EventId, TicketOption};
use axum::{
    extract::{Path, State},
    Json,
};
use billetterie_web::WebResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Event list response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListEventsResponse {
    /// Events, date ascending
    pub events: Vec<Event>,
    /// Number of events
    pub total: usize,
}

/// Event detail response.
#[derive(Debug, Serialize, Deserialize)]
pub struct EventResponse {
    /// The event
    #[serde(flatten)]
    pub event: Event,
    /// Ticket types on sale, in display order
    pub tickets: Vec<TicketOption>,
}

impl From<Event> for EventResponse {
    fn from(event: Event) -> Self {
        let tickets = event.catalog().options().to_vec();
        Self { event, tickets }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// List events.
///
/// ```bash
/// curl http://localhost:8080/api/events
/// ```
///
/// # Errors
///
/// - 500: repository failure
pub async fn list_events(State(state): State<AppState>) -> WebResult<Json<ListEventsResponse>> {
    let events = state.events.list_events().await?;
    Ok(Json(ListEventsResponse {
        total: events.len(),
        events,
    }))
}

/// Event detail.
///
/// # Errors
///
/// - 404: unknown event
pub async fn get_event(State(state): State<AppState>, Path(id): Path<Uuid>) -> WebResult<Json<EventResponse>> {
    let event = find_event(&state, EventId::from_uuid(id)).await?;
    Ok(Json(event.into()))
}

/// Map centered on one event.
///
/// # Errors
///
/// - 404: unknown event
pub async fn event_map(State(state): State<AppState>, Path(id): Path<Uuid>) -> WebResult<Json<MapView>> {
    let event = find_event(&state, EventId::from_uuid(id)).await?;
    Ok(Json(MapView::for_event(&state.map, &event)))
}

/// Map of all events.
///
/// # Errors
///
/// - 500: repository failure
pub async fn events_map(State(state): State<AppState>) -> WebResult<Json<MapView>> {
    let events = state.events.list_events().await?;
    Ok(Json(MapView::for_events(&state.map, &events)))
}

pub(crate) async fn find_event(state: &AppState, id: EventId) -> Result<Event, RepositoryError> {
    state
        .events
        .find_event(id)
        .await?
        .ok_or_else(|| RepositoryError::event_not_found(id))
}
