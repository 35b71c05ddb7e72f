//! Admin dashboard endpoints. Every handler requires [`RequireAdmin`].
//!
//! - GET /api/admin/dashboard?tab= - Events and reservations
//! - POST /api/admin/events - Create an event from the form
//! - PUT /api/admin/events/:id - Update an event from the form
//! - DELETE /api/admin/events/:id?confirm=true - Delete an event
//! - POST /api/admin/reservations/:id/approve - Approve a pending reservation
//! - POST /api/admin/reservations/:id/reject - Reject a pending reservation
//! - POST /api/admin/geocode - Address to coordinates
//!
//! Mutations answer with the success notice and the re-fetched list.

use crate::admin::{DashboardAction, DashboardError, DashboardTab, EventForm, Notice};
use crate::auth::RequireAdmin;
use crate::geocoding::notices as geocoding_notices;
use crate::server::state::AppState;
use crate::types::{Coordinates, Event, EventId, Reservation, ReservationId, ReservationStatus};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use billetterie_web::{AppError, CorrelationId, WebResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Dashboard query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    /// Tab to select (`events` or `reservations`); keeps the current one when absent
    pub tab: Option<String>,
}

/// Dashboard contents.
#[derive(Debug, Serialize, Deserialize)]
pub struct DashboardResponse {
    /// Admin the dashboard is shown to
    pub admin: String,
    /// Selected tab
    pub active_tab: DashboardTab,
    /// Events, date ascending
    pub events: Vec<Event>,
    /// Reservations, newest first
    pub reservations: Vec<Reservation>,
}

/// Result of an event mutation.
#[derive(Debug, Serialize, Deserialize)]
pub struct EventMutationResponse {
    /// Success notice
    pub notice: Notice,
    /// Created or updated event, absent on delete
    pub event: Option<Event>,
    /// Re-fetched events, date ascending
    pub events: Vec<Event>,
}

/// Result of a moderation.
#[derive(Debug, Serialize, Deserialize)]
pub struct ModerationResponse {
    /// Success notice
    pub notice: Notice,
    /// Moderated reservation
    pub reservation: Reservation,
    /// Re-fetched reservations, newest first
    pub reservations: Vec<Reservation>,
}

/// Delete query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct DeleteQuery {
    /// Must be `true`; stands in for the confirmation prompt
    #[serde(default)]
    pub confirm: bool,
}

/// Geocoding request.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeocodeRequest {
    /// Address as typed in the event form
    pub address: String,
}

/// Geocoding result.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeocodeResponse {
    /// Success notice
    pub message: String,
    /// Latitude of the first match
    pub latitude: f64,
    /// Longitude of the first match
    pub longitude: f64,
}

impl From<Coordinates> for GeocodeResponse {
    fn from(coordinates: Coordinates) -> Self {
        Self {
            message: geocoding_notices::FOUND.to_string(),
            latitude: coordinates.latitude,
            longitude: coordinates.longitude,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Load the dashboard, optionally switching tab.
///
/// # Errors
///
/// - 401: guard refused the token
/// - 422: unknown tab
/// - 500: a list could not be loaded
pub async fn dashboard(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    RequireAdmin(session): RequireAdmin,
    Query(query): Query<DashboardQuery>,
) -> WebResult<Json<DashboardResponse>> {
    if let Some(tab) = query.tab {
        let tab: DashboardTab = tab.parse().map_err(AppError::validation)?;
        let mut handle = state
            .dashboard
            .send(DashboardAction::SelectTab {
                admin: session.email.clone(),
                tab,
            })
            .await?;
        handle.wait_with_timeout(state.request_timeout).await?;
    }

    let result = dispatch(&state, correlation_id, |request_id| DashboardAction::Load { request_id }).await?;

    match result {
        DashboardAction::Loaded {
            events, reservations, ..
        } => Ok(Json(DashboardResponse {
            active_tab: state.dashboard.state(|s| s.active_tab(&session.email)).await,
            admin: session.email,
            events,
            reservations,
        })),
        other => Err(unexpected(other)),
    }
}

/// Create an event from the form.
///
/// # Errors
///
/// - 401: guard refused the token
/// - 422: a field does not validate (nothing is written)
pub async fn create_event(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    RequireAdmin(session): RequireAdmin,
    Json(form): Json<EventForm>,
) -> WebResult<(StatusCode, Json<EventMutationResponse>)> {
    tracing::debug!(admin = %session.email, title = %form.title, "Create event requested");
    let result = dispatch(&state, correlation_id, |request_id| DashboardAction::CreateEvent { request_id, form }).await?;

    Ok((StatusCode::CREATED, Json(event_mutation(result)?)))
}

/// Overwrite event `id` from the form. Last write wins.
///
/// # Errors
///
/// - 401: guard refused the token
/// - 404: unknown event
/// - 422: a field does not validate (nothing is written)
pub async fn update_event(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    RequireAdmin(session): RequireAdmin,
    Path(id): Path<Uuid>,
    Json(form): Json<EventForm>,
) -> WebResult<Json<EventMutationResponse>> {
    tracing::debug!(admin = %session.email, event_id = %id, "Update event requested");
    let result = dispatch(&state, correlation_id, |request_id| DashboardAction::UpdateEvent {
        request_id,
        id: EventId::from_uuid(id),
        form,
    })
    .await?;

    Ok(Json(event_mutation(result)?))
}

/// Delete event `id`. Requires `?confirm=true`.
///
/// # Errors
///
/// - 401: guard refused the token
/// - 404: unknown event
/// - 409: the event has reservations
/// - 422: not confirmed (nothing is deleted)
pub async fn delete_event(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    RequireAdmin(session): RequireAdmin,
    Path(id): Path<Uuid>,
    Query(query): Query<DeleteQuery>,
) -> WebResult<Json<EventMutationResponse>> {
    tracing::debug!(admin = %session.email, event_id = %id, confirmed = query.confirm, "Delete event requested");
    let result = dispatch(&state, correlation_id, |request_id| DashboardAction::DeleteEvent {
        request_id,
        id: EventId::from_uuid(id),
        confirmed: query.confirm,
    })
    .await?;

    Ok(Json(event_mutation(result)?))
}

/// Approve pending reservation `id`.
///
/// # Errors
///
/// - 401: guard refused the token
/// - 404: unknown reservation
/// - 409: already approved or rejected
pub async fn approve_reservation(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    RequireAdmin(session): RequireAdmin,
    Path(id): Path<Uuid>,
) -> WebResult<Json<ModerationResponse>> {
    moderate(&state, correlation_id, &session.email, id, ReservationStatus::Approved).await
}

/// Reject pending reservation `id`.
///
/// # Errors
///
/// - 401: guard refused the token
/// - 404: unknown reservation
/// - 409: already approved or rejected
pub async fn reject_reservation(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    RequireAdmin(session): RequireAdmin,
    Path(id): Path<Uuid>,
) -> WebResult<Json<ModerationResponse>> {
    moderate(&state, correlation_id, &session.email, id, ReservationStatus::Rejected).await
}

/// Look an address up.
///
/// ```bash
/// curl -X POST http://localhost:8080/api/admin/geocode \
///   -H "Authorization: Bearer <token>" \
///   -H "Content-Type: application/json" \
///   -d '{"address": "10 rue de Rivoli, Paris"}'
/// ```
///
/// # Errors
///
/// - 401: guard refused the token
/// - 404: no match ("Adresse non trouvée")
/// - 422: blank address
/// - 502: lookup failed ("Erreur lors de la localisation de l'adresse")
pub async fn geocode_address(
    State(state): State<AppState>,
    RequireAdmin(_session): RequireAdmin,
    Json(request): Json<GeocodeRequest>,
) -> WebResult<Json<GeocodeResponse>> {
    let coordinates = state.geocoder.geocode(&request.address).await?;
    Ok(Json(coordinates.into()))
}

// ============================================================================
// Helpers
// ============================================================================

/// Send a dashboard command under a fresh request id and wait for its answer.
///
/// Results are matched on the nonce, never on the client-supplied correlation id.
async fn dispatch(
    state: &AppState,
    correlation_id: CorrelationId,
    command: impl FnOnce(Uuid) -> DashboardAction,
) -> Result<DashboardAction, AppError> {
    let request_id = Uuid::new_v4();
    tracing::debug!(correlation_id = %correlation_id.0, %request_id, "Dashboard command sent");

    let result = state
        .dashboard
        .send_and_wait_for(command(request_id), |a| a.is_result_for(request_id), state.request_timeout)
        .await?;

    match result {
        DashboardAction::MutationFailed { error, notice, .. } => Err(mutation_failed(error, &notice)),
        other => Ok(other),
    }
}

async fn moderate(
    state: &AppState,
    correlation_id: CorrelationId,
    admin: &str,
    id: Uuid,
    status: ReservationStatus,
) -> WebResult<Json<ModerationResponse>> {
    tracing::debug!(admin, reservation_id = %id, %status, "Moderation requested");
    let result = dispatch(state, correlation_id, |request_id| DashboardAction::SetReservationStatus {
        request_id,
        id: ReservationId::from_uuid(id),
        status,
    })
    .await?;

    match result {
        DashboardAction::ReservationsRefreshed {
            reservations,
            reservation,
            notice,
            ..
        } => Ok(Json(ModerationResponse {
            notice: Notice::success(notice),
            reservation: *reservation,
            reservations,
        })),
        other => Err(unexpected(other)),
    }
}

fn event_mutation(result: DashboardAction) -> Result<EventMutationResponse, AppError> {
    match result {
        DashboardAction::EventsRefreshed {
            events, event, notice, ..
        } => Ok(EventMutationResponse {
            notice: Notice::success(notice),
            event: event.map(|e| *e),
            events,
        }),
        other => Err(unexpected(other)),
    }
}

/// The error's status and code, with the dashboard notice in front of its message.
fn mutation_failed(error: DashboardError, notice: &str) -> AppError {
    let message = format!("{notice}: {error}");
    let base = AppError::from(error.clone());
    let mapped = AppError::new(base.status(), message, base.code().to_string());

    if base.status().is_server_error() {
        mapped.with_source(error.into())
    } else {
        mapped
    }
}

fn unexpected(action: DashboardAction) -> AppError {
    tracing::error!(?action, "Unexpected dashboard result");
    AppError::internal("Unexpected response from dashboard")
}
