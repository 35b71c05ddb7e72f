//! Checkout wizard endpoints.
//!
//! - POST /api/events/:id/checkout - Start a checkout
//! - GET /api/checkout/:checkout_id - Wizard snapshot
//! - POST /api/checkout/:checkout_id/tickets - Adjust a ticket count
//! - PUT /api/checkout/:checkout_id/contact - Set contact details
//! - POST /api/checkout/:checkout_id/next - Advance
//! - POST /api/checkout/:checkout_id/back - Go back
//! - POST /api/checkout/:checkout_id/submit - Store the reservation
//! - DELETE /api/checkout/:checkout_id - Abandon
//! - GET /api/confirmation/:checkout_id - Confirmation, or the fallback
//!
//! Wizard commands answer with the snapshot after the command was reduced.
//! A refused command answers with its error; the wizard keeps its step and data.

use super::events::find_event;
use crate::checkout::{
    CheckoutAction, CheckoutError, CheckoutSession, Confirmation, TicketLine, WizardStep,
};
use crate::server::state::AppState;
use crate::types::{CheckoutId, ContactDetails, EventId, Money, TicketKind};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use billetterie_web::{AppError, WebResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Shown once a reservation is stored.
pub const BOOKING_CONFIRMED: &str = "Réservation confirmée !";

/// Shown when the confirmation is opened without a completed checkout.
pub const NOT_ACCESSIBLE_DIRECTLY: &str = "Page non accessible directement";

// ============================================================================
// Request/Response Types
// ============================================================================

/// Ticket adjustment request.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AdjustTicketsRequest {
    /// `standard` or `vip`
    pub kind: TicketKind,
    /// Signed change, e.g. `1` or `-1`
    pub delta: i32,
}

/// Wizard snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutResponse {
    /// Checkout id, used in every following request
    pub checkout_id: CheckoutId,
    /// Booked event
    pub event_id: EventId,
    /// Event title
    pub event_title: String,
    /// Current step
    pub step: WizardStep,
    /// Current step number (1 to 3, 4 once submitted)
    pub step_number: u8,
    /// Ticket selection, one line per ticket type on sale
    pub lines: Vec<TicketLine>,
    /// Number of selected tickets
    pub total_quantity: u32,
    /// Amount due
    pub total: Money,
    /// Contact details as entered
    pub contact: ContactDetails,
    /// Whether `next` would be accepted
    pub can_advance: bool,
    /// A submission is running
    pub in_flight: bool,
    /// Stored reservation summary, once submitted
    pub confirmation: Option<Confirmation>,
}

impl CheckoutResponse {
    fn new(checkout_id: CheckoutId, session: &CheckoutSession) -> Self {
        let wizard = &session.wizard;
        Self {
            checkout_id,
            event_id: wizard.event().id,
            event_title: wizard.event().title.clone(),
            step: wizard.step(),
            step_number: wizard.step().number(),
            lines: wizard.lines(),
            total_quantity: wizard.total_quantity(),
            total: wizard.total(),
            contact: wizard.contact().clone(),
            can_advance: wizard.can_advance(),
            in_flight: session.in_flight,
            confirmation: session.confirmation.clone(),
        }
    }
}

/// Successful submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    /// Success notice
    pub message: String,
    /// Stored reservation summary
    pub confirmation: Confirmation,
}

/// Body of the confirmation fallback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmationFallback {
    /// Fallback notice
    pub message: String,
    /// Where the visitor should go instead
    pub home: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// Start a checkout for event `id`.
///
/// ```bash
/// curl -X POST http://localhost:8080/api/events/<event_id>/checkout
/// ```
///
/// # Errors
///
/// - 404: unknown event
pub async fn start_checkout(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<(StatusCode, Json<CheckoutResponse>)> {
    let event = find_event(&state, EventId::from_uuid(id)).await?;
    let checkout_id = CheckoutId::new();

    apply(
        &state,
        CheckoutAction::Start {
            checkout_id,
            event: Box::new(event),
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(snapshot(&state, checkout_id).await?)))
}

/// Wizard snapshot.
///
/// # Errors
///
/// - 404: unknown checkout
pub async fn get_checkout(State(state): State<AppState>, Path(id): Path<Uuid>) -> WebResult<Json<CheckoutResponse>> {
    Ok(Json(snapshot(&state, CheckoutId::from_uuid(id)).await?))
}

/// Change one ticket count. Counts never go below zero.
///
/// # Errors
///
/// - 404: unknown checkout
/// - 422: ticket type not on sale, count above the per-kind limit, or not on the ticket step
pub async fn adjust_tickets(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AdjustTicketsRequest>,
) -> WebResult<Json<CheckoutResponse>> {
    let checkout_id = CheckoutId::from_uuid(id);
    run_command(&state, checkout_id, |request_id| CheckoutAction::AdjustTickets {
        checkout_id,
        request_id,
        kind: request.kind,
        delta: request.delta,
    })
    .await?;
    Ok(Json(snapshot(&state, checkout_id).await?))
}

/// Replace the contact details.
///
/// # Errors
///
/// - 404: unknown checkout
/// - 422: past the contact step
pub async fn update_contact(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(contact): Json<ContactDetails>,
) -> WebResult<Json<CheckoutResponse>> {
    let checkout_id = CheckoutId::from_uuid(id);
    run_command(&state, checkout_id, |request_id| CheckoutAction::UpdateContact {
        checkout_id,
        request_id,
        contact,
    })
    .await?;
    Ok(Json(snapshot(&state, checkout_id).await?))
}

/// Advance one step.
///
/// # Errors
///
/// - 404: unknown checkout
/// - 422: no ticket selected, blank required contact field, or already on review
pub async fn next_step(State(state): State<AppState>, Path(id): Path<Uuid>) -> WebResult<Json<CheckoutResponse>> {
    let checkout_id = CheckoutId::from_uuid(id);
    run_command(&state, checkout_id, |request_id| CheckoutAction::Next {
        checkout_id,
        request_id,
    })
    .await?;
    Ok(Json(snapshot(&state, checkout_id).await?))
}

/// Go back one step. No-op on the first step.
///
/// # Errors
///
/// - 404: unknown checkout
/// - 422: already submitted
pub async fn previous_step(State(state): State<AppState>, Path(id): Path<Uuid>) -> WebResult<Json<CheckoutResponse>> {
    let checkout_id = CheckoutId::from_uuid(id);
    run_command(&state, checkout_id, |request_id| CheckoutAction::Back {
        checkout_id,
        request_id,
    })
    .await?;
    Ok(Json(snapshot(&state, checkout_id).await?))
}

/// Store the reservation and send the confirmation email.
///
/// # Errors
///
/// - 404: unknown checkout
/// - 409: a submission is already running
/// - 422: not on the review step
/// - 500: the reservation could not be stored (the wizard stays on review)
/// - 408: no answer within the request timeout
pub async fn submit_checkout(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<(StatusCode, Json<SubmitResponse>)> {
    let checkout_id = CheckoutId::from_uuid(id);

    let result = send_command(&state, checkout_id, |request_id| CheckoutAction::Submit {
        checkout_id,
        request_id,
    })
    .await?;

    match result {
        CheckoutAction::Submitted { confirmation, .. } => Ok((
            StatusCode::CREATED,
            Json(SubmitResponse {
                message: BOOKING_CONFIRMED.to_string(),
                confirmation: *confirmation,
            }),
        )),
        CheckoutAction::SubmitFailed { reason, .. } => Err(CheckoutError::SubmissionFailed(reason).into()),
        CheckoutAction::Rejected { reason, .. } => Err(reason.into()),
        _ => Err(AppError::internal("Unexpected response from checkout")),
    }
}

/// Drop the checkout. Unknown ids are accepted.
///
/// # Errors
///
/// - 503: shutting down
pub async fn abandon_checkout(State(state): State<AppState>, Path(id): Path<Uuid>) -> WebResult<StatusCode> {
    apply(
        &state,
        CheckoutAction::Abandon {
            checkout_id: CheckoutId::from_uuid(id),
        },
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// The confirmation of a submitted checkout.
///
/// Without one (unknown id, not submitted yet, restarted process) the
/// fallback body is returned with 404.
pub async fn get_confirmation(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let checkout_id = CheckoutId::from_uuid(id);
    let confirmation = state.checkout.state(|s| s.confirmation(&checkout_id).cloned()).await;

    match confirmation {
        Some(confirmation) => Json(SubmitResponse {
            message: BOOKING_CONFIRMED.to_string(),
            confirmation,
        })
        .into_response(),
        None => {
            tracing::debug!(%checkout_id, "Confirmation requested without a completed checkout");
            (
                StatusCode::NOT_FOUND,
                Json(ConfirmationFallback {
                    message: NOT_ACCESSIBLE_DIRECTLY.to_string(),
                    home: "/".to_string(),
                }),
            )
                .into_response()
        },
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Send a lifecycle action (`Start`, `Abandon`) and wait until it is reduced.
async fn apply(state: &AppState, action: CheckoutAction) -> Result<(), AppError> {
    let mut handle = state.checkout.send(action).await?;
    handle.wait_with_timeout(state.request_timeout).await?;
    Ok(())
}

/// Send a wizard command under a fresh request id and return its result.
async fn send_command(
    state: &AppState,
    checkout_id: CheckoutId,
    command: impl FnOnce(Uuid) -> CheckoutAction,
) -> Result<CheckoutAction, AppError> {
    let request_id = Uuid::new_v4();
    tracing::debug!(%checkout_id, %request_id, "Checkout command sent");
    let result = state
        .checkout
        .send_and_wait_for(command(request_id), |a| a.is_result_for(request_id), state.request_timeout)
        .await?;
    Ok(result)
}

/// Send a wizard command and map its refusal to an error.
async fn run_command(
    state: &AppState,
    checkout_id: CheckoutId,
    command: impl FnOnce(Uuid) -> CheckoutAction,
) -> Result<(), AppError> {
    match send_command(state, checkout_id, command).await? {
        CheckoutAction::Accepted { .. } => Ok(()),
        CheckoutAction::Rejected { reason, .. } => Err(reason.into()),
        _ => Err(AppError::internal("Unexpected response from checkout")),
    }
}

async fn snapshot(state: &AppState, checkout_id: CheckoutId) -> Result<CheckoutResponse, AppError> {
    state
        .checkout
        .state(|s| s.session(&checkout_id).map(|session| CheckoutResponse::new(checkout_id, session)))
        .await
        .ok_or_else(|| CheckoutError::NotFound.into())
}
