//! Admin dashboard reducer.
//!
//! Every mutation follows the same path: write, notice, full re-fetch of the
//! affected list. Results carry the command's request id, a nonce issued by
//! the HTTP handler that sent it, so that handler waits for its own answer.

use super::form::{EventForm, FormError};
use crate::metrics;
use crate::store::{EventRepository, RepositoryError, ReservationRepository};
use crate::types::{Event, EventDraft, EventId, Reservation, ReservationId, ReservationStatus};
use billetterie_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
use billetterie_runtime::Store;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Dashboard notices, in the language of the admin UI.
pub mod notices {
    /// Event inserted.
    pub const EVENT_CREATED: &str = "Événement créé avec succès";
    /// Event updated.
    pub const EVENT_UPDATED: &str = "Événement modifié avec succès";
    /// Insert or update failed.
    pub const SAVE_FAILED: &str = "Erreur lors de la sauvegarde";
    /// Event deleted.
    pub const EVENT_DELETED: &str = "Événement supprimé avec succès";
    /// Delete failed.
    pub const DELETE_FAILED: &str = "Erreur lors de la suppression de l'événement";
    /// Delete sent without confirmation.
    pub const CONFIRM_DELETE: &str = "Êtes-vous sûr de vouloir supprimer cet événement ?";
    /// Reservation moderated.
    pub const STATUS_UPDATED: &str = "Statut mis à jour avec succès";
    /// Moderation failed.
    pub const STATUS_FAILED: &str = "Erreur lors de la mise à jour du statut";
    /// Event list could not be loaded.
    pub const EVENTS_LOAD_FAILED: &str = "Erreur lors du chargement des événements";
    /// Reservation list could not be loaded.
    pub const RESERVATIONS_LOAD_FAILED: &str = "Erreur lors du chargement des réservations";
}

// ============================================================================
// State
// ============================================================================

/// Dashboard tabs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DashboardTab {
    /// Event management
    #[default]
    Events,
    /// Reservation moderation
    Reservations,
}

impl FromStr for DashboardTab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "events" => Ok(Self::Events),
            "reservations" => Ok(Self::Reservations),
            other => Err(format!("unknown tab: {other}")),
        }
    }
}

/// Notice severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    /// Operation succeeded
    Success,
    /// Operation failed
    Error,
}

/// Toast shown after an operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    /// Severity
    pub level: NoticeLevel,
    /// Message
    pub message: String,
}

impl Notice {
    /// Success notice.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    /// Error notice.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Dashboard state: the two lists as last fetched.
#[derive(Clone, Debug, Default)]
pub struct DashboardState {
    /// Events, date ascending
    pub events: Vec<Event>,
    /// Reservations, newest first
    pub reservations: Vec<Reservation>,
    /// Selected tab per admin email
    pub active_tabs: HashMap<String, DashboardTab>,
    /// Last notice shown
    pub last_notice: Option<Notice>,
    /// A load is running
    pub loading: bool,
}

impl DashboardState {
    /// Tab selected by `admin`, events until they pick one.
    #[must_use]
    pub fn active_tab(&self, admin: &str) -> DashboardTab {
        self.active_tabs.get(admin).copied().unwrap_or_default()
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Why a dashboard command failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DashboardError {
    /// The event form does not validate.
    #[error("Invalid event form: {0}")]
    Form(#[from] FormError),

    /// Delete sent without `confirmed`.
    #[error("Deletion must be confirmed")]
    ConfirmationRequired,

    /// Moderation target must be approved or rejected.
    #[error("Cannot set a reservation back to {0}")]
    InvalidStatus(ReservationStatus),

    /// Only pending reservations are moderated.
    #[error("Reservation {id} is already {status}")]
    AlreadyModerated {
        /// Reservation
        id: ReservationId,
        /// Current status
        status: ReservationStatus,
    },

    /// Repository failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

// ============================================================================
// Actions
// ============================================================================

/// Dashboard actions.
#[derive(Clone, Debug, PartialEq)]
pub enum DashboardAction {
    // Commands
    /// Fetch both lists
    Load {
        /// Server-issued request id
        request_id: Uuid,
    },
    /// Create an event from the form
    CreateEvent {
        /// Server-issued request id
        request_id: Uuid,
        /// Form as typed
        form: EventForm,
    },
    /// Overwrite event `id` from the form
    UpdateEvent {
        /// Server-issued request id
        request_id: Uuid,
        /// Event to update
        id: EventId,
        /// Form as typed
        form: EventForm,
    },
    /// Delete event `id`
    DeleteEvent {
        /// Server-issued request id
        request_id: Uuid,
        /// Event to delete
        id: EventId,
        /// The admin confirmed the prompt
        confirmed: bool,
    },
    /// Approve or reject reservation `id`
    SetReservationStatus {
        /// Server-issued request id
        request_id: Uuid,
        /// Reservation to moderate
        id: ReservationId,
        /// `approved` or `rejected`
        status: ReservationStatus,
    },
    /// Switch tab for one admin
    SelectTab {
        /// Admin email from the session
        admin: String,
        /// New tab
        tab: DashboardTab,
    },

    // Results
    /// Both lists fetched
    Loaded {
        /// Server-issued request id
        request_id: Uuid,
        /// Events, date ascending
        events: Vec<Event>,
        /// Reservations, newest first
        reservations: Vec<Reservation>,
    },
    /// Event mutation done and list re-fetched
    EventsRefreshed {
        /// Server-issued request id
        request_id: Uuid,
        /// Events, date ascending
        events: Vec<Event>,
        /// Created or updated event (none on delete)
        event: Option<Box<Event>>,
        /// Success notice
        notice: String,
    },
    /// Moderation done and list re-fetched
    ReservationsRefreshed {
        /// Server-issued request id
        request_id: Uuid,
        /// Reservations, newest first
        reservations: Vec<Reservation>,
        /// Moderated reservation
        reservation: Box<Reservation>,
        /// Success notice
        notice: String,
    },
    /// Command failed, nothing or only the write happened
    MutationFailed {
        /// Server-issued request id
        request_id: Uuid,
        /// Cause
        error: DashboardError,
        /// Error notice
        notice: String,
    },
}

impl DashboardAction {
    /// Request id, `None` for tab switches.
    #[must_use]
    pub const fn request_id(&self) -> Option<Uuid> {
        match self {
            Self::Load { request_id }
            | Self::CreateEvent { request_id, .. }
            | Self::UpdateEvent { request_id, .. }
            | Self::DeleteEvent { request_id, .. }
            | Self::SetReservationStatus { request_id, .. }
            | Self::Loaded { request_id, .. }
            | Self::EventsRefreshed { request_id, .. }
            | Self::ReservationsRefreshed { request_id, .. }
            | Self::MutationFailed { request_id, .. } => Some(*request_id),
            Self::SelectTab { .. } => None,
        }
    }

    /// Whether this is the answer to the command sent with `request_id`.
    #[must_use]
    pub fn is_result_for(&self, request_id: Uuid) -> bool {
        matches!(
            self,
            Self::Loaded { .. }
                | Self::EventsRefreshed { .. }
                | Self::ReservationsRefreshed { .. }
                | Self::MutationFailed { .. }
        ) && self.request_id() == Some(request_id)
    }
}

impl fmt::Display for DashboardTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Events => f.write_str("events"),
            Self::Reservations => f.write_str("reservations"),
        }
    }
}

// ============================================================================
// Environment
// ============================================================================

/// Dashboard dependencies.
#[derive(Clone)]
pub struct DashboardEnvironment {
    /// Event storage
    pub events: Arc<dyn EventRepository>,
    /// Reservation storage
    pub reservations: Arc<dyn ReservationRepository>,
}

impl DashboardEnvironment {
    /// Create a new dashboard environment.
    #[must_use]
    pub fn new(events: Arc<dyn EventRepository>, reservations: Arc<dyn ReservationRepository>) -> Self {
        Self { events, reservations }
    }
}

impl fmt::Debug for DashboardEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DashboardEnvironment").finish_non_exhaustive()
    }
}

// ============================================================================
// Reducer
// ============================================================================

/// Store running the dashboard reducer.
pub type DashboardStore = Store<DashboardState, DashboardAction, DashboardEnvironment, DashboardReducer>;

/// Admin dashboard reducer.
#[derive(Clone, Debug, Default)]
pub struct DashboardReducer;

impl DashboardReducer {
    /// Create a new dashboard reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

fn failed(request_id: Uuid, error: DashboardError, notice: &str) -> DashboardAction {
    DashboardAction::MutationFailed {
        request_id,
        error,
        notice: notice.to_string(),
    }
}

/// Answer immediately, without touching the repositories.
fn refuse(request_id: Uuid, error: DashboardError, notice: &'static str) -> SmallVec<[Effect<DashboardAction>; 4]> {
    smallvec![Effect::future(async move { Some(failed(request_id, error, notice)) })]
}

async fn load(request_id: Uuid, env: DashboardEnvironment) -> DashboardAction {
    let events = match env.events.list_events().await {
        Ok(events) => events,
        Err(error) => return failed(request_id, error.into(), notices::EVENTS_LOAD_FAILED),
    };
    match env.reservations.list_reservations().await {
        Ok(reservations) => DashboardAction::Loaded {
            request_id,
            events,
            reservations,
        },
        Err(error) => failed(request_id, error.into(), notices::RESERVATIONS_LOAD_FAILED),
    }
}

/// Re-fetch events after a successful write.
async fn events_refreshed(
    request_id: Uuid,
    env: &DashboardEnvironment,
    event: Option<Event>,
    notice: &str,
) -> DashboardAction {
    match env.events.list_events().await {
        Ok(events) => DashboardAction::EventsRefreshed {
            request_id,
            events,
            event: event.map(Box::new),
            notice: notice.to_string(),
        },
        Err(error) => failed(request_id, error.into(), notices::EVENTS_LOAD_FAILED),
    }
}

async fn save_event(
    request_id: Uuid,
    env: DashboardEnvironment,
    id: Option<EventId>,
    draft: EventDraft,
) -> DashboardAction {
    let (result, op, notice) = match id {
        None => (env.events.insert_event(draft).await, "created", notices::EVENT_CREATED),
        Some(id) => (env.events.update_event(id, draft).await, "updated", notices::EVENT_UPDATED),
    };

    match result {
        Ok(event) => {
            tracing::info!(%request_id, event_id = %event.id, title = %event.title, op, "Event saved");
            metrics::record_event_mutation(op);
            events_refreshed(request_id, &env, Some(event), notice).await
        },
        Err(error) => {
            tracing::error!(%request_id, event_id = ?id, error = %error, "Failed to save event");
            failed(request_id, error.into(), notices::SAVE_FAILED)
        },
    }
}

async fn delete_event(request_id: Uuid, env: DashboardEnvironment, id: EventId) -> DashboardAction {
    match env.events.delete_event(id).await {
        Ok(()) => {
            tracing::info!(%request_id, event_id = %id, "Event deleted");
            metrics::record_event_mutation("deleted");
            events_refreshed(request_id, &env, None, notices::EVENT_DELETED).await
        },
        Err(error) => {
            tracing::error!(%request_id, event_id = %id, error = %error, "Failed to delete event");
            failed(request_id, error.into(), notices::DELETE_FAILED)
        },
    }
}

async fn moderate(
    request_id: Uuid,
    env: DashboardEnvironment,
    id: ReservationId,
    status: ReservationStatus,
) -> DashboardAction {
    let current = match env.reservations.find_reservation(id).await {
        Ok(Some(reservation)) => reservation,
        Ok(None) => {
            return failed(
                request_id,
                RepositoryError::reservation_not_found(id).into(),
                notices::STATUS_FAILED,
            );
        },
        Err(error) => return failed(request_id, error.into(), notices::STATUS_FAILED),
    };
    if current.status != ReservationStatus::Pending {
        tracing::warn!(%request_id, reservation_id = %id, current = %current.status, "Reservation already moderated");
        return failed(
            request_id,
            DashboardError::AlreadyModerated {
                id,
                status: current.status,
            },
            notices::STATUS_FAILED,
        );
    }

    let reservation = match env.reservations.set_reservation_status(id, status).await {
        Ok(reservation) => reservation,
        Err(error) => {
            tracing::error!(%request_id, reservation_id = %id, error = %error, "Failed to update reservation status");
            return failed(request_id, error.into(), notices::STATUS_FAILED);
        },
    };
    tracing::info!(%request_id, reservation_id = %id, %status, "Reservation moderated");
    metrics::record_reservation(status, reservation.quantity);

    match env.reservations.list_reservations().await {
        Ok(reservations) => DashboardAction::ReservationsRefreshed {
            request_id,
            reservations,
            reservation: Box::new(reservation),
            notice: notices::STATUS_UPDATED.to_string(),
        },
        Err(error) => failed(request_id, error.into(), notices::RESERVATIONS_LOAD_FAILED),
    }
}

impl Reducer for DashboardReducer {
    type State = DashboardState;
    type Action = DashboardAction;
    type Environment = DashboardEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            DashboardAction::Load { request_id } => {
                state.loading = true;
                let env = env.clone();
                smallvec![Effect::future(async move { Some(load(request_id, env).await) })]
            },

            DashboardAction::CreateEvent { request_id, form } => match form.parse() {
                Ok(draft) => {
                    let env = env.clone();
                    smallvec![Effect::future(async move {
                        Some(save_event(request_id, env, None, draft).await)
                    })]
                },
                Err(error) => {
                    tracing::warn!(%request_id, error = %error, "Event form rejected");
                    refuse(request_id, error.into(), notices::SAVE_FAILED)
                },
            },

            DashboardAction::UpdateEvent {
                request_id,
                id,
                form,
            } => match form.parse() {
                Ok(draft) => {
                    let env = env.clone();
                    smallvec![Effect::future(async move {
                        Some(save_event(request_id, env, Some(id), draft).await)
                    })]
                },
                Err(error) => {
                    tracing::warn!(%request_id, event_id = %id, error = %error, "Event form rejected");
                    refuse(request_id, error.into(), notices::SAVE_FAILED)
                },
            },

            DashboardAction::DeleteEvent {
                request_id,
                id,
                confirmed,
            } => {
                if !confirmed {
                    tracing::warn!(%request_id, event_id = %id, "Unconfirmed event deletion");
                    return refuse(request_id, DashboardError::ConfirmationRequired, notices::CONFIRM_DELETE);
                }
                let env = env.clone();
                smallvec![Effect::future(async move { Some(delete_event(request_id, env, id).await) })]
            },

            DashboardAction::SetReservationStatus {
                request_id,
                id,
                status,
            } => {
                if status == ReservationStatus::Pending {
                    return refuse(request_id, DashboardError::InvalidStatus(status), notices::STATUS_FAILED);
                }
                let env = env.clone();
                smallvec![Effect::future(async move {
                    Some(moderate(request_id, env, id, status).await)
                })]
            },

            DashboardAction::SelectTab { admin, tab } => {
                state.active_tabs.insert(admin, tab);
                smallvec![Effect::None]
            },

            DashboardAction::Loaded {
                events, reservations, ..
            } => {
                state.events = events;
                state.reservations = reservations;
                state.loading = false;
                smallvec![Effect::None]
            },

            DashboardAction::EventsRefreshed { events, notice, .. } => {
                state.events = events;
                state.last_notice = Some(Notice::success(notice));
                smallvec![Effect::None]
            },

            DashboardAction::ReservationsRefreshed {
                reservations, notice, ..
            } => {
                state.reservations = reservations;
                state.last_notice = Some(Notice::success(notice));
                smallvec![Effect::None]
            },

            DashboardAction::MutationFailed { notice, .. } => {
                state.loading = false;
                state.last_notice = Some(Notice::error(notice));
                smallvec![Effect::None]
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::fixtures::{draft, new_reservation};
    use crate::store::InMemoryStore;
    use billetterie_testing::{assertions, run_effects, test_clock, ReducerTest};

    fn env() -> (DashboardEnvironment, InMemoryStore) {
        let store = InMemoryStore::new(Arc::new(test_clock()));
        (DashboardEnvironment::new(Arc::new(store.clone()), Arc::new(store.clone())), store)
    }

    fn form(title: &str) -> EventForm {
        EventForm {
            title: title.to_string(),
            date: "2025-03-15".to_string(),
            time: "19:00".to_string(),
            price: "15".to_string(),
            max_participants: "80".to_string(),
            address: "10 rue de Rivoli, Paris".to_string(),
            ..EventForm::default()
        }
    }

    async fn run_one(env: &DashboardEnvironment, state: &mut DashboardState, action: DashboardAction) -> DashboardAction {
        let effects = DashboardReducer::new().reduce(state, action, env);
        let mut actions = run_effects(effects.into_vec()).await;
        assert_eq!(actions.len(), 1);
        let result = actions.remove(0);
        DashboardReducer::new().reduce(state, result.clone(), env);
        result
    }

    #[tokio::test]
    async fn create_inserts_then_refetches() {
        let (env, store) = env();
        let mut state = DashboardState::default();
        let request_id = Uuid::new_v4();

        let result = run_one(
            &env,
            &mut state,
            DashboardAction::CreateEvent {
                request_id,
                form: form("Afterwork Startups"),
            },
        )
        .await;

        let DashboardAction::EventsRefreshed { event, notice, .. } = result else {
            panic!("expected EventsRefreshed, got {result:?}");
        };
        assert_eq!(event.unwrap().title, "Afterwork Startups");
        assert_eq!(notice, notices::EVENT_CREATED);
        assert_eq!(store.event_count(), 1);
        assert_eq!(state.events.len(), 1);
        assert_eq!(state.last_notice, Some(Notice::success(notices::EVENT_CREATED)));
    }

    #[tokio::test]
    async fn invalid_form_fails_before_any_write() {
        let (env, store) = env();
        let mut state = DashboardState::default();

        let result = run_one(
            &env,
            &mut state,
            DashboardAction::CreateEvent {
                request_id: Uuid::nil(),
                form: EventForm {
                    price: "quinze".to_string(),
                    ..form("Broken")
                },
            },
        )
        .await;

        assert!(matches!(
            result,
            DashboardAction::MutationFailed {
                error: DashboardError::Form(FormError::InvalidAmount { field: "price", .. }),
                ..
            }
        ));
        assert_eq!(store.event_count(), 0);
        assert_eq!(state.last_notice, Some(Notice::error(notices::SAVE_FAILED)));
    }

    #[tokio::test]
    async fn update_of_missing_event_fails() {
        let (env, _) = env();
        let result = run_one(
            &env,
            &mut DashboardState::default(),
            DashboardAction::UpdateEvent {
                request_id: Uuid::nil(),
                id: EventId::new(),
                form: form("Ghost"),
            },
        )
        .await;

        assert!(matches!(
            result,
            DashboardAction::MutationFailed {
                error: DashboardError::Repository(RepositoryError::NotFound { .. }),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn delete_without_confirmation_writes_nothing() {
        let (env, store) = env();
        let event = store.insert_event(draft("Gala")).await.unwrap();

        let result = run_one(
            &env,
            &mut DashboardState::default(),
            DashboardAction::DeleteEvent {
                request_id: Uuid::nil(),
                id: event.id,
                confirmed: false,
            },
        )
        .await;

        assert_eq!(
            result,
            DashboardAction::MutationFailed {
                request_id: Uuid::nil(),
                error: DashboardError::ConfirmationRequired,
                notice: notices::CONFIRM_DELETE.to_string(),
            }
        );
        assert_eq!(store.event_count(), 1);
    }

    #[tokio::test]
    async fn confirmed_delete_removes_the_event() {
        let (env, store) = env();
        let event = store.insert_event(draft("Gala")).await.unwrap();
        let mut state = DashboardState::default();

        let result = run_one(
            &env,
            &mut state,
            DashboardAction::DeleteEvent {
                request_id: Uuid::nil(),
                id: event.id,
                confirmed: true,
            },
        )
        .await;

        assert!(matches!(result, DashboardAction::EventsRefreshed { event: None, .. }));
        assert_eq!(store.event_count(), 0);
        assert_eq!(state.last_notice, Some(Notice::success(notices::EVENT_DELETED)));
    }

    #[tokio::test]
    async fn approve_updates_status_only() {
        let (env, store) = env();
        let event = store.insert_event(draft("Gala")).await.unwrap();
        let booked = store.insert_reservation(new_reservation(event.id, 2, 3000)).await.unwrap();
        let mut state = DashboardState::default();

        let result = run_one(
            &env,
            &mut state,
            DashboardAction::SetReservationStatus {
                request_id: Uuid::nil(),
                id: booked.id,
                status: ReservationStatus::Approved,
            },
        )
        .await;

        let DashboardAction::ReservationsRefreshed { reservation, .. } = result else {
            panic!("expected ReservationsRefreshed");
        };
        assert_eq!(*reservation, Reservation { status: ReservationStatus::Approved, ..booked });
        assert_eq!(state.reservations[0].status, ReservationStatus::Approved);
    }

    #[tokio::test]
    async fn moderated_reservation_cannot_be_moderated_again() {
        let (env, store) = env();
        let event = store.insert_event(draft("Gala")).await.unwrap();
        let booked = store.insert_reservation(new_reservation(event.id, 1, 1500)).await.unwrap();
        store.set_reservation_status(booked.id, ReservationStatus::Rejected).await.unwrap();

        let result = run_one(
            &env,
            &mut DashboardState::default(),
            DashboardAction::SetReservationStatus {
                request_id: Uuid::nil(),
                id: booked.id,
                status: ReservationStatus::Approved,
            },
        )
        .await;

        assert!(matches!(
            result,
            DashboardAction::MutationFailed {
                error: DashboardError::AlreadyModerated {
                    status: ReservationStatus::Rejected,
                    ..
                },
                ..
            }
        ));
    }

    #[tokio::test]
    async fn load_fetches_both_lists() {
        let (env, store) = env();
        let event = store.insert_event(draft("Gala")).await.unwrap();
        store.insert_reservation(new_reservation(event.id, 1, 1500)).await.unwrap();
        let mut state = DashboardState::default();

        let result = run_one(&env, &mut state, DashboardAction::Load { request_id: Uuid::nil() }).await;

        assert!(result.is_result_for(Uuid::nil()));
        assert_eq!((state.events.len(), state.reservations.len()), (1, 1));
        assert!(!state.loading);
    }

    #[test]
    fn select_tab_is_local() {
        let (env, _) = env();
        ReducerTest::new(DashboardReducer::new())
            .with_env(env)
            .given_state(DashboardState::default())
            .when_action(DashboardAction::SelectTab {
                admin: "claire@example.com".to_string(),
                tab: DashboardTab::Reservations,
            })
            .then_state(|state| assert_eq!(state.active_tab("claire@example.com"), DashboardTab::Reservations))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn each_admin_keeps_their_own_tab() {
        let (env, _) = env();
        let mut state = DashboardState::default();
        state.active_tabs.insert("bruno@example.com".to_string(), DashboardTab::Events);

        ReducerTest::new(DashboardReducer::new())
            .with_env(env)
            .given_state(state)
            .when_action(DashboardAction::SelectTab {
                admin: "claire@example.com".to_string(),
                tab: DashboardTab::Reservations,
            })
            .then_state(|state| {
                assert_eq!(state.active_tab("claire@example.com"), DashboardTab::Reservations);
                assert_eq!(state.active_tab("bruno@example.com"), DashboardTab::Events);
                assert_eq!(state.active_tab("nobody@example.com"), DashboardTab::Events);
            })
            .run();
    }

    #[test]
    fn load_marks_loading_and_returns_one_future() {
        let (env, _) = env();
        ReducerTest::new(DashboardReducer::new())
            .with_env(env)
            .given_state(DashboardState::default())
            .when_action(DashboardAction::Load { request_id: Uuid::nil() })
            .then_state(|state| assert!(state.loading))
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }
}
