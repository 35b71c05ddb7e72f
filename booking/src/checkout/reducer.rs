//! Checkout reducer: one [`CheckoutWizard`] per checkout id.
//!
//! Every wizard command carries a request id issued by the caller. The
//! reducer answers each one with a result action carrying the same id
//! (`Accepted`, `Rejected`, `Submitted` or `SubmitFailed`), so concurrent
//! commands on one checkout each get their own outcome.

use super::wizard::{CheckoutError, CheckoutWizard, WizardStep};
use crate::metrics;
use crate::store::ReservationRepository;
use crate::types::{
    CheckoutId, ContactDetails, Event, EventId, Money, NewReservation, ReservationId, TicketKind,
};
use billetterie_core::environment::Clock;
use billetterie_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
use billetterie_mail::{BookingConfirmation, BookingNotifier};
use billetterie_runtime::Store;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use uuid::Uuid;

// ============================================================================
// State
// ============================================================================

/// What the visitor sees once the reservation is stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
    /// Checkout that produced the reservation
    pub checkout_id: CheckoutId,
    /// Stored reservation
    pub reservation_id: ReservationId,
    /// Booked event
    pub event_id: EventId,
    /// Event title
    pub event_title: String,
    /// Event day
    pub event_date: NaiveDate,
    /// Event start time
    pub event_time: NaiveTime,
    /// Total number of tickets
    pub quantity: u32,
    /// Tickets per kind
    pub tickets: BTreeMap<TicketKind, u32>,
    /// Amount due
    pub total: Money,
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Email the confirmation was sent to
    pub email: String,
    /// Whether the confirmation email went out
    pub email_delivered: bool,
}

/// One visitor checkout.
#[derive(Clone, Debug, PartialEq)]
pub struct CheckoutSession {
    /// Wizard position and selection
    pub wizard: CheckoutWizard,
    /// A submission is running
    pub in_flight: bool,
    /// Set once the reservation is stored
    pub confirmation: Option<Confirmation>,
    /// Outcome of the last refused command, cleared by the next accepted one
    pub last_error: Option<CheckoutError>,
    /// Last time a command reached this session
    pub last_activity: DateTime<Utc>,
}

impl CheckoutSession {
    fn new(event: Event, now: DateTime<Utc>) -> Self {
        Self {
            wizard: CheckoutWizard::new(event),
            in_flight: false,
            confirmation: None,
            last_error: None,
            last_activity: now,
        }
    }

    /// Whether the session outlived its retention at `now`.
    ///
    /// A running submission is never expired.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>, retention: &CheckoutRetention) -> bool {
        if self.in_flight {
            return false;
        }
        let ttl = if self.confirmation.is_some() {
            retention.confirmed
        } else {
            retention.idle
        };
        now - self.last_activity >= ttl
    }
}

/// How long sessions are kept without activity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CheckoutRetention {
    /// Unsubmitted sessions
    pub idle: Duration,
    /// Submitted sessions, kept so the confirmation can be reloaded
    pub confirmed: Duration,
}

impl Default for CheckoutRetention {
    fn default() -> Self {
        Self {
            idle: Duration::minutes(30),
            confirmed: Duration::hours(1),
        }
    }
}

/// Open checkouts.
#[derive(Clone, Debug, Default)]
pub struct CheckoutState {
    /// Sessions by checkout id
    pub sessions: HashMap<CheckoutId, CheckoutSession>,
}

impl CheckoutState {
    /// Session `id`.
    #[must_use]
    pub fn session(&self, id: &CheckoutId) -> Option<&CheckoutSession> {
        self.sessions.get(id)
    }

    /// Confirmation of checkout `id`, if it was submitted.
    #[must_use]
    pub fn confirmation(&self, id: &CheckoutId) -> Option<&Confirmation> {
        self.sessions.get(id).and_then(|s| s.confirmation.as_ref())
    }

    /// Drop sessions past their retention. Returns how many were dropped.
    pub fn evict_expired(&mut self, now: DateTime<Utc>, retention: &CheckoutRetention) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, session| !session.is_expired(now, retention));
        before - self.sessions.len()
    }
}

// ============================================================================
// Actions
// ============================================================================

/// Checkout actions.
#[derive(Clone, Debug, PartialEq)]
pub enum CheckoutAction {
    // Commands
    /// Open a checkout for `event`
    Start {
        /// New checkout id
        checkout_id: CheckoutId,
        /// Event snapshot
        event: Box<Event>,
    },
    /// Change a ticket count
    AdjustTickets {
        /// Checkout
        checkout_id: CheckoutId,
        /// Caller-issued id echoed by the result
        request_id: Uuid,
        /// Ticket kind
        kind: TicketKind,
        /// Signed change
        delta: i32,
    },
    /// Replace contact details
    UpdateContact {
        /// Checkout
        checkout_id: CheckoutId,
        /// Caller-issued id echoed by the result
        request_id: Uuid,
        /// New details
        contact: ContactDetails,
    },
    /// Advance one step
    Next {
        /// Checkout
        checkout_id: CheckoutId,
        /// Caller-issued id echoed by the result
        request_id: Uuid,
    },
    /// Go back one step
    Back {
        /// Checkout
        checkout_id: CheckoutId,
        /// Caller-issued id echoed by the result
        request_id: Uuid,
    },
    /// Store the reservation and send the confirmation
    Submit {
        /// Checkout
        checkout_id: CheckoutId,
        /// Caller-issued id echoed by the result
        request_id: Uuid,
    },
    /// Drop the checkout
    Abandon {
        /// Checkout
        checkout_id: CheckoutId,
    },

    // Results
    /// A wizard command was applied
    Accepted {
        /// Checkout
        checkout_id: CheckoutId,
        /// Id of the applied command
        request_id: Uuid,
    },
    /// Reservation stored
    Submitted {
        /// Checkout
        checkout_id: CheckoutId,
        /// Id of the `Submit` command
        request_id: Uuid,
        /// Visitor-facing summary
        confirmation: Box<Confirmation>,
    },
    /// Reservation insert failed
    SubmitFailed {
        /// Checkout
        checkout_id: CheckoutId,
        /// Id of the `Submit` command
        request_id: Uuid,
        /// Repository message
        reason: String,
    },
    /// A command was refused by a guard
    Rejected {
        /// Checkout
        checkout_id: CheckoutId,
        /// Id of the refused command
        request_id: Uuid,
        /// Refused guard
        reason: CheckoutError,
    },
}

impl CheckoutAction {
    /// Checkout the action is about.
    #[must_use]
    pub const fn checkout_id(&self) -> CheckoutId {
        match self {
            Self::Start { checkout_id, .. }
            | Self::AdjustTickets { checkout_id, .. }
            | Self::UpdateContact { checkout_id, .. }
            | Self::Next { checkout_id, .. }
            | Self::Back { checkout_id, .. }
            | Self::Submit { checkout_id, .. }
            | Self::Abandon { checkout_id }
            | Self::Accepted { checkout_id, .. }
            | Self::Submitted { checkout_id, .. }
            | Self::SubmitFailed { checkout_id, .. }
            | Self::Rejected { checkout_id, .. } => *checkout_id,
        }
    }

    /// Request id of a wizard command or of its result.
    #[must_use]
    pub const fn request_id(&self) -> Option<Uuid> {
        match self {
            Self::AdjustTickets { request_id, .. }
            | Self::UpdateContact { request_id, .. }
            | Self::Next { request_id, .. }
            | Self::Back { request_id, .. }
            | Self::Submit { request_id, .. }
            | Self::Accepted { request_id, .. }
            | Self::Submitted { request_id, .. }
            | Self::SubmitFailed { request_id, .. }
            | Self::Rejected { request_id, .. } => Some(*request_id),
            Self::Start { .. } | Self::Abandon { .. } => None,
        }
    }

    /// Whether this is the result of the command sent with `request_id`.
    #[must_use]
    pub fn is_result_for(&self, request_id: Uuid) -> bool {
        matches!(
            self,
            Self::Accepted { .. } | Self::Submitted { .. } | Self::SubmitFailed { .. } | Self::Rejected { .. }
        ) && self.request_id() == Some(request_id)
    }
}

// ============================================================================
// Environment
// ============================================================================

/// Checkout dependencies.
#[derive(Clone)]
pub struct CheckoutEnvironment {
    /// Where reservations are stored
    pub reservations: Arc<dyn ReservationRepository>,
    /// Sends the confirmation email
    pub notifier: Arc<dyn BookingNotifier>,
    /// Time source for session activity
    pub clock: Arc<dyn Clock>,
    /// Session lifetimes
    pub retention: CheckoutRetention,
}

impl CheckoutEnvironment {
    /// Create a new checkout environment with the default retention.
    #[must_use]
    pub fn new(
        reservations: Arc<dyn ReservationRepository>,
        notifier: Arc<dyn BookingNotifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            reservations,
            notifier,
            clock,
            retention: CheckoutRetention::default(),
        }
    }

    /// Replace the session retention.
    #[must_use]
    pub const fn with_retention(mut self, retention: CheckoutRetention) -> Self {
        self.retention = retention;
        self
    }
}

impl std::fmt::Debug for CheckoutEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutEnvironment")
            .field("notifier", &self.notifier.name())
            .field("retention", &self.retention)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Reducer
// ============================================================================

/// Store running the checkout reducer.
pub type CheckoutStore = Store<CheckoutState, CheckoutAction, CheckoutEnvironment, CheckoutReducer>;

/// Routes checkout actions to the wizard of their checkout.
#[derive(Clone, Debug, Default)]
pub struct CheckoutReducer;

impl CheckoutReducer {
    /// Create a new checkout reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn answer(action: CheckoutAction) -> SmallVec<[Effect<CheckoutAction>; 4]> {
        smallvec![Effect::future(async move { Some(action) })]
    }

    fn reject(
        checkout_id: CheckoutId,
        request_id: Uuid,
        reason: CheckoutError,
    ) -> SmallVec<[Effect<CheckoutAction>; 4]> {
        Self::answer(CheckoutAction::Rejected {
            checkout_id,
            request_id,
            reason,
        })
    }

    /// Apply a wizard command, answering with `Accepted` or `Rejected`.
    fn command<F>(
        state: &mut CheckoutState,
        checkout_id: CheckoutId,
        request_id: Uuid,
        env: &CheckoutEnvironment,
        apply: F,
    ) -> SmallVec<[Effect<CheckoutAction>; 4]>
    where
        F: FnOnce(&mut CheckoutWizard) -> Result<(), CheckoutError>,
    {
        let Some(session) = state.sessions.get_mut(&checkout_id) else {
            return Self::reject(checkout_id, request_id, CheckoutError::NotFound);
        };
        session.last_activity = env.clock.now();
        if session.in_flight {
            return Self::reject(checkout_id, request_id, CheckoutError::SubmissionInFlight);
        }

        match apply(&mut session.wizard) {
            Ok(()) => {
                session.last_error = None;
                Self::answer(CheckoutAction::Accepted {
                    checkout_id,
                    request_id,
                })
            },
            Err(reason) => Self::reject(checkout_id, request_id, reason),
        }
    }

    fn submit(
        state: &mut CheckoutState,
        checkout_id: CheckoutId,
        request_id: Uuid,
        env: &CheckoutEnvironment,
    ) -> SmallVec<[Effect<CheckoutAction>; 4]> {
        let Some(session) = state.sessions.get_mut(&checkout_id) else {
            return Self::reject(checkout_id, request_id, CheckoutError::NotFound);
        };
        session.last_activity = env.clock.now();
        if session.in_flight {
            return Self::reject(checkout_id, request_id, CheckoutError::SubmissionInFlight);
        }
        let reservation = match session.wizard.reservation() {
            Ok(reservation) => reservation,
            Err(reason) => return Self::reject(checkout_id, request_id, reason),
        };

        session.in_flight = true;
        session.last_error = None;

        let event = session.wizard.event().clone();
        let reservations = Arc::clone(&env.reservations);
        let notifier = Arc::clone(&env.notifier);

        smallvec![Effect::future(submit_reservation(
            checkout_id,
            request_id,
            event,
            reservation,
            reservations,
            notifier,
        ))]
    }
}

/// Insert the reservation, then send the confirmation.
///
/// A failed email does not undo the insert.
async fn submit_reservation(
    checkout_id: CheckoutId,
    request_id: Uuid,
    event: Event,
    reservation: NewReservation,
    reservations: Arc<dyn ReservationRepository>,
    notifier: Arc<dyn BookingNotifier>,
) -> Option<CheckoutAction> {
    let stored = match reservations.insert_reservation(reservation).await {
        Ok(stored) => stored,
        Err(error) => {
            tracing::error!(%checkout_id, event_id = %event.id, error = %error, "Failed to store reservation");
            return Some(CheckoutAction::SubmitFailed {
                checkout_id,
                request_id,
                reason: error.to_string(),
            });
        },
    };

    tracing::info!(
        %checkout_id,
        reservation_id = %stored.id,
        event_id = %stored.event_id,
        quantity = stored.quantity,
        total = %stored.total_price,
        "Reservation stored"
    );
    metrics::record_reservation(stored.status, stored.quantity);

    let mail = BookingConfirmation {
        email: stored.email.clone(),
        first_name: stored.first_name.clone(),
        last_name: stored.last_name.clone(),
        event_title: event.title.clone(),
        event_date: event.date,
        event_time: event.time,
        quantity: stored.quantity,
        total_cents: stored.total_price.cents(),
    };

    let email_delivered = match notifier.send_booking_confirmation(&mail).await {
        Ok(()) => {
            metrics::record_email("sent");
            true
        },
        Err(error) => {
            tracing::warn!(
                %checkout_id,
                reservation_id = %stored.id,
                provider = notifier.name(),
                error = %error,
                "Confirmation email failed, reservation kept"
            );
            metrics::record_email("failed");
            false
        },
    };

    Some(CheckoutAction::Submitted {
        checkout_id,
        request_id,
        confirmation: Box::new(Confirmation {
            checkout_id,
            reservation_id: stored.id,
            event_id: stored.event_id,
            event_title: event.title,
            event_date: event.date,
            event_time: event.time,
            quantity: stored.quantity,
            tickets: stored.ticket_details,
            total: stored.total_price,
            first_name: stored.first_name,
            last_name: stored.last_name,
            email: stored.email,
            email_delivered,
        }),
    })
}

impl Reducer for CheckoutReducer {
    type State = CheckoutState;
    type Action = CheckoutAction;
    type Environment = CheckoutEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            CheckoutAction::Start { checkout_id, event } => {
                let now = env.clock.now();
                let evicted = state.evict_expired(now, &env.retention);
                if evicted > 0 {
                    tracing::info!(evicted, open = state.sessions.len(), "Expired checkouts evicted");
                }
                tracing::info!(%checkout_id, event_id = %event.id, "Checkout started");
                state.sessions.insert(checkout_id, CheckoutSession::new(*event, now));
                smallvec![Effect::None]
            },

            CheckoutAction::AdjustTickets {
                checkout_id,
                request_id,
                kind,
                delta,
            } => Self::command(state, checkout_id, request_id, env, |wizard| {
                wizard.adjust(kind, delta).map(|_| ())
            }),

            CheckoutAction::UpdateContact {
                checkout_id,
                request_id,
                contact,
            } => Self::command(state, checkout_id, request_id, env, |wizard| wizard.set_contact(contact)),

            CheckoutAction::Next {
                checkout_id,
                request_id,
            } => Self::command(state, checkout_id, request_id, env, |wizard| wizard.next().map(|_| ())),

            CheckoutAction::Back {
                checkout_id,
                request_id,
            } => Self::command(state, checkout_id, request_id, env, |wizard| wizard.back().map(|_| ())),

            CheckoutAction::Submit {
                checkout_id,
                request_id,
            } => Self::submit(state, checkout_id, request_id, env),

            CheckoutAction::Abandon { checkout_id } => {
                if state.sessions.remove(&checkout_id).is_some() {
                    tracing::info!(%checkout_id, "Checkout abandoned");
                }
                smallvec![Effect::None]
            },

            CheckoutAction::Accepted { .. } => smallvec![Effect::None],

            CheckoutAction::Submitted {
                checkout_id,
                confirmation,
                ..
            } => {
                if let Some(session) = state.sessions.get_mut(&checkout_id) {
                    session.in_flight = false;
                    session.last_error = None;
                    session.last_activity = env.clock.now();
                    session.wizard.mark_submitted();
                    session.confirmation = Some(*confirmation);
                }
                smallvec![Effect::None]
            },

            CheckoutAction::SubmitFailed {
                checkout_id,
                reason,
                ..
            } => {
                if let Some(session) = state.sessions.get_mut(&checkout_id) {
                    session.in_flight = false;
                    session.last_error = Some(CheckoutError::SubmissionFailed(reason));
                }
                smallvec![Effect::None]
            },

            CheckoutAction::Rejected {
                checkout_id,
                request_id,
                reason,
            } => {
                let step = state.sessions.get(&checkout_id).map(|s| s.wizard.step());
                tracing::warn!(%checkout_id, %request_id, ?step, reason = %reason, "Checkout command rejected");
                if let Some(session) = state.sessions.get_mut(&checkout_id) {
                    session.last_error = Some(reason);
                }
                smallvec![Effect::None]
            },
        }
    }
}

/// Step of checkout `id`, for logs and tests.
#[must_use]
pub fn step_of(state: &CheckoutState, id: &CheckoutId) -> Option<WizardStep> {
    state.session(id).map(|s| s.wizard.step())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::fixtures::{contact, event};
    use crate::store::{EventRepository, InMemoryStore};
    use billetterie_mail::{MailError, RecordingNotifier};
    use billetterie_testing::{assertions, run_effects, test_clock, ReducerTest};

    struct Harness {
        env: CheckoutEnvironment,
        store: InMemoryStore,
        notifier: RecordingNotifier,
        event: Event,
    }

    fn harness() -> Harness {
        let store = InMemoryStore::new(Arc::new(test_clock()));
        let event = event(1500, Some(4500));
        store.seed_event(event.clone()).unwrap();
        let notifier = RecordingNotifier::new();
        Harness {
            env: CheckoutEnvironment::new(
                Arc::new(store.clone()),
                Arc::new(notifier.clone()),
                Arc::new(test_clock()),
            ),
            store,
            notifier,
            event,
        }
    }

    /// The harness environment with its clock moved forward.
    fn later(h: &Harness, by: Duration) -> CheckoutEnvironment {
        CheckoutEnvironment {
            clock: Arc::new(test_clock().advanced(by)),
            ..h.env.clone()
        }
    }

    fn reduce(state: &mut CheckoutState, action: CheckoutAction, env: &CheckoutEnvironment) -> Vec<Effect<CheckoutAction>> {
        CheckoutReducer::new().reduce(state, action, env).into_vec()
    }

    fn start(id: CheckoutId, event: &Event) -> CheckoutAction {
        CheckoutAction::Start {
            checkout_id: id,
            event: Box::new(event.clone()),
        }
    }

    /// A session on Review with two standard tickets.
    fn reviewed(h: &Harness, id: CheckoutId) -> CheckoutState {
        let mut state = CheckoutState::default();
        reduce(&mut state, start(id, &h.event), &h.env);
        for action in [
            CheckoutAction::AdjustTickets {
                checkout_id: id,
                request_id: Uuid::new_v4(),
                kind: TicketKind::Standard,
                delta: 2,
            },
            CheckoutAction::Next {
                checkout_id: id,
                request_id: Uuid::new_v4(),
            },
            CheckoutAction::UpdateContact {
                checkout_id: id,
                request_id: Uuid::new_v4(),
                contact: contact(),
            },
            CheckoutAction::Next {
                checkout_id: id,
                request_id: Uuid::new_v4(),
            },
        ] {
            reduce(&mut state, action, &h.env);
        }
        assert_eq!(step_of(&state, &id), Some(WizardStep::Review));
        state
    }

    /// A session whose reservation was stored.
    async fn submitted(h: &Harness, state: &mut CheckoutState, id: CheckoutId) {
        let effects = reduce(
            state,
            CheckoutAction::Submit {
                checkout_id: id,
                request_id: Uuid::new_v4(),
            },
            &h.env,
        );
        for action in run_effects(effects).await {
            reduce(state, action, &h.env);
        }
        assert!(state.confirmation(&id).is_some());
    }

    #[test]
    fn start_opens_a_session_on_ticket_selection() {
        let h = harness();
        let id = CheckoutId::new();
        ReducerTest::new(CheckoutReducer::new())
            .with_env(h.env.clone())
            .given_state(CheckoutState::default())
            .when_action(start(id, &h.event))
            .then_state(move |state| {
                assert_eq!(step_of(state, &id), Some(WizardStep::SelectTickets));
                assert_eq!(state.session(&id).unwrap().last_activity, test_clock().now());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn two_checkouts_for_one_event_are_independent() {
        let h = harness();
        let (first, second) = (CheckoutId::new(), CheckoutId::new());
        ReducerTest::new(CheckoutReducer::new())
            .with_env(h.env.clone())
            .given_state(CheckoutState::default())
            .when_action(start(first, &h.event))
            .when_action(start(second, &h.event))
            .when_action(CheckoutAction::AdjustTickets {
                checkout_id: first,
                request_id: Uuid::new_v4(),
                kind: TicketKind::Standard,
                delta: 3,
            })
            .then_state(move |state| {
                assert_eq!(state.session(&first).unwrap().wizard.quantity(TicketKind::Standard), 3);
                assert_eq!(state.session(&second).unwrap().wizard.quantity(TicketKind::Standard), 0);
            })
            .run();
    }

    #[tokio::test]
    async fn accepted_command_answers_with_its_request_id() {
        let h = harness();
        let id = CheckoutId::new();
        let request_id = Uuid::new_v4();
        let mut state = CheckoutState::default();
        reduce(&mut state, start(id, &h.event), &h.env);

        let effects = reduce(
            &mut state,
            CheckoutAction::AdjustTickets {
                checkout_id: id,
                request_id,
                kind: TicketKind::Vip,
                delta: 1,
            },
            &h.env,
        );

        assert_eq!(
            run_effects(effects).await,
            vec![CheckoutAction::Accepted {
                checkout_id: id,
                request_id
            }]
        );
        assert_eq!(state.session(&id).unwrap().wizard.quantity(TicketKind::Vip), 1);
    }

    #[tokio::test]
    async fn guard_failure_is_fed_back_as_rejected() {
        let h = harness();
        let id = CheckoutId::new();
        let request_id = Uuid::new_v4();
        let mut state = CheckoutState::default();
        reduce(&mut state, start(id, &h.event), &h.env);

        let effects = reduce(
            &mut state,
            CheckoutAction::Next {
                checkout_id: id,
                request_id,
            },
            &h.env,
        );
        let actions = run_effects(effects).await;

        assert_eq!(
            actions,
            vec![CheckoutAction::Rejected {
                checkout_id: id,
                request_id,
                reason: CheckoutError::NoTickets
            }]
        );

        reduce(&mut state, actions[0].clone(), &h.env);
        assert_eq!(state.session(&id).unwrap().last_error, Some(CheckoutError::NoTickets));
        assert_eq!(step_of(&state, &id), Some(WizardStep::SelectTickets));
    }

    #[tokio::test]
    async fn interleaved_commands_each_get_their_own_outcome() {
        let mut h = harness();
        h.event.vip_price = None;
        let id = CheckoutId::new();
        let (vip, standard) = (Uuid::new_v4(), Uuid::new_v4());
        let mut state = CheckoutState::default();
        reduce(&mut state, start(id, &h.event), &h.env);

        // Both commands are reduced before either result.
        let refused = reduce(
            &mut state,
            CheckoutAction::AdjustTickets {
                checkout_id: id,
                request_id: vip,
                kind: TicketKind::Vip,
                delta: 1,
            },
            &h.env,
        );
        let applied = reduce(
            &mut state,
            CheckoutAction::AdjustTickets {
                checkout_id: id,
                request_id: standard,
                kind: TicketKind::Standard,
                delta: 1,
            },
            &h.env,
        );
        let mut results = run_effects(refused).await;
        results.extend(run_effects(applied).await);
        for result in results.clone() {
            reduce(&mut state, result, &h.env);
        }

        let vip_result = results.iter().find(|a| a.is_result_for(vip)).unwrap();
        let standard_result = results.iter().find(|a| a.is_result_for(standard)).unwrap();
        assert!(matches!(
            vip_result,
            CheckoutAction::Rejected {
                reason: CheckoutError::TicketNotOffered(TicketKind::Vip),
                ..
            }
        ));
        assert!(matches!(standard_result, CheckoutAction::Accepted { .. }));
        assert_eq!(state.session(&id).unwrap().wizard.quantity(TicketKind::Standard), 1);
    }

    #[tokio::test]
    async fn unknown_checkout_is_rejected() {
        let h = harness();
        let id = CheckoutId::new();
        let request_id = Uuid::new_v4();
        let effects = reduce(
            &mut CheckoutState::default(),
            CheckoutAction::Back {
                checkout_id: id,
                request_id,
            },
            &h.env,
        );

        assert_eq!(
            run_effects(effects).await,
            vec![CheckoutAction::Rejected {
                checkout_id: id,
                request_id,
                reason: CheckoutError::NotFound
            }]
        );
    }

    #[tokio::test]
    async fn submit_stores_one_pending_reservation_and_confirms() {
        let h = harness();
        let id = CheckoutId::new();
        let request_id = Uuid::new_v4();
        let mut state = reviewed(&h, id);

        let effects = reduce(
            &mut state,
            CheckoutAction::Submit {
                checkout_id: id,
                request_id,
            },
            &h.env,
        );
        assert!(state.session(&id).unwrap().in_flight);

        let mut actions = run_effects(effects).await;
        let result = actions.remove(0);
        assert!(result.is_result_for(request_id));
        let CheckoutAction::Submitted { confirmation, .. } = result else {
            panic!("expected Submitted");
        };

        assert_eq!(h.store.reservation_count(), 1);
        let stored = crate::store::ReservationRepository::list_reservations(&h.store).await.unwrap();
        assert_eq!(stored[0].quantity, 2);
        assert_eq!(stored[0].total_price, Money::from_cents(3000));
        assert_eq!(stored[0].status, crate::types::ReservationStatus::Pending);

        assert_eq!(confirmation.event_title, h.event.title);
        assert_eq!(confirmation.event_date, h.event.date);
        assert_eq!(confirmation.event_time, h.event.time);
        assert_eq!(confirmation.total, Money::from_cents(3000));
        assert!(confirmation.email_delivered);
        assert_eq!(h.notifier.sent().len(), 1);
        assert_eq!(h.notifier.sent()[0].total_cents, 3000);
    }

    #[tokio::test]
    async fn email_failure_still_confirms() {
        let h = harness();
        h.notifier.fail_with(MailError::Transport("relay down".to_string()));
        let id = CheckoutId::new();
        let mut state = reviewed(&h, id);

        submitted(&h, &mut state, id).await;

        let confirmation = state.confirmation(&id).unwrap();
        assert!(!confirmation.email_delivered);
        assert_eq!(h.store.reservation_count(), 1);
        assert_eq!(step_of(&state, &id), Some(WizardStep::Submitted));
    }

    #[tokio::test]
    async fn insert_failure_keeps_the_review_step() {
        let h = harness();
        let id = CheckoutId::new();
        let mut state = reviewed(&h, id);
        // The event disappears between review and submit.
        EventRepository::delete_event(&h.store, h.event.id).await.unwrap();

        let effects = reduce(
            &mut state,
            CheckoutAction::Submit {
                checkout_id: id,
                request_id: Uuid::new_v4(),
            },
            &h.env,
        );
        let mut actions = run_effects(effects).await;
        let failed = actions.remove(0);
        assert!(matches!(failed, CheckoutAction::SubmitFailed { .. }));
        reduce(&mut state, failed, &h.env);

        let session = state.session(&id).unwrap();
        assert!(!session.in_flight);
        assert_eq!(session.wizard.step(), WizardStep::Review);
        assert_eq!(session.wizard.quantity(TicketKind::Standard), 2);
        assert!(matches!(session.last_error, Some(CheckoutError::SubmissionFailed(_))));
        assert!(h.notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn second_submit_while_in_flight_is_rejected() {
        let h = harness();
        let id = CheckoutId::new();
        let second_id = Uuid::new_v4();
        let mut state = reviewed(&h, id);

        let _first = reduce(
            &mut state,
            CheckoutAction::Submit {
                checkout_id: id,
                request_id: Uuid::new_v4(),
            },
            &h.env,
        );
        let second = reduce(
            &mut state,
            CheckoutAction::Submit {
                checkout_id: id,
                request_id: second_id,
            },
            &h.env,
        );

        assert_eq!(
            run_effects(second).await,
            vec![CheckoutAction::Rejected {
                checkout_id: id,
                request_id: second_id,
                reason: CheckoutError::SubmissionInFlight
            }]
        );
        assert_eq!(h.store.reservation_count(), 0);
    }

    #[test]
    fn abandon_removes_the_session() {
        let h = harness();
        let id = CheckoutId::new();
        ReducerTest::new(CheckoutReducer::new())
            .with_env(h.env.clone())
            .given_state(reviewed(&h, id))
            .when_action(CheckoutAction::Abandon { checkout_id: id })
            .then_state(move |state| assert!(state.session(&id).is_none()))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn idle_session_is_evicted_when_a_checkout_starts_after_the_ttl() {
        let h = harness();
        let (idle, fresh) = (CheckoutId::new(), CheckoutId::new());
        let state = reviewed(&h, idle);

        ReducerTest::new(CheckoutReducer::new())
            .with_env(later(&h, Duration::minutes(29)))
            .given_state(state.clone())
            .when_action(start(fresh, &h.event))
            .then_state(move |state| {
                assert!(state.session(&idle).is_some());
                assert!(state.session(&fresh).is_some());
            })
            .run();

        ReducerTest::new(CheckoutReducer::new())
            .with_env(later(&h, Duration::minutes(31)))
            .given_state(state)
            .when_action(start(fresh, &h.event))
            .then_state(move |state| {
                assert!(state.session(&idle).is_none());
                assert_eq!(state.sessions.len(), 1);
            })
            .run();
    }

    #[tokio::test]
    async fn submitted_session_is_kept_until_the_confirmation_ttl() {
        let h = harness();
        let (done, fresh) = (CheckoutId::new(), CheckoutId::new());
        let mut state = reviewed(&h, done);
        submitted(&h, &mut state, done).await;

        reduce(&mut state, start(fresh, &h.event), &later(&h, Duration::minutes(45)));
        assert!(state.confirmation(&done).is_some());

        reduce(&mut state, start(CheckoutId::new(), &h.event), &later(&h, Duration::minutes(61)));
        assert!(state.session(&done).is_none());
        // Started at +45 min, idle for 16 min.
        assert!(state.session(&fresh).is_some());
    }

    #[test]
    fn activity_pushes_back_eviction() {
        let h = harness();
        let id = CheckoutId::new();
        let mut state = reviewed(&h, id);

        reduce(
            &mut state,
            CheckoutAction::Back {
                checkout_id: id,
                request_id: Uuid::new_v4(),
            },
            &later(&h, Duration::minutes(20)),
        );
        reduce(&mut state, start(CheckoutId::new(), &h.event), &later(&h, Duration::minutes(40)));

        assert_eq!(step_of(&state, &id), Some(WizardStep::EnterContact));
    }

    #[test]
    fn results_are_matched_by_request_id() {
        let id = CheckoutId::new();
        let request_id = Uuid::new_v4();
        let failed = CheckoutAction::SubmitFailed {
            checkout_id: id,
            request_id,
            reason: "down".to_string(),
        };

        assert!(failed.is_result_for(request_id));
        assert!(!failed.is_result_for(Uuid::new_v4()));
        assert!(!CheckoutAction::Submit {
            checkout_id: id,
            request_id
        }
        .is_result_for(request_id));
        assert_eq!(CheckoutAction::Abandon { checkout_id: id }.request_id(), None);
    }
}
