//! Checkout scenarios driven through the store, without HTTP.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use billetterie::checkout::{
    CheckoutAction, CheckoutEnvironment, CheckoutError, CheckoutReducer, CheckoutState, CheckoutStore, WizardStep,
};
use billetterie::store::{EventRepository, InMemoryStore, ReservationRepository};
use billetterie::types::{
    CheckoutId, ContactDetails, Event, EventDraft, EventId, Money, ReservationStatus, TicketKind,
};
use billetterie_core::environment::Clock;
use billetterie_mail::{MailError, RecordingNotifier};
use billetterie_runtime::Store;
use billetterie_testing::test_clock;
use chrono::{NaiveDate, NaiveTime};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

const TIMEOUT: Duration = Duration::from_secs(5);

fn draft() -> EventDraft {
    EventDraft {
        title: "Soirée Networking Tech".to_string(),
        description: "Rencontres entre fondateurs".to_string(),
        date: NaiveDate::from_ymd_opt(2025, 3, 15).unwrap(),
        time: NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
        price: Money::from_cents(1500),
        vip_price: Some(Money::from_cents(4500)),
        max_participants: 80,
        logo_url: None,
        address: "10 rue de Rivoli, Paris".to_string(),
        latitude: None,
        longitude: None,
    }
}

fn contact() -> ContactDetails {
    ContactDetails {
        first_name: "Claire".to_string(),
        last_name: "Martin".to_string(),
        email: "claire.martin@example.com".to_string(),
        phone: "06 12 34 56 78".to_string(),
        company: Some("Fondateurs & Co".to_string()),
    }
}

fn checkout_store(repository: Arc<InMemoryStore>, notifier: RecordingNotifier) -> CheckoutStore {
    Store::new(
        CheckoutState::default(),
        CheckoutReducer::new(),
        CheckoutEnvironment::new(repository, Arc::new(notifier), Arc::new(test_clock())),
    )
}

/// Start a checkout and walk it to the review step with one standard and one VIP ticket.
async fn reach_review(store: &CheckoutStore, event: Event) -> CheckoutId {
    let checkout_id = CheckoutId::new();
    let mut handle = store
        .send(CheckoutAction::Start {
            checkout_id,
            event: Box::new(event),
        })
        .await
        .unwrap();
    handle.wait_with_timeout(TIMEOUT).await.unwrap();

    let commands: Vec<fn(CheckoutId, Uuid) -> CheckoutAction> = vec![
        |checkout_id, request_id| CheckoutAction::AdjustTickets {
            checkout_id,
            request_id,
            kind: TicketKind::Standard,
            delta: 1,
        },
        |checkout_id, request_id| CheckoutAction::AdjustTickets {
            checkout_id,
            request_id,
            kind: TicketKind::Vip,
            delta: 1,
        },
        |checkout_id, request_id| CheckoutAction::Next {
            checkout_id,
            request_id,
        },
        |checkout_id, request_id| CheckoutAction::UpdateContact {
            checkout_id,
            request_id,
            contact: contact(),
        },
        |checkout_id, request_id| CheckoutAction::Next {
            checkout_id,
            request_id,
        },
    ];

    for command in commands {
        let request_id = Uuid::new_v4();
        let result = store
            .send_and_wait_for(command(checkout_id, request_id), |a| a.is_result_for(request_id), TIMEOUT)
            .await
            .unwrap();
        assert!(matches!(result, CheckoutAction::Accepted { .. }), "got {result:?}");
    }

    let step = store.state(|s| s.session(&checkout_id).map(|session| session.wizard.step())).await;
    assert_eq!(step, Some(WizardStep::Review));
    checkout_id
}

async fn submit(store: &CheckoutStore, checkout_id: CheckoutId) -> CheckoutAction {
    let request_id = Uuid::new_v4();
    store
        .send_and_wait_for(
            CheckoutAction::Submit {
                checkout_id,
                request_id,
            },
            |a| a.is_result_for(request_id),
            TIMEOUT,
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn submitted_reservation_is_pending_with_ticket_breakdown() {
    let repository = Arc::new(InMemoryStore::new(Arc::new(test_clock())));
    let event = repository.insert_event(draft()).await.unwrap();
    let notifier = RecordingNotifier::new();
    let store = checkout_store(repository.clone(), notifier.clone());

    let checkout_id = reach_review(&store, event.clone()).await;
    let result = submit(&store, checkout_id).await;

    let CheckoutAction::Submitted { confirmation, .. } = result else {
        panic!("expected Submitted, got {result:?}");
    };
    assert_eq!(confirmation.quantity, 2);
    assert_eq!(confirmation.total, Money::from_cents(6000));
    assert!(confirmation.email_delivered);

    let reservations = repository.list_reservations().await.unwrap();
    assert_eq!(reservations.len(), 1);
    let stored = &reservations[0];
    assert_eq!(stored.id, confirmation.reservation_id);
    assert_eq!(stored.event_id, event.id);
    assert_eq!(stored.status, ReservationStatus::Pending);
    assert_eq!(stored.company.as_deref(), Some("Fondateurs & Co"));
    assert_eq!(stored.ticket_details.get(&TicketKind::Standard), Some(&1));
    assert_eq!(stored.ticket_details.get(&TicketKind::Vip), Some(&1));
    assert_eq!(stored.created_at, test_clock().now());

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].email, "claire.martin@example.com");
    assert_eq!(sent[0].event_title, "Soirée Networking Tech");

    let session = store.state(|s| s.session(&checkout_id).cloned()).await.unwrap();
    assert_eq!(session.wizard.step(), WizardStep::Submitted);
    assert!(!session.in_flight);
}

#[tokio::test]
async fn email_failure_keeps_the_reservation() {
    let repository = Arc::new(InMemoryStore::new(Arc::new(test_clock())));
    let event = repository.insert_event(draft()).await.unwrap();
    let notifier = RecordingNotifier::new();
    notifier.fail_with(MailError::Transport("relay refused".to_string()));
    let store = checkout_store(repository.clone(), notifier.clone());

    let checkout_id = reach_review(&store, event).await;
    let result = submit(&store, checkout_id).await;

    let CheckoutAction::Submitted { confirmation, .. } = result else {
        panic!("expected Submitted, got {result:?}");
    };
    assert!(!confirmation.email_delivered);
    assert_eq!(repository.reservation_count(), 1);
    assert!(notifier.sent().is_empty());
}

#[tokio::test]
async fn storage_failure_stays_on_review() {
    let repository = Arc::new(InMemoryStore::new(Arc::new(test_clock())));
    let notifier = RecordingNotifier::new();
    let store = checkout_store(repository.clone(), notifier.clone());

    // Never inserted: the repository refuses the reservation.
    let ghost = Event::from_draft(EventId::new(), draft(), test_clock().now());
    let checkout_id = reach_review(&store, ghost).await;
    let result = submit(&store, checkout_id).await;

    assert!(matches!(result, CheckoutAction::SubmitFailed { .. }), "got {result:?}");
    assert_eq!(repository.reservation_count(), 0);
    assert!(notifier.sent().is_empty());

    let session = store.state(|s| s.session(&checkout_id).cloned()).await.unwrap();
    assert_eq!(session.wizard.step(), WizardStep::Review);
    assert!(!session.in_flight);
    assert_eq!(session.confirmation, None);
}

#[tokio::test]
async fn submit_before_review_is_rejected() {
    let repository = Arc::new(InMemoryStore::new(Arc::new(test_clock())));
    let event = repository.insert_event(draft()).await.unwrap();
    let store = checkout_store(repository.clone(), RecordingNotifier::new());
    let checkout_id = CheckoutId::new();

    let mut handle = store
        .send(CheckoutAction::Start {
            checkout_id,
            event: Box::new(event),
        })
        .await
        .unwrap();
    handle.wait_with_timeout(TIMEOUT).await.unwrap();

    let result = submit(&store, checkout_id).await;

    assert!(
        matches!(
            result,
            CheckoutAction::Rejected {
                reason: CheckoutError::InvalidStep { .. },
                ..
            }
        ),
        "got {result:?}"
    );
    assert_eq!(repository.reservation_count(), 0);
}

#[tokio::test]
async fn two_checkouts_for_one_event_are_independent() {
    let repository = Arc::new(InMemoryStore::new(Arc::new(test_clock())));
    let event = repository.insert_event(draft()).await.unwrap();
    let store = checkout_store(repository.clone(), RecordingNotifier::new());

    let first = reach_review(&store, event.clone()).await;
    let second = reach_review(&store, event).await;

    let result = submit(&store, first).await;
    assert!(matches!(result, CheckoutAction::Submitted { .. }));

    let second_step = store.state(|s| s.session(&second).map(|session| session.wizard.step())).await;
    assert_eq!(second_step, Some(WizardStep::Review));
    assert_eq!(repository.reservation_count(), 1);
}

#[tokio::test]
async fn two_submits_of_one_checkout_get_their_own_result() {
    let repository = Arc::new(InMemoryStore::new(Arc::new(test_clock())));
    let event = repository.insert_event(draft()).await.unwrap();
    let store = checkout_store(repository.clone(), RecordingNotifier::new());
    let checkout_id = reach_review(&store, event).await;

    let (first, second) = tokio::join!(submit(&store, checkout_id), submit(&store, checkout_id));

    let outcomes = [&first, &second];
    assert_eq!(
        outcomes.iter().filter(|a| matches!(a, CheckoutAction::Submitted { .. })).count(),
        1,
        "got {first:?} and {second:?}"
    );
    // In flight, or already submitted, depending on scheduling.
    assert_eq!(
        outcomes
            .iter()
            .filter(|a| matches!(
                a,
                CheckoutAction::Rejected {
                    reason: CheckoutError::SubmissionInFlight | CheckoutError::InvalidStep { .. },
                    ..
                }
            ))
            .count(),
        1,
        "got {first:?} and {second:?}"
    );
    assert_eq!(repository.reservation_count(), 1);
}
