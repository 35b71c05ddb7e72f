//! HTTP tests for the public and admin API.
//!
//! The router runs against in-memory repositories, a recording notifier and
//! a static geocoder, and is driven with `tower::ServiceExt::oneshot`.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use billetterie::admin::notices;
use billetterie::api::checkout::{BOOKING_CONFIRMED, NOT_ACCESSIBLE_DIRECTLY};
use billetterie::app::{build_state, AppSettings, Services};
use billetterie::auth::setup::memory_auth_environment;
use billetterie::geocoding::StaticGeocoder;
use billetterie::server::build_router;
use billetterie::store::{EventRepository, InMemoryStore, ReservationRepository};
use billetterie::types::{ContactDetails, Coordinates, Event, EventDraft, Money, NewReservation, TicketKind};
use billetterie_auth::stores::InMemoryAdminDirectory;
use billetterie_auth::{AuthConfig, GuardPolicy};
use billetterie_mail::RecordingNotifier;
use billetterie_testing::test_clock;
use chrono::{NaiveDate, NaiveTime};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

const ADMIN_EMAIL: &str = "admin@soirees-entrepreneurs.com";
const ADMIN_PASSWORD: &str = "correct horse battery staple";

// ============================================================================
// Test Fixtures
// ============================================================================

struct TestApp {
    router: Router,
    store: Arc<InMemoryStore>,
    notifier: RecordingNotifier,
}

impl TestApp {
    fn new(policy: GuardPolicy) -> Self {
        let clock = Arc::new(test_clock());
        let store = Arc::new(InMemoryStore::new(clock.clone()));
        let notifier = RecordingNotifier::new();
        let geocoder = StaticGeocoder::new().with_place(
            "10 rue de Rivoli, Paris",
            Coordinates {
                latitude: 48.8556,
                longitude: 2.3601,
            },
        );
        let directory = InMemoryAdminDirectory::with_admin(ADMIN_EMAIL, ADMIN_PASSWORD).unwrap();

        let services = Services {
            events: store.clone(),
            reservations: store.clone(),
            auth: memory_auth_environment(directory, clock, AuthConfig::new(policy)),
            notifier: Arc::new(notifier.clone()),
            geocoder: Arc::new(geocoder),
        };
        let settings = AppSettings {
            request_timeout: Duration::from_secs(5),
            ..AppSettings::default()
        };
        let state = build_state(services, settings);

        Self {
            router: build_router(state),
            store,
            notifier,
        }
    }

    async fn request(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None, None).await
    }

    async fn post(&self, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.request(Method::POST, uri, None, body).await
    }

    async fn login(&self) -> String {
        let (status, body) = self
            .post(
                "/api/admin/login",
                Some(json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["token"].as_str().unwrap().to_string()
    }

    async fn seed_event(&self, title: &str, price_cents: u64) -> Event {
        self.store.insert_event(event_draft(title, price_cents)).await.unwrap()
    }
}

fn event_draft(title: &str, price_cents: u64) -> EventDraft {
    EventDraft {
        title: title.to_string(),
        description: "Rencontres entre fondateurs".to_string(),
        date: NaiveDate::from_ymd_opt(2025, 3, 15).unwrap(),
        time: NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
        price: Money::from_cents(price_cents),
        vip_price: Some(Money::from_cents(4500)),
        max_participants: 80,
        logo_url: None,
        address: "10 rue de Rivoli, Paris".to_string(),
        latitude: Some(48.8556),
        longitude: Some(2.3601),
    }
}

fn json_post(uri: &str, correlation_id: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("X-Correlation-ID", correlation_id)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn event_form(title: &str) -> Value {
    json!({
        "title": title,
        "description": "Rencontres entre fondateurs",
        "date": "2025-04-10",
        "time": "18:30",
        "price": "15",
        "vip_price": "",
        "max_participants": "60",
        "logo_url": "",
        "address": "10 rue de Rivoli, Paris",
        "latitude": "",
        "longitude": ""
    })
}

fn contact() -> Value {
    json!({
        "first_name": "Claire",
        "last_name": "Martin",
        "email": "claire.martin@example.com",
        "phone": "06 12 34 56 78"
    })
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn health_and_readiness() {
    let app = TestApp::new(GuardPolicy::Verified);

    let (status, _) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.get("/ready").await;
    assert_eq!(status, StatusCode::OK, "{body}");
}

// ============================================================================
// Public events
// ============================================================================

#[tokio::test]
async fn lists_events_and_details() {
    let app = TestApp::new(GuardPolicy::Verified);
    let event = app.seed_event("Soirée Networking Tech", 1500).await;

    let (status, body) = app.get("/api/events").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["events"][0]["title"], "Soirée Networking Tech");

    let (status, body) = app.get(&format!("/api/events/{}", event.id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["price"], 1500);
    assert_eq!(body["tickets"].as_array().unwrap().len(), 2);

    let (status, body) = app.get(&format!("/api/events/{}/map", event.id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["zoom"], 15);
    assert_eq!(body["markers"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_event_is_not_found() {
    let app = TestApp::new(GuardPolicy::Verified);

    let (status, body) = app.get(&format!("/api/events/{}", uuid::Uuid::new_v4())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

// ============================================================================
// Checkout
// ============================================================================

#[tokio::test]
async fn checkout_books_two_standard_tickets() {
    let app = TestApp::new(GuardPolicy::Verified);
    let event = app.seed_event("Soirée Networking Tech", 1500).await;

    let (status, body) = app.post(&format!("/api/events/{}/checkout", event.id), None).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["step"], "select_tickets");
    let checkout = body["checkout_id"].as_str().unwrap().to_string();
    let base = format!("/api/checkout/{checkout}");

    for _ in 0..2 {
        let (status, _) = app
            .post(&format!("{base}/tickets"), Some(json!({ "kind": "standard", "delta": 1 })))
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = app.post(&format!("{base}/next"), None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["step"], "enter_contact");
    assert_eq!(body["total"], 3000);

    let (status, _) = app
        .request(Method::PUT, &format!("{base}/contact"), None, Some(contact()))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.post(&format!("{base}/next"), None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["step"], "review");

    let (status, body) = app.post(&format!("{base}/submit"), None).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["message"], BOOKING_CONFIRMED);
    assert_eq!(body["confirmation"]["quantity"], 2);
    assert_eq!(body["confirmation"]["total"], 3000);
    assert_eq!(body["confirmation"]["email_delivered"], true);

    let reservations = app.store.list_reservations().await.unwrap();
    assert_eq!(reservations.len(), 1);
    assert_eq!(reservations[0].total_price, Money::from_cents(3000));
    assert_eq!(reservations[0].ticket_details.get(&TicketKind::Standard), Some(&2));
    assert_eq!(app.notifier.sent().len(), 1);
    assert_eq!(app.notifier.sent()[0].email, "claire.martin@example.com");

    let (status, body) = app.get(&format!("/api/confirmation/{checkout}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["confirmation"]["event_title"], "Soirée Networking Tech");
}

#[tokio::test]
async fn next_without_tickets_keeps_the_step() {
    let app = TestApp::new(GuardPolicy::Verified);
    let event = app.seed_event("Soirée Networking Tech", 1500).await;

    let (_, body) = app.post(&format!("/api/events/{}/checkout", event.id), None).await;
    let checkout = body["checkout_id"].as_str().unwrap().to_string();

    let (status, body) = app.post(&format!("/api/checkout/{checkout}/next"), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, body) = app.get(&format!("/api/checkout/{checkout}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["step"], "select_tickets");
    assert_eq!(body["can_advance"], false);
}

#[tokio::test]
async fn ticket_counts_never_go_negative() {
    let app = TestApp::new(GuardPolicy::Verified);
    let event = app.seed_event("Soirée Networking Tech", 1500).await;

    let (_, body) = app.post(&format!("/api/events/{}/checkout", event.id), None).await;
    let checkout = body["checkout_id"].as_str().unwrap().to_string();

    let (status, body) = app
        .post(
            &format!("/api/checkout/{checkout}/tickets"),
            Some(json!({ "kind": "vip", "delta": -1 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_quantity"], 0);
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn abandoned_checkout_is_gone() {
    let app = TestApp::new(GuardPolicy::Verified);
    let event = app.seed_event("Soirée Networking Tech", 1500).await;

    let (_, body) = app.post(&format!("/api/events/{}/checkout", event.id), None).await;
    let checkout = body["checkout_id"].as_str().unwrap().to_string();

    let (status, _) = app
        .request(Method::DELETE, &format!("/api/checkout/{checkout}"), None, None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.get(&format!("/api/checkout/{checkout}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn confirmation_without_checkout_falls_back() {
    let app = TestApp::new(GuardPolicy::Verified);

    let (status, body) = app.get(&format!("/api/confirmation/{}", uuid::Uuid::new_v4())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], NOT_ACCESSIBLE_DIRECTLY);
    assert_eq!(body["home"], "/");
}

// ============================================================================
// Admin authentication
// ============================================================================

#[tokio::test]
async fn admin_routes_require_a_session() {
    let app = TestApp::new(GuardPolicy::Verified);

    let (status, _) = app.get("/api/admin/dashboard").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .request(Method::GET, "/api/admin/dashboard", Some("forged-token"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn presence_only_accepts_any_token() {
    let app = TestApp::new(GuardPolicy::PresenceOnly);

    let (status, _) = app.get("/api/admin/dashboard").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .request(Method::GET, "/api/admin/dashboard", Some("anything"), None)
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
}

#[tokio::test]
async fn login_session_and_logout() {
    let app = TestApp::new(GuardPolicy::Verified);

    let (status, _) = app
        .post(
            "/api/admin/login",
            Some(json!({ "email": ADMIN_EMAIL, "password": "wrong" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .post("/api/admin/login", Some(json!({ "email": "", "password": "" })))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let token = app.login().await;

    let (status, body) = app
        .request(Method::GET, "/api/admin/session", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], ADMIN_EMAIL);

    let (status, _) = app
        .request(Method::POST, "/api/admin/logout", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .request(Method::GET, "/api/admin/session", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Admin dashboard
// ============================================================================

#[tokio::test]
async fn dashboard_lists_events_and_reservations() {
    let app = TestApp::new(GuardPolicy::Verified);
    let token = app.login().await;
    app.seed_event("Soirée Networking Tech", 1500).await;

    let (status, body) = app
        .request(Method::GET, "/api/admin/dashboard?tab=reservations", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["admin"], ADMIN_EMAIL);
    assert_eq!(body["active_tab"], "reservations");
    assert_eq!(body["events"].as_array().unwrap().len(), 1);

    let (status, _) = app
        .request(Method::GET, "/api/admin/dashboard?tab=billing", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn admin_event_lifecycle() {
    let app = TestApp::new(GuardPolicy::Verified);
    let token = app.login().await;

    let (status, body) = app
        .request(Method::POST, "/api/admin/events", Some(&token), Some(event_form("Afterwork Fintech")))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["notice"]["message"], notices::EVENT_CREATED);
    assert_eq!(body["event"]["price"], 1500);
    let id = body["event"]["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .request(Method::POST, "/api/admin/events", Some(&token), Some(event_form("  ")))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(app.store.event_count(), 1);

    let (status, body) = app
        .request(
            Method::PUT,
            &format!("/api/admin/events/{id}"),
            Some(&token),
            Some(event_form("Afterwork Fintech #2")),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["notice"]["message"], notices::EVENT_UPDATED);
    assert_eq!(body["events"][0]["title"], "Afterwork Fintech #2");

    let (status, _) = app
        .request(Method::DELETE, &format!("/api/admin/events/{id}"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(app.store.event_count(), 1);

    let (status, body) = app
        .request(
            Method::DELETE,
            &format!("/api/admin/events/{id}?confirm=true"),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["notice"]["message"], notices::EVENT_DELETED);
    assert!(body["events"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn reservations_are_moderated_once() {
    let app = TestApp::new(GuardPolicy::Verified);
    let token = app.login().await;
    let event = app.seed_event("Soirée Networking Tech", 1500).await;
    let reservation = app
        .store
        .insert_reservation(NewReservation {
            event_id: event.id,
            contact: ContactDetails {
                first_name: "Claire".to_string(),
                last_name: "Martin".to_string(),
                email: "claire.martin@example.com".to_string(),
                phone: "06 12 34 56 78".to_string(),
                company: None,
            },
            quantity: 1,
            total_price: Money::from_cents(1500),
            ticket_details: BTreeMap::from([(TicketKind::Standard, 1), (TicketKind::Vip, 0)]),
        })
        .await
        .unwrap();
    let uri = format!("/api/admin/reservations/{}/approve", reservation.id);

    let (status, body) = app.request(Method::POST, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["notice"]["message"], notices::STATUS_UPDATED);
    assert_eq!(body["reservation"]["status"], "approved");

    let (status, _) = app.request(Method::POST, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .request(
            Method::DELETE,
            &format!("/api/admin/events/{}?confirm=true", event.id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn geocoding_an_address() {
    let app = TestApp::new(GuardPolicy::Verified);
    let token = app.login().await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/admin/geocode",
            Some(&token),
            Some(json!({ "address": "10 Rue de Rivoli, Paris " })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["message"], "Adresse localisée avec succès");
    assert_eq!(body["latitude"], 48.8556);

    let (status, body) = app
        .request(
            Method::POST,
            "/api/admin/geocode",
            Some(&token),
            Some(json!({ "address": "Nulle part" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Adresse non trouvée");

    let (status, _) = app
        .request(Method::POST, "/api/admin/geocode", Some(&token), Some(json!({ "address": " " })))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

// ============================================================================
// Concurrent requests
// ============================================================================

const SHARED_CORRELATION_ID: &str = "11111111-1111-1111-1111-111111111111";

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_logins_sharing_a_correlation_id_get_their_own_answer() {
    let app = TestApp::new(GuardPolicy::Verified);

    for _ in 0..20 {
        let good = json_post(
            "/api/admin/login",
            SHARED_CORRELATION_ID,
            &json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }),
        );
        let bad = json_post(
            "/api/admin/login",
            SHARED_CORRELATION_ID,
            &json!({ "email": ADMIN_EMAIL, "password": "wrong-password" }),
        );

        let ((good_status, good_body), (bad_status, bad_body)) = tokio::join!(app.send(good), app.send(bad));

        assert_eq!(good_status, StatusCode::OK, "{good_body}");
        assert!(good_body["token"].as_str().is_some_and(|t| !t.is_empty()));
        assert_eq!(bad_status, StatusCode::UNAUTHORIZED, "{bad_body}");
        assert!(bad_body.get("token").is_none());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_ticket_changes_on_one_checkout_get_their_own_outcome() {
    let app = TestApp::new(GuardPolicy::Verified);
    let mut draft = event_draft("Atelier sans VIP", 1500);
    draft.vip_price = None;
    let event = app.store.insert_event(draft).await.unwrap();

    let (status, body) = app.post(&format!("/api/events/{}/checkout", event.id), None).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let uri = format!("/api/checkout/{}/tickets", body["checkout_id"].as_str().unwrap());

    for round in 1..=25u64 {
        let standard = json_post(&uri, SHARED_CORRELATION_ID, &json!({ "kind": "standard", "delta": 1 }));
        let vip = json_post(&uri, SHARED_CORRELATION_ID, &json!({ "kind": "vip", "delta": 1 }));

        let ((standard_status, standard_body), (vip_status, vip_body)) =
            tokio::join!(app.send(standard), app.send(vip));

        assert_eq!(standard_status, StatusCode::OK, "round {round}: {standard_body}");
        assert_eq!(vip_status, StatusCode::UNPROCESSABLE_ENTITY, "round {round}: {vip_body}");
        assert_eq!(vip_body["code"], "VALIDATION_ERROR");
    }

    let (_, body) = app.get(&uri.replace("/tickets", "")).await;
    assert_eq!(body["total_quantity"], 25);
}
