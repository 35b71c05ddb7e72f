//! Business metrics for billetterie.
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `billetterie_reservations_total{status}` - Reservations stored, then moderated
//! - `billetterie_tickets_booked_total` - Tickets in stored reservations
//! - `billetterie_events_total{op}` - Admin event mutations (created, updated, deleted)
//! - `billetterie_emails_total{outcome}` - Confirmation emails (sent, failed)
//! - `billetterie_geocoding_total{outcome}` - Address lookups (found, not_found, failed)
//!
//! Store execution counters (`store.*`) come from the runtime crate.

use crate::types::ReservationStatus;
use metrics::describe_counter;

/// Initialize and register all business metrics descriptions.
///
/// This should be called once at application startup, before any metrics are recorded.
pub fn register_business_metrics() {
    describe_counter!(
        "billetterie_reservations_total",
        "Reservations by status (pending on creation, approved/rejected on moderation)"
    );
    describe_counter!(
        "billetterie_tickets_booked_total",
        "Total number of tickets in stored reservations"
    );
    describe_counter!(
        "billetterie_events_total",
        "Admin event mutations by operation (created, updated, deleted)"
    );
    describe_counter!(
        "billetterie_emails_total",
        "Booking confirmation emails by outcome (sent, failed)"
    );
    describe_counter!(
        "billetterie_geocoding_total",
        "Address lookups by outcome (found, not_found, failed)"
    );

    tracing::info!("Business metrics registered");
}

// ============================================================================
// Metric Recording Functions
// ============================================================================

/// Record a reservation entering `status`.
pub fn record_reservation(status: ReservationStatus, quantity: u32) {
    metrics::counter!("billetterie_reservations_total", "status" => status.as_str()).increment(1);
    if status == ReservationStatus::Pending {
        metrics::counter!("billetterie_tickets_booked_total").increment(u64::from(quantity));
    }
    tracing::debug!(%status, quantity, "Recorded reservation metric");
}

/// Record an admin event mutation (`created`, `updated`, `deleted`).
pub fn record_event_mutation(op: &'static str) {
    metrics::counter!("billetterie_events_total", "op" => op).increment(1);
    tracing::debug!(op, "Recorded event mutation metric");
}

/// Record a confirmation email outcome (`sent`, `failed`).
pub fn record_email(outcome: &'static str) {
    metrics::counter!("billetterie_emails_total", "outcome" => outcome).increment(1);
    tracing::debug!(outcome, "Recorded email metric");
}

/// Record a geocoding outcome (`found`, `not_found`, `failed`).
pub fn record_geocoding(outcome: &'static str) {
    metrics::counter!("billetterie_geocoding_total", "outcome" => outcome).increment(1);
    tracing::debug!(outcome, "Recorded geocoding metric");
}
