//! The data a booking confirmation email is rendered from.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// A confirmed booking, as seen by the mail layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingConfirmation {
    /// Recipient address.
    pub email: String,
    /// Booker first name.
    pub first_name: String,
    /// Booker last name.
    pub last_name: String,
    /// Event title.
    pub event_title: String,
    /// Event day.
    pub event_date: NaiveDate,
    /// Event start time.
    pub event_time: NaiveTime,
    /// Number of tickets booked.
    pub quantity: u32,
    /// Amount due, in cents.
    pub total_cents: u64,
}

impl BookingConfirmation {
    /// Total formatted as euros with two decimals, e.g. `30.00€`.
    #[must_use]
    pub fn formatted_total(&self) -> String {
        format!("{}.{:02}€", self.total_cents / 100, self.total_cents % 100)
    }

    /// Event date in French order, e.g. `15/03/2025`.
    #[must_use]
    pub fn formatted_date(&self) -> String {
        self.event_date.format("%d/%m/%Y").to_string()
    }

    /// Event time as `HH:MM`.
    #[must_use]
    pub fn formatted_time(&self) -> String {
        self.event_time.format("%H:%M").to_string()
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::confirmation;

    #[test]
    fn formats_for_french_readers() {
        let confirmation = confirmation();
        assert_eq!(confirmation.formatted_total(), "30.00€");
        assert_eq!(confirmation.formatted_date(), "15/03/2025");
        assert_eq!(confirmation.formatted_time(), "19:00");
    }

    #[test]
    fn cents_are_zero_padded() {
        let mut confirmation = confirmation();
        confirmation.total_cents = 1505;
        assert_eq!(confirmation.formatted_total(), "15.05€");
    }
}
