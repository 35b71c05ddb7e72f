//! Domain types for event ticketing.
//!
//! Value objects (identifiers, [`Money`], [`TicketKind`]) and the two
//! persisted entities, [`Event`] and [`Reservation`].

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for an event
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(Uuid);

impl EventId {
    /// Creates a new random `EventId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an `EventId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a reservation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReservationId(Uuid);

impl ReservationId {
    /// Creates a new random `ReservationId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `ReservationId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ReservationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ReservationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of one visitor checkout.
///
/// Two visitors booking the same event get two checkouts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CheckoutId(Uuid);

impl CheckoutId {
    /// Creates a new random `CheckoutId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `CheckoutId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for CheckoutId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CheckoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Value Objects
// ============================================================================

/// Money amount in cents.
///
/// Serialized as the integer number of cents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    /// Zero.
    pub const ZERO: Self = Self(0);

    /// Creates a `Money` value from cents
    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Returns the amount in cents
    #[must_use]
    pub const fn cents(&self) -> u64 {
        self.0
    }

    /// Checks if the amount is zero
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Adds two money amounts with overflow checking
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(result) => Some(Self(result)),
            None => None,
        }
    }

    /// Adds two money amounts, saturating at the numeric bound
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Multiplies by a ticket count, saturating at the numeric bound
    #[must_use]
    pub fn saturating_mul(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(u64::from(quantity)))
    }

    /// Parse a decimal amount as typed in a form.
    ///
    /// Accepts `"15"`, `"15.5"`, `"15.50"` and the comma form `"15,50"`.
    /// Rejects signs, more than two decimals and anything non-numeric.
    #[must_use]
    pub fn parse_decimal(input: &str) -> Option<Self> {
        let input = input.trim();
        let (units, fraction) = match input.find(['.', ',']) {
            Some(idx) => (&input[..idx], &input[idx + 1..]),
            None => (input, ""),
        };

        if units.is_empty() && fraction.is_empty() {
            return None;
        }
        if !units.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if fraction.len() > 2 {
            return None;
        }

        let units: u64 = if units.is_empty() { 0 } else { units.parse().ok()? };
        let fraction: u64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<u64>().ok()? * 10,
            _ => fraction.parse().ok()?,
        };

        units.checked_mul(100)?.checked_add(fraction).map(Self)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// Ticket types on sale for an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketKind {
    /// General admission, priced at the event price.
    Standard,
    /// Privilege area with networking cocktail.
    Vip,
}

impl TicketKind {
    /// All kinds, in display order.
    pub const ALL: [Self; 2] = [Self::Standard, Self::Vip];

    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Vip => "vip",
        }
    }

    /// Label shown to visitors.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Standard => "Entrée seule",
            Self::Vip => "Carré privilège",
        }
    }

    /// One-line description shown under the label.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Standard => "Accès à l'événement",
            Self::Vip => "Accès privilégié + Cocktail networking",
        }
    }
}

impl fmt::Display for TicketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "vip" => Ok(Self::Vip),
            other => Err(format!("unknown ticket kind: {other}")),
        }
    }
}

/// One purchasable ticket type with its unit price.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketOption {
    /// Ticket kind
    pub kind: TicketKind,
    /// Display label
    pub label: String,
    /// Display description
    pub description: String,
    /// Price of one ticket
    pub unit_price: Money,
}

/// Ticket types on sale for one event.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TicketCatalog {
    options: Vec<TicketOption>,
}

impl TicketCatalog {
    /// Catalog of `event`: the standard ticket at the event price, plus the
    /// privilege ticket when the event has a VIP price.
    #[must_use]
    pub fn for_event(event: &Event) -> Self {
        let mut options = vec![TicketOption::new(TicketKind::Standard, event.price)];
        if let Some(vip_price) = event.vip_price {
            options.push(TicketOption::new(TicketKind::Vip, vip_price));
        }
        Self { options }
    }

    /// Unit price of `kind`, `None` when the kind is not on sale.
    #[must_use]
    pub fn unit_price(&self, kind: TicketKind) -> Option<Money> {
        self.options.iter().find(|o| o.kind == kind).map(|o| o.unit_price)
    }

    /// Whether `kind` is on sale.
    #[must_use]
    pub fn offers(&self, kind: TicketKind) -> bool {
        self.unit_price(kind).is_some()
    }

    /// Options in display order.
    #[must_use]
    pub fn options(&self) -> &[TicketOption] {
        &self.options
    }
}

impl TicketOption {
    fn new(kind: TicketKind, unit_price: Money) -> Self {
        Self {
            kind,
            label: kind.label().to_string(),
            description: kind.description().to_string(),
            unit_price,
        }
    }
}

/// Moderation status of a reservation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    /// Awaiting moderation (every new reservation)
    #[default]
    Pending,
    /// Approved by an admin
    #[serde(alias = "confirmed")]
    Approved,
    /// Rejected by an admin
    #[serde(alias = "cancelled", alias = "canceled")]
    Rejected,
}

impl ReservationStatus {
    /// Stored name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" | "confirmed" => Ok(Self::Approved),
            "rejected" | "cancelled" | "canceled" => Ok(Self::Rejected),
            other => Err(format!("unknown reservation status: {other}")),
        }
    }
}

/// A point on the map.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
}

// ============================================================================
// Entities
// ============================================================================

/// An event open for booking.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Event ID
    pub id: EventId,
    /// Title
    pub title: String,
    /// Free-form description
    pub description: String,
    /// Day of the event
    pub date: NaiveDate,
    /// Start time
    pub time: NaiveTime,
    /// Standard ticket price
    pub price: Money,
    /// Privilege ticket price, `None` when only standard tickets are sold
    pub vip_price: Option<Money>,
    /// Advertised capacity (informational)
    pub max_participants: u32,
    /// Logo image URL
    pub logo_url: Option<String>,
    /// Venue address
    pub address: String,
    /// Venue latitude
    pub latitude: Option<f64>,
    /// Venue longitude
    pub longitude: Option<f64>,
    /// When the event was created
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// Build an event from validated admin input.
    #[must_use]
    pub fn from_draft(id: EventId, draft: EventDraft, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title,
            description: draft.description,
            date: draft.date,
            time: draft.time,
            price: draft.price,
            vip_price: draft.vip_price,
            max_participants: draft.max_participants,
            logo_url: draft.logo_url,
            address: draft.address,
            latitude: draft.latitude,
            longitude: draft.longitude,
            created_at,
        }
    }

    /// Ticket types on sale.
    #[must_use]
    pub fn catalog(&self) -> TicketCatalog {
        TicketCatalog::for_event(self)
    }

    /// Venue position, when both coordinates are known.
    #[must_use]
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates { latitude, longitude }),
            _ => None,
        }
    }
}

/// Validated event fields, ready to insert or update.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventDraft {
    /// Title
    pub title: String,
    /// Description
    pub description: String,
    /// Day of the event
    pub date: NaiveDate,
    /// Start time
    pub time: NaiveTime,
    /// Standard ticket price
    pub price: Money,
    /// Privilege ticket price
    pub vip_price: Option<Money>,
    /// Advertised capacity
    pub max_participants: u32,
    /// Logo image URL
    pub logo_url: Option<String>,
    /// Venue address
    pub address: String,
    /// Venue latitude
    pub latitude: Option<f64>,
    /// Venue longitude
    pub longitude: Option<f64>,
}

/// Visitor contact details collected by the checkout.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContactDetails {
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Email address
    pub email: String,
    /// Phone number
    pub phone: String,
    /// Company (optional)
    #[serde(default)]
    pub company: Option<String>,
}

impl ContactDetails {
    /// Names of the required fields that are empty after trimming.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("email", &self.email),
            ("phone", &self.phone),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

/// A booking.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    /// Reservation ID
    pub id: ReservationId,
    /// Booked event
    pub event_id: EventId,
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Email address
    pub email: String,
    /// Phone number
    pub phone: String,
    /// Company
    pub company: Option<String>,
    /// Total number of tickets
    pub quantity: u32,
    /// Amount due
    pub total_price: Money,
    /// Tickets per kind
    pub ticket_details: BTreeMap<TicketKind, u32>,
    /// Moderation status
    pub status: ReservationStatus,
    /// When the booking was made
    pub created_at: DateTime<Utc>,
}

/// A booking about to be inserted. Always stored as [`ReservationStatus::Pending`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReservation {
    /// Booked event
    pub event_id: EventId,
    /// Visitor details
    pub contact: ContactDetails,
    /// Total number of tickets
    pub quantity: u32,
    /// Amount due
    pub total_price: Money,
    /// Tickets per kind
    pub ticket_details: BTreeMap<TicketKind, u32>,
}

impl NewReservation {
    /// The stored reservation.
    #[must_use]
    pub fn into_reservation(self, id: ReservationId, created_at: DateTime<Utc>) -> Reservation {
        Reservation {
            id,
            event_id: self.event_id,
            first_name: self.contact.first_name,
            last_name: self.contact.last_name,
            email: self.contact.email,
            phone: self.contact.phone,
            company: self.contact.company,
            quantity: self.quantity,
            total_price: self.total_price,
            ticket_details: self.ticket_details,
            status: ReservationStatus::Pending,
            created_at,
        }
    }
}
