//! The admin event form, as typed.
//!
//! Every field arrives as text. [`EventForm::parse`] validates the whole form
//! before anything is written.

use crate::types::{Event, EventDraft, Money};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a form was refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    /// A required field is blank.
    #[error("{0} is required")]
    Required(&'static str),

    /// An amount is not a non-negative decimal with at most two decimals.
    #[error("{field}: invalid amount '{value}'")]
    InvalidAmount {
        /// Field name
        field: &'static str,
        /// Rejected input
        value: String,
    },

    /// A number does not parse.
    #[error("{field}: invalid number '{value}'")]
    InvalidNumber {
        /// Field name
        field: &'static str,
        /// Rejected input
        value: String,
    },

    /// Date not in `YYYY-MM-DD` form.
    #[error("date: invalid date '{0}'")]
    InvalidDate(String),

    /// Time not in `HH:MM` form.
    #[error("time: invalid time '{0}'")]
    InvalidTime(String),

    /// A coordinate outside its range.
    #[error("{field}: {value} is out of range")]
    OutOfRange {
        /// Field name
        field: &'static str,
        /// Rejected input
        value: String,
    },

    /// Only one of latitude and longitude was given.
    #[error("latitude and longitude must be given together")]
    IncompleteCoordinates,
}

/// Event fields as entered in the dashboard.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventForm {
    /// Title (required)
    pub title: String,
    /// Description
    pub description: String,
    /// `YYYY-MM-DD` (required)
    pub date: String,
    /// `HH:MM` (required)
    pub time: String,
    /// Standard ticket price, e.g. `15` or `15,50` (required)
    pub price: String,
    /// Privilege ticket price, blank for none
    pub vip_price: String,
    /// Capacity (required)
    pub max_participants: String,
    /// Logo URL, blank for none
    pub logo_url: String,
    /// Venue address (required)
    pub address: String,
    /// Latitude, blank for unknown
    pub latitude: String,
    /// Longitude, blank for unknown
    pub longitude: String,
}

impl EventForm {
    /// The form pre-filled with `event`, as shown when editing.
    #[must_use]
    pub fn from_event(event: &Event) -> Self {
        Self {
            title: event.title.clone(),
            description: event.description.clone(),
            date: event.date.format("%Y-%m-%d").to_string(),
            time: event.time.format("%H:%M").to_string(),
            price: event.price.to_string(),
            vip_price: event.vip_price.map(|p| p.to_string()).unwrap_or_default(),
            max_participants: event.max_participants.to_string(),
            logo_url: event.logo_url.clone().unwrap_or_default(),
            address: event.address.clone(),
            latitude: event.latitude.map(|l| l.to_string()).unwrap_or_default(),
            longitude: event.longitude.map(|l| l.to_string()).unwrap_or_default(),
        }
    }

    /// Validate every field.
    ///
    /// # Errors
    ///
    /// Returns the first [`FormError`] found, in field order.
    pub fn parse(&self) -> Result<EventDraft, FormError> {
        let title = required("title", &self.title)?.to_string();
        let date = parse_date(required("date", &self.date)?)?;
        let time = parse_time(required("time", &self.time)?)?;
        let price = parse_amount("price", required("price", &self.price)?)?;
        let vip_price = optional(&self.vip_price)
            .map(|value| parse_amount("vip_price", value))
            .transpose()?;
        let max_participants = parse_count("max_participants", required("max_participants", &self.max_participants)?)?;
        let address = required("address", &self.address)?.to_string();
        let latitude = optional(&self.latitude)
            .map(|value| parse_coordinate("latitude", value, 90.0))
            .transpose()?;
        let longitude = optional(&self.longitude)
            .map(|value| parse_coordinate("longitude", value, 180.0))
            .transpose()?;

        if latitude.is_some() != longitude.is_some() {
            return Err(FormError::IncompleteCoordinates);
        }

        Ok(EventDraft {
            title,
            description: self.description.trim().to_string(),
            date,
            time,
            price,
            vip_price,
            max_participants,
            logo_url: optional(&self.logo_url).map(ToString::to_string),
            address,
            latitude,
            longitude,
        })
    }
}

fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, FormError> {
    optional(value).ok_or(FormError::Required(field))
}

fn optional(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

fn parse_date(value: &str) -> Result<NaiveDate, FormError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| FormError::InvalidDate(value.to_string()))
}

fn parse_time(value: &str) -> Result<NaiveTime, FormError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| FormError::InvalidTime(value.to_string()))
}

fn parse_amount(field: &'static str, value: &str) -> Result<Money, FormError> {
    Money::parse_decimal(value).ok_or_else(|| FormError::InvalidAmount {
        field,
        value: value.to_string(),
    })
}

fn parse_count(field: &'static str, value: &str) -> Result<u32, FormError> {
    value.parse().map_err(|_| FormError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

fn parse_coordinate(field: &'static str, value: &str, bound: f64) -> Result<f64, FormError> {
    let parsed: f64 = value.replace(',', ".").parse().map_err(|_| FormError::InvalidNumber {
        field,
        value: value.to_string(),
    })?;

    if parsed.is_finite() && (-bound..=bound).contains(&parsed) {
        Ok(parsed)
    } else {
        Err(FormError::OutOfRange {
            field,
            value: value.to_string(),
        })
    }
}
