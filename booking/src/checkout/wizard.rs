//! The three-step checkout of one visitor.
//!
//! ```text
//! SelectTickets ──next──▶ EnterContact ──next──▶ Review ──submit──▶ Submitted
//!       ◀──back──              ◀──back──
//! ```
//!
//! Guards live here; the reducer only routes actions to the right wizard.

use crate::types::{ContactDetails, Event, Money, NewReservation, TicketCatalog, TicketKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Most tickets of one kind a single checkout may hold.
pub const MAX_TICKETS_PER_KIND: u32 = 100;

/// Wizard position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    /// Choose ticket quantities
    SelectTickets,
    /// Enter visitor details
    EnterContact,
    /// Check the summary before submitting
    Review,
    /// Reservation stored (terminal)
    Submitted,
}

impl WizardStep {
    /// 1-based step number shown in the progress bar.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::SelectTickets => 1,
            Self::EnterContact => 2,
            Self::Review => 3,
            Self::Submitted => 4,
        }
    }

    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SelectTickets => "select_tickets",
            Self::EnterContact => "enter_contact",
            Self::Review => "review",
            Self::Submitted => "submitted",
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a checkout command was refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    /// The event does not sell this ticket type.
    #[error("Ticket type not on sale for this event: {0}")]
    TicketNotOffered(TicketKind),

    /// The change would exceed [`MAX_TICKETS_PER_KIND`].
    #[error("At most {max} tickets of type {kind} per reservation")]
    TooManyTickets {
        /// Ticket kind
        kind: TicketKind,
        /// Per-kind limit
        max: u32,
    },

    /// Advancing from ticket selection with nothing selected.
    #[error("Select at least one ticket")]
    NoTickets,

    /// Advancing from contact entry with blank required fields.
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingContact(Vec<String>),

    /// The command does not apply at the current step.
    #[error("Cannot {action} at step {step}")]
    InvalidStep {
        /// Refused command
        action: &'static str,
        /// Step the wizard is on
        step: WizardStep,
    },

    /// A submission for this checkout is still running.
    #[error("Submission already in progress")]
    SubmissionInFlight,

    /// No checkout with this id.
    #[error("Checkout not found")]
    NotFound,

    /// The reservation could not be stored.
    #[error("Erreur lors de la réservation: {0}")]
    SubmissionFailed(String),
}

/// One line of the ticket selection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketLine {
    /// Ticket kind
    pub kind: TicketKind,
    /// Display label
    pub label: String,
    /// Display description
    pub description: String,
    /// Price of one ticket
    pub unit_price: Money,
    /// Selected count
    pub quantity: u32,
    /// `unit_price × quantity`
    pub subtotal: Money,
}

/// Checkout of one visitor for one event.
#[derive(Clone, Debug, PartialEq)]
pub struct CheckoutWizard {
    event: Event,
    catalog: TicketCatalog,
    step: WizardStep,
    quantities: BTreeMap<TicketKind, u32>,
    contact: ContactDetails,
}

impl CheckoutWizard {
    /// Start a checkout for `event` with nothing selected.
    #[must_use]
    pub fn new(event: Event) -> Self {
        Self {
            catalog: event.catalog(),
            event,
            step: WizardStep::SelectTickets,
            quantities: BTreeMap::new(),
            contact: ContactDetails::default(),
        }
    }

    /// Event being booked.
    #[must_use]
    pub const fn event(&self) -> &Event {
        &self.event
    }

    /// Current step.
    #[must_use]
    pub const fn step(&self) -> WizardStep {
        self.step
    }

    /// Contact details entered so far.
    #[must_use]
    pub const fn contact(&self) -> &ContactDetails {
        &self.contact
    }

    /// Selected count of `kind`.
    #[must_use]
    pub fn quantity(&self, kind: TicketKind) -> u32 {
        self.quantities.get(&kind).copied().unwrap_or(0)
    }

    /// Change the count of `kind` by `delta`, never going below zero.
    ///
    /// Returns the new count.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::InvalidStep`]: not on ticket selection
    /// - [`CheckoutError::TicketNotOffered`]: the event does not sell `kind`
    /// - [`CheckoutError::TooManyTickets`]: the count would exceed [`MAX_TICKETS_PER_KIND`]
    pub fn adjust(&mut self, kind: TicketKind, delta: i32) -> Result<u32, CheckoutError> {
        self.require_step(WizardStep::SelectTickets, "change tickets")?;
        if !self.catalog.offers(kind) {
            return Err(CheckoutError::TicketNotOffered(kind));
        }

        let updated = self.quantity(kind).saturating_add_signed(delta);
        if updated > MAX_TICKETS_PER_KIND {
            return Err(CheckoutError::TooManyTickets {
                kind,
                max: MAX_TICKETS_PER_KIND,
            });
        }
        self.quantities.insert(kind, updated);
        Ok(updated)
    }

    /// Total number of selected tickets.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.quantities.values().fold(0u32, |acc, q| acc.saturating_add(*q))
    }

    /// Amount due, recomputed from the catalog.
    #[must_use]
    pub fn total(&self) -> Money {
        self.lines().iter().fold(Money::ZERO, |acc, line| acc.saturating_add(line.subtotal))
    }

    /// Selection per ticket type on sale, in catalog order.
    #[must_use]
    pub fn lines(&self) -> Vec<TicketLine> {
        self.catalog
            .options()
            .iter()
            .map(|option| {
                let quantity = self.quantity(option.kind);
                TicketLine {
                    kind: option.kind,
                    label: option.label.clone(),
                    description: option.description.clone(),
                    unit_price: option.unit_price,
                    quantity,
                    subtotal: option.unit_price.saturating_mul(quantity),
                }
            })
            .collect()
    }

    /// Count per ticket type on sale, zero counts included.
    #[must_use]
    pub fn ticket_details(&self) -> BTreeMap<TicketKind, u32> {
        self.catalog
            .options()
            .iter()
            .map(|option| (option.kind, self.quantity(option.kind)))
            .collect()
    }

    /// Replace the contact details.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InvalidStep`] once the visitor reached review.
    pub fn set_contact(&mut self, contact: ContactDetails) -> Result<(), CheckoutError> {
        match self.step {
            WizardStep::SelectTickets | WizardStep::EnterContact => {
                self.contact = contact;
                Ok(())
            },
            step => Err(CheckoutError::InvalidStep {
                action: "edit contact details",
                step,
            }),
        }
    }

    /// Whether [`next`](Self::next) would succeed.
    #[must_use]
    pub fn can_advance(&self) -> bool {
        self.advance_guard().is_ok()
    }

    /// Move one step forward.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::NoTickets`]: nothing selected
    /// - [`CheckoutError::MissingContact`]: a required field is blank
    /// - [`CheckoutError::InvalidStep`]: on review (submission is separate) or submitted
    pub fn next(&mut self) -> Result<WizardStep, CheckoutError> {
        self.step = self.advance_guard()?;
        Ok(self.step)
    }

    /// Move one step back. No-op on ticket selection.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InvalidStep`] once submitted.
    pub fn back(&mut self) -> Result<WizardStep, CheckoutError> {
        self.step = match self.step {
            WizardStep::SelectTickets | WizardStep::EnterContact => WizardStep::SelectTickets,
            WizardStep::Review => WizardStep::EnterContact,
            WizardStep::Submitted => {
                return Err(CheckoutError::InvalidStep {
                    action: "go back",
                    step: WizardStep::Submitted,
                });
            },
        };
        Ok(self.step)
    }

    /// The reservation to insert.
    ///
    /// Only from review, with the same guards as the earlier steps.
    ///
    /// # Errors
    ///
    /// Returns the guard that fails.
    pub fn reservation(&self) -> Result<NewReservation, CheckoutError> {
        self.require_step(WizardStep::Review, "submit")?;
        self.tickets_guard()?;
        self.contact_guard()?;

        let company = self
            .contact
            .company
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(ToString::to_string);

        Ok(NewReservation {
            event_id: self.event.id,
            contact: ContactDetails {
                first_name: self.contact.first_name.trim().to_string(),
                last_name: self.contact.last_name.trim().to_string(),
                email: self.contact.email.trim().to_string(),
                phone: self.contact.phone.trim().to_string(),
                company,
            },
            quantity: self.total_quantity(),
            total_price: self.total(),
            ticket_details: self.ticket_details(),
        })
    }

    pub(crate) const fn mark_submitted(&mut self) {
        self.step = WizardStep::Submitted;
    }

    fn advance_guard(&self) -> Result<WizardStep, CheckoutError> {
        match self.step {
            WizardStep::SelectTickets => self.tickets_guard().map(|()| WizardStep::EnterContact),
            WizardStep::EnterContact => self.contact_guard().map(|()| WizardStep::Review),
            step => Err(CheckoutError::InvalidStep { action: "advance", step }),
        }
    }

    fn tickets_guard(&self) -> Result<(), CheckoutError> {
        if self.total_quantity() == 0 {
            Err(CheckoutError::NoTickets)
        } else {
            Ok(())
        }
    }

    fn contact_guard(&self) -> Result<(), CheckoutError> {
        let missing = self.contact.missing_fields();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(CheckoutError::MissingContact(missing.into_iter().map(String::from).collect()))
        }
    }

    fn require_step(&self, expected: WizardStep, action: &'static str) -> Result<(), CheckoutError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(CheckoutError::InvalidStep { action, step: self.step })
        }
    }
}
