//! Visitor checkout.
//!
//! [`CheckoutWizard`] holds the guards of the three steps; [`CheckoutReducer`]
//! keeps one wizard per [`CheckoutId`](crate::types::CheckoutId) and turns a
//! submission into a reservation insert followed by the confirmation email.

pub mod reducer;
pub mod wizard;

pub use reducer::{
    CheckoutAction, CheckoutEnvironment, CheckoutReducer, CheckoutRetention, CheckoutSession,
    CheckoutState, CheckoutStore, Confirmation,
};
pub use wizard::{CheckoutError, CheckoutWizard, TicketLine, WizardStep, MAX_TICKETS_PER_KIND};
