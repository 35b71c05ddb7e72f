//! # Billetterie Mail
//!
//! Booking confirmation emails behind a single [`BookingNotifier`] interface.
//!
//! | Provider | Type | Use |
//! |---|---|---|
//! | `smtp` | [`SmtpNotifier`] | production (lettre) |
//! | `console` | [`ConsoleNotifier`] | local runs, logs the message |
//! | `disabled` | [`DisabledNotifier`] | sends nothing |
//! | – | [`RecordingNotifier`] | tests |

pub mod config;
pub mod confirmation;
pub mod error;
pub mod notifier;
pub mod smtp;
pub mod template;

pub use config::{build_notifier, MailConfig, MailProvider};
pub use confirmation::BookingConfirmation;
pub use error::{MailError, Result};
pub use notifier::{BookingNotifier, ConsoleNotifier, DisabledNotifier, RecordingNotifier};
pub use smtp::{SmtpNotifier, SmtpSettings};
