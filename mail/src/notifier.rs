//! Booking notifier trait and the built-in implementations.

use crate::confirmation::BookingConfirmation;
use crate::error::{MailError, Result};
use crate::template;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Sends the confirmation email of a booking.
///
/// Object safe so the checkout environment can hold an
/// `Arc<dyn BookingNotifier>` chosen at startup.
#[async_trait]
pub trait BookingNotifier: Send + Sync {
    /// Deliver the confirmation for `confirmation`.
    ///
    /// # Errors
    ///
    /// Returns error if the message cannot be built or delivered.
    async fn send_booking_confirmation(&self, confirmation: &BookingConfirmation) -> Result<()>;

    /// Short provider name for logs and health checks.
    fn name(&self) -> &'static str;
}

/// Logs confirmations instead of sending them.
#[derive(Clone, Debug, Default)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    /// Create a new console notifier.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl BookingNotifier for ConsoleNotifier {
    async fn send_booking_confirmation(&self, confirmation: &BookingConfirmation) -> Result<()> {
        tracing::info!(
            to = %confirmation.email,
            subject = %template::subject(confirmation),
            quantity = confirmation.quantity,
            total = %confirmation.formatted_total(),
            "Booking confirmation (console provider)"
        );
        tracing::debug!(body = %template::render_html(confirmation), "Rendered confirmation");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "console"
    }
}

/// Drops every confirmation.
#[derive(Clone, Debug, Default)]
pub struct DisabledNotifier;

#[async_trait]
impl BookingNotifier for DisabledNotifier {
    async fn send_booking_confirmation(&self, confirmation: &BookingConfirmation) -> Result<()> {
        tracing::debug!(to = %confirmation.email, "Mail disabled, confirmation not sent");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "disabled"
    }
}

/// Captures confirmations in memory. For tests.
#[derive(Clone, Debug, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<BookingConfirmation>>>,
    failure: Arc<Mutex<Option<MailError>>>,
}

impl RecordingNotifier {
    /// Create a notifier that accepts every confirmation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following send fail with `error`.
    pub fn fail_with(&self, error: MailError) {
        if let Ok(mut failure) = self.failure.lock() {
            *failure = Some(error);
        }
    }

    /// Confirmations accepted so far.
    #[must_use]
    pub fn sent(&self) -> Vec<BookingConfirmation> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl BookingNotifier for RecordingNotifier {
    async fn send_booking_confirmation(&self, confirmation: &BookingConfirmation) -> Result<()> {
        let failure = self
            .failure
            .lock()
            .map_err(|_| MailError::Transport("Mutex lock failed".to_string()))?
            .clone();
        if let Some(error) = failure {
            return Err(error);
        }

        self.sent
            .lock()
            .map_err(|_| MailError::Transport("Mutex lock failed".to_string()))?
            .push(confirmation.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::confirmation::fixtures::confirmation;

    #[tokio::test]
    async fn recording_notifier_captures() {
        let notifier = RecordingNotifier::new();
        notifier.send_booking_confirmation(&confirmation()).await.unwrap();

        assert_eq!(notifier.sent(), vec![confirmation()]);
    }

    #[tokio::test]
    async fn recording_notifier_can_fail() {
        let notifier = RecordingNotifier::new();
        notifier.fail_with(MailError::Transport("relay down".to_string()));

        let result = notifier.send_booking_confirmation(&confirmation()).await;

        assert_eq!(result, Err(MailError::Transport("relay down".to_string())));
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn console_and_disabled_always_succeed() {
        assert!(ConsoleNotifier::new().send_booking_confirmation(&confirmation()).await.is_ok());
        assert!(DisabledNotifier.send_booking_confirmation(&confirmation()).await.is_ok());
    }
}
