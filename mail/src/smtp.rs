//! SMTP notifier implementation using Lettre.

use crate::confirmation::BookingConfirmation;
use crate::error::{MailError, Result};
use crate::notifier::BookingNotifier;
use crate::template;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

/// SMTP settings.
#[derive(Clone, Debug)]
pub struct SmtpSettings {
    /// SMTP server address (e.g. `smtp.gmail.com`).
    pub server: String,
    /// SMTP server port (465 for implicit TLS).
    pub port: u16,
    /// Authentication username.
    pub username: String,
    /// Authentication password.
    pub password: String,
}

/// Sends confirmations through an SMTP relay.
///
/// # Examples
///
/// ```ignore
/// use billetterie_mail::{SmtpNotifier, SmtpSettings};
///
/// let notifier = SmtpNotifier::new(
///     SmtpSettings {
///         server: "smtp.gmail.com".to_string(),
///         port: 465,
///         username: "user@gmail.com".to_string(),
///         password: "app_password".to_string(),
///     },
///     "noreply@soirees-entrepreneurs.com".to_string(),
///     "SoiréesEntrepreneurs".to_string(),
/// );
/// ```
#[derive(Clone)]
pub struct SmtpNotifier {
    /// SMTP server address.
    smtp_server: String,

    /// SMTP server port.
    smtp_port: u16,

    /// SMTP credentials.
    credentials: Credentials,

    /// Sender email address.
    from_email: String,

    /// Sender display name.
    from_name: String,
}

impl SmtpNotifier {
    /// Create a new SMTP notifier.
    #[must_use]
    pub fn new(settings: SmtpSettings, from_email: String, from_name: String) -> Self {
        Self {
            smtp_server: settings.server,
            smtp_port: settings.port,
            credentials: Credentials::new(settings.username, settings.password),
            from_email,
            from_name,
        }
    }

    /// Build a transport for one send.
    ///
    /// # Errors
    ///
    /// Returns error if the relay address is invalid.
    fn build_transport(&self) -> Result<SmtpTransport> {
        Ok(SmtpTransport::relay(&self.smtp_server)
            .map_err(|e| MailError::Transport(format!("SMTP relay error: {e}")))?
            .port(self.smtp_port)
            .credentials(self.credentials.clone())
            .build())
    }

    /// The "From" header, e.g. `SoiréesEntrepreneurs <noreply@soirees-entrepreneurs.com>`.
    fn from_header(&self) -> String {
        format!("{} <{}>", self.from_name, self.from_email)
    }

    /// Assemble the message for `confirmation`.
    ///
    /// # Errors
    ///
    /// Returns error if an address does not parse or the body is rejected.
    pub fn build_message(&self, confirmation: &BookingConfirmation) -> Result<Message> {
        let from = self.from_header();
        Message::builder()
            .from(from.parse().map_err(|e: lettre::address::AddressError| {
                MailError::InvalidAddress {
                    address: from.clone(),
                    reason: e.to_string(),
                }
            })?)
            .to(confirmation.email.parse().map_err(|e: lettre::address::AddressError| {
                MailError::InvalidAddress {
                    address: confirmation.email.clone(),
                    reason: e.to_string(),
                }
            })?)
            .subject(template::subject(confirmation))
            .header(ContentType::TEXT_HTML)
            .body(template::render_html(confirmation))
            .map_err(|e| MailError::Build(e.to_string()))
    }
}

#[async_trait]
impl BookingNotifier for SmtpNotifier {
    async fn send_booking_confirmation(&self, confirmation: &BookingConfirmation) -> Result<()> {
        let email = self.build_message(confirmation)?;
        let mailer = self.build_transport()?;

        tokio::task::spawn_blocking(move || {
            mailer
                .send(&email)
                .map_err(|e| MailError::Transport(e.to_string()))
        })
        .await
        .map_err(|e| MailError::Transport(format!("Email task failed: {e}")))?
        .map(|_| ())
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}

impl std::fmt::Debug for SmtpNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpNotifier")
            .field("smtp_server", &self.smtp_server)
            .field("smtp_port", &self.smtp_port)
            .field("from_email", &self.from_email)
            .finish_non_exhaustive()
    }
}
