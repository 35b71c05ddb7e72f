//! Notifier selection at deployment time.

use crate::error::{MailError, Result};
use crate::notifier::{BookingNotifier, ConsoleNotifier, DisabledNotifier};
use crate::smtp::{SmtpNotifier, SmtpSettings};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

/// Which notifier the deployment uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MailProvider {
    /// Real delivery through an SMTP relay.
    Smtp,
    /// Log the message.
    #[default]
    Console,
    /// Send nothing.
    Disabled,
}

impl FromStr for MailProvider {
    type Err = MailError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "smtp" => Ok(Self::Smtp),
            "console" => Ok(Self::Console),
            "disabled" | "none" => Ok(Self::Disabled),
            other => Err(MailError::Config(format!("unknown mail provider: {other}"))),
        }
    }
}

/// Mail configuration.
#[derive(Debug, Clone)]
pub struct MailConfig {
    /// Selected provider.
    pub provider: MailProvider,
    /// SMTP server (required for [`MailProvider::Smtp`]).
    pub smtp_server: Option<String>,
    /// SMTP port.
    pub smtp_port: u16,
    /// SMTP username.
    pub smtp_username: String,
    /// SMTP password.
    pub smtp_password: String,
    /// Sender address.
    pub from_email: String,
    /// Sender display name.
    pub from_name: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            provider: MailProvider::Console,
            smtp_server: None,
            smtp_port: 465,
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_email: "noreply@soirees-entrepreneurs.com".to_string(),
            from_name: "SoiréesEntrepreneurs".to_string(),
        }
    }
}

/// Build the notifier selected by `config`.
///
/// # Errors
///
/// Returns [`MailError::Config`] when `smtp` is selected without a server.
pub fn build_notifier(config: &MailConfig) -> Result<Arc<dyn BookingNotifier>> {
    let notifier: Arc<dyn BookingNotifier> = match config.provider {
        MailProvider::Smtp => {
            let server = config
                .smtp_server
                .clone()
                .filter(|s| !s.trim().is_empty())
                .ok_or_else(|| MailError::Config("SMTP_SERVER is required for the smtp provider".to_string()))?;

            Arc::new(SmtpNotifier::new(
                SmtpSettings {
                    server,
                    port: config.smtp_port,
                    username: config.smtp_username.clone(),
                    password: config.smtp_password.clone(),
                },
                config.from_email.clone(),
                config.from_name.clone(),
            ))
        },
        MailProvider::Console => Arc::new(ConsoleNotifier::new()),
        MailProvider::Disabled => Arc::new(DisabledNotifier),
    };

    tracing::info!(provider = notifier.name(), "Mail provider selected");
    Ok(notifier)
}
