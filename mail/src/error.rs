//! Mail delivery errors.

use thiserror::Error;

/// Result type alias for mail operations.
pub type Result<T> = std::result::Result<T, MailError>;

/// Why a confirmation email was not delivered.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MailError {
    /// Sender or recipient address could not be parsed.
    #[error("Invalid address {address}: {reason}")]
    InvalidAddress {
        /// The offending address.
        address: String,
        /// Parser message.
        reason: String,
    },

    /// The message could not be assembled.
    #[error("Failed to build email: {0}")]
    Build(String),

    /// The SMTP relay refused or the connection failed.
    #[error("Failed to send email: {0}")]
    Transport(String),

    /// Provider misconfigured (e.g. `smtp` without a server).
    #[error("Mail configuration error: {0}")]
    Config(String),
}
