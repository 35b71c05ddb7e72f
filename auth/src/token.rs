//! Admin session tokens.

use base64::Engine;
use chrono::{DateTime, Utc};

/// Generate an opaque session token.
///
/// 256 random bits encoded as base64url (43 characters).
#[must_use]
pub fn generate_session_token() -> String {
    use rand::RngCore;

    let mut rng = rand::thread_rng();
    let mut random_bytes = [0u8; 32];
    rng.fill_bytes(&mut random_bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(random_bytes)
}

/// Token format of the historical admin client: `base64("{email}:{millis}")`.
///
/// Carries no secret. Only issued when the guard runs
/// [`GuardPolicy::PresenceOnly`](crate::config::GuardPolicy::PresenceOnly).
#[must_use]
pub fn legacy_token(email: &str, now: DateTime<Utc>) -> String {
    base64::engine::general_purpose::STANDARD
        .encode(format!("{email}:{}", now.timestamp_millis()))
}

/// Email embedded in a [`legacy_token`], if the token has that shape.
#[must_use]
pub fn legacy_token_email(token: &str) -> Option<String> {
    let decoded = base64::engine::general_purpose::STANDARD.decode(token).ok()?;
    let text = String::from_utf8(decoded).ok()?;
    let (email, millis) = text.rsplit_once(':')?;
    millis.parse::<i64>().ok()?;
    (!email.is_empty()).then(|| email.to_string())
}

/// Compare two tokens in constant time.
#[must_use]
pub fn tokens_match(presented: &str, stored: &str) -> bool {
    constant_time_eq::constant_time_eq(presented.as_bytes(), stored.as_bytes())
}
