//! Custom Axum extractors.
//!
//! - [`CorrelationId`]: the request correlation ID (set by the middleware, read
//!   from the header, or generated)
//! - [`BearerToken`]: the token from an `Authorization: Bearer <token>` header
//!
//! # Examples
//!
//! ```ignore
//! use billetterie_web::extractors::{BearerToken, CorrelationId};
//!
//! async fn logout(
//!     State(state): State<AppState>,
//!     correlation_id: CorrelationId,
//!     token: BearerToken,
//! ) -> Result<StatusCode, AppError> {
//!     tracing::info!(correlation_id = %correlation_id.0, "Admin logout");
//!     Ok(StatusCode::NO_CONTENT)
//! }
//! ```

use crate::error::AppError;
use crate::middleware::CORRELATION_ID_HEADER;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

/// Correlation ID for request tracing.
///
/// Prefers the ID the correlation middleware stored in the request
/// extensions, then the `X-Correlation-ID` header, and generates a UUID v4
/// otherwise.
#[derive(Debug, Clone, Copy)]
pub struct CorrelationId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(id) = parts.extensions.get::<Uuid>() {
            return Ok(Self(*id));
        }

        let correlation_id = parts
            .headers
            .get(CORRELATION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
            .unwrap_or_else(Uuid::new_v4);

        Ok(Self(correlation_id))
    }
}

/// Bearer token extracted from `Authorization: Bearer <token>` header.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| {
                AppError::unauthorized("Invalid authorization format. Expected 'Bearer <token>'")
            })?
            .trim();

        if token.is_empty() {
            return Err(AppError::unauthorized("Empty bearer token"));
        }

        Ok(Self(token.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::http::{Request, StatusCode};

    fn parts(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/api/admin/dashboard");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn correlation_id_from_header() {
        let id = Uuid::new_v4();
        let mut parts = parts(&[(CORRELATION_ID_HEADER, &id.to_string())]);
        let extracted = CorrelationId::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(extracted.0, id);
    }

    #[tokio::test]
    async fn correlation_id_prefers_extensions() {
        let stored = Uuid::new_v4();
        let mut parts = parts(&[(CORRELATION_ID_HEADER, &Uuid::new_v4().to_string())]);
        parts.extensions.insert(stored);
        let extracted = CorrelationId::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(extracted.0, stored);
    }

    #[tokio::test]
    async fn bearer_token_is_extracted() {
        let mut parts = parts(&[("authorization", "Bearer abc123")]);
        let token = BearerToken::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(token.0, "abc123");
    }

    #[tokio::test]
    async fn missing_header_is_unauthorized() {
        let mut parts = parts(&[]);
        let err = BearerToken::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn wrong_scheme_is_unauthorized() {
        let mut parts = parts(&[("authorization", "Basic YWRtaW46YWRtaW4=")]);
        let err = BearerToken::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn empty_token_is_unauthorized() {
        let mut parts = parts(&[("authorization", "Bearer   ")]);
        let err = BearerToken::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert_eq!(err.message(), "Empty bearer token");
    }
}
