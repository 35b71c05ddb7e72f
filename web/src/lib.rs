//! Axum integration for billetterie.
//!
//! Handlers stay thin: they extract data from the request, build an action,
//! dispatch it through a `Store` and map the resulting action to a response.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │         Imperative Shell (Axum)         │  ← HTTP, JSON, bearer tokens
//! ├─────────────────────────────────────────┤
//! │         Functional Core                 │  ← checkout, dashboard and
//! │  (reducers + effect descriptions)       │    admin auth reducers
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use billetterie_web::{AppError, CorrelationId};
//!
//! async fn next_step(
//!     State(state): State<AppState>,
//!     correlation_id: CorrelationId,
//!     Path(checkout_id): Path<Uuid>,
//! ) -> Result<Json<CheckoutResponse>, AppError> {
//!     let checkout_id = CheckoutId::from_uuid(checkout_id);
//!     let request_id = Uuid::new_v4();
//!     tracing::debug!(correlation_id = %correlation_id.0, %request_id, "Next requested");
//!     let action = CheckoutAction::Next { checkout_id, request_id };
//!     state.checkout.send_and_wait_for(action, |a| a.is_result_for(request_id), timeout).await?;
//!     Ok(Json(snapshot))
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;

pub use error::AppError;
pub use extractors::{BearerToken, CorrelationId};
pub use middleware::{
    correlation_id_layer, cors_layer, trace_layer, CorrelationIdExt, CORRELATION_ID_HEADER,
};

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
