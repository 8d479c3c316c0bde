//! Custom Axum extractors.
//!
//! - [`CorrelationId`]: the request correlation ID
//! - [`Requester`]: the caller's role, as forwarded by the auth gateway

use crate::error::AppError;
use crate::middleware::CORRELATION_ID_HEADER;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use slotbook_core::types::Role;
use uuid::Uuid;

/// Header carrying the caller's role.
pub const REQUESTER_ROLE_HEADER: &str = "X-Requester-Role";

/// Correlation ID for request tracing.
///
/// Reads the ID stored by [`correlation_id_layer`](crate::middleware::correlation_id_layer),
/// then the `X-Correlation-ID` header, and generates a new UUID v4 if
/// neither is present.
#[derive(Debug, Clone, Copy)]
pub struct CorrelationId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let correlation_id = parts
            .extensions
            .get::<Uuid>()
            .copied()
            .or_else(|| {
                parts
                    .headers
                    .get(CORRELATION_ID_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| Uuid::parse_str(s).ok())
            })
            .unwrap_or_else(Uuid::new_v4);

        Ok(Self(correlation_id))
    }
}

/// The role of the caller.
///
/// Authentication happens upstream; the gateway forwards the role in
/// `X-Requester-Role`. A missing header means [`Role::Viewer`]. An
/// unknown role is rejected with 400.
///
/// # Example
///
/// ```ignore
/// async fn handler(Requester(role): Requester) -> String {
///     format!("role: {role}")
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requester(pub Role);

#[async_trait]
impl<S> FromRequestParts<S> for Requester
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(REQUESTER_ROLE_HEADER) else {
            return Ok(Self(Role::Viewer));
        };

        value
            .to_str()
            .ok()
            .and_then(|raw| raw.parse::<Role>().ok())
            .map(Self)
            .ok_or_else(|| AppError::bad_request(format!("Unknown {REQUESTER_ROLE_HEADER} value")))
    }
}
