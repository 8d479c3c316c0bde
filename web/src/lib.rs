//! Axum integration for Slotbook.
//!
//! This crate holds the HTTP plumbing that is not specific to one route:
//!
//! - [`AppError`]: maps [`BookingError`](slotbook_core::BookingError) to
//!   status codes and a `{ "code", "message" }` JSON body
//! - [`Requester`]: the caller's role from `X-Requester-Role`
//! - [`correlation_id_layer`]: correlation IDs on every request and response
//! - [`handlers::health`]: liveness and readiness
//!
//! # Request Flow
//!
//! 1. **HTTP Request** arrives at an Axum handler
//! 2. **Extract** the requester role, path IDs and JSON body
//! 3. **Call** the booking service or query facade
//! 4. **Map** the result or [`AppError`] to an HTTP response

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;

pub use error::AppError;
pub use extractors::{CorrelationId, REQUESTER_ROLE_HEADER, Requester};
pub use middleware::{CORRELATION_ID_HEADER, CorrelationIdExt, correlation_id_layer};

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
