//! Error types for web handlers.
//!
//! This module bridges [`BookingError`] and HTTP responses. Every error
//! is rendered as a `{ "code", "message" }` JSON body; server errors are
//! logged with their source and sent with a generic message.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use slotbook_core::{BookingError, ConflictKind};
use std::fmt;

/// Application error type for web handlers.
///
/// # Examples
///
/// ```ignore
/// async fn handler(State(state): State<AppState>) -> Result<Json<Booking>, AppError> {
///     let booking = state.service.book(role, request).await?;
///     Ok(Json(booking))
/// }
/// ```
#[derive(Debug)]
pub struct AppError {
    /// HTTP status code
    status: StatusCode,
    /// Error message (user-facing)
    message: String,
    /// Error code (for client error handling)
    code: &'static str,
    /// Internal error (for logging, not exposed to client)
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>, code: &'static str) -> Self {
        Self {
            status,
            message: message.into(),
            code,
            source: None,
        }
    }

    /// Attach the underlying error for logging.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Create a 400 Bad Request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message, "BAD_REQUEST")
    }

    /// Create a 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            message,
            "INTERNAL_SERVER_ERROR",
        )
    }

    /// HTTP status of this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Error response body (JSON).
#[derive(Debug, Serialize)]
struct ErrorResponse {
    /// Error code (for client error handling).
    code: &'static str,
    /// Human-readable error message.
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            match &self.source {
                Some(source) => tracing::error!(
                    status = %self.status,
                    code = self.code,
                    error = %source,
                    "Internal server error"
                ),
                None => tracing::error!(
                    status = %self.status,
                    code = self.code,
                    message = %self.message,
                    "Internal server error"
                ),
            }
        }

        let body = ErrorResponse {
            code: self.code,
            message: self.message,
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        let message = err.to_string();
        let (status, code) = match &err {
            BookingError::InvalidConfiguration(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_CONFIGURATION")
            }
            BookingError::EventNotFound(_) => (StatusCode::NOT_FOUND, "EVENT_NOT_FOUND"),
            BookingError::AttendeeNotFound { .. } => (StatusCode::NOT_FOUND, "ATTENDEE_NOT_FOUND"),
            BookingError::InvalidSlot { .. } => (StatusCode::BAD_REQUEST, "INVALID_SLOT"),
            BookingError::Conflict(ConflictKind::AttendeeConflict) => {
                (StatusCode::CONFLICT, "ATTENDEE_CONFLICT")
            }
            BookingError::Conflict(ConflictKind::CompanyConflict) => {
                (StatusCode::CONFLICT, "COMPANY_CONFLICT")
            }
            BookingError::BookingNotFound(_) => (StatusCode::NOT_FOUND, "BOOKING_NOT_FOUND"),
            BookingError::Forbidden { .. } => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            BookingError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            BookingError::CatalogLocked { .. } => (StatusCode::CONFLICT, "CATALOG_LOCKED"),
            BookingError::Storage(_) => {
                return Self::internal("An internal error occurred").with_source(err);
            }
        };
        Self::new(status, message, code)
    }
}

/// Convert `anyhow::Error` to `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal("An internal error occurred").with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotbook_core::types::{BookingId, EventId, Role};

    #[test]
    fn test_error_display() {
        let err = AppError::bad_request("Invalid input");
        assert_eq!(err.to_string(), "[BAD_REQUEST] Invalid input");
    }

    #[test]
    fn test_conflicts_have_distinct_codes() {
        let attendee = AppError::from(BookingError::Conflict(ConflictKind::AttendeeConflict));
        let company = AppError::from(BookingError::Conflict(ConflictKind::CompanyConflict));

        assert_eq!(attendee.status(), StatusCode::CONFLICT);
        assert_eq!(company.status(), StatusCode::CONFLICT);
        assert_eq!(attendee.code(), "ATTENDEE_CONFLICT");
        assert_eq!(company.code(), "COMPANY_CONFLICT");
        assert_ne!(attendee.message, company.message);
    }

    #[test]
    fn test_booking_error_statuses() {
        let cases = [
            (
                BookingError::EventNotFound(EventId::new()),
                StatusCode::NOT_FOUND,
            ),
            (
                BookingError::InvalidSlot {
                    event_id: EventId::new(),
                    slot: "09:15".to_string(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                BookingError::BookingNotFound(BookingId::new()),
                StatusCode::NOT_FOUND,
            ),
            (
                BookingError::Forbidden {
                    role: Role::Viewer,
                    action: "create bookings",
                },
                StatusCode::FORBIDDEN,
            ),
            (
                BookingError::CatalogLocked {
                    event_id: EventId::new(),
                    bookings: 3,
                },
                StatusCode::CONFLICT,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).status(), status);
        }
    }

    #[test]
    fn test_storage_errors_hide_details() {
        let err = AppError::from(BookingError::Storage("password=hunter2".to_string()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message.contains("hunter2"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
