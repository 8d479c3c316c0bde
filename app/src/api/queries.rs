//! Read-only dashboard endpoints.
//!
//! - GET /api/events/:event_id/roster/attendees
//! - GET /api/events/:event_id/roster/companies
//! - GET /api/events/:event_id/stats
//! - GET /api/events/:event_id/availability
//!
//! Open to every role. Storage errors are retried with the state's read
//! policy before surfacing as 500.

use crate::retry::retry_read;
use crate::server::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
};
use slotbook_core::EventId;
use slotbook_core::query::{AttendeeRosterEntry, BookingStats, CompanyRosterEntry, SlotAvailability};
use slotbook_web::AppError;

/// Every attendee with their booked slots.
pub async fn attendee_roster(
    State(state): State<AppState>,
    Path(event_id): Path<EventId>,
) -> Result<Json<Vec<AttendeeRosterEntry>>, AppError> {
    let roster = retry_read(&state.read_retry, || state.queries.attendee_roster(event_id)).await?;
    Ok(Json(roster))
}

/// Every booked company with its meetings.
pub async fn company_roster(
    State(state): State<AppState>,
    Path(event_id): Path<EventId>,
) -> Result<Json<Vec<CompanyRosterEntry>>, AppError> {
    let roster = retry_read(&state.read_retry, || state.queries.company_roster(event_id)).await?;
    Ok(Json(roster))
}

/// Aggregate counts.
///
/// ```bash
/// curl http://localhost:8080/api/events/$EVENT/stats
/// # {"eventId":"...","total":3,"completed":1,"pending":2,"catalogSize":3,...}
/// ```
pub async fn stats(
    State(state): State<AppState>,
    Path(event_id): Path<EventId>,
) -> Result<Json<BookingStats>, AppError> {
    let stats = retry_read(&state.read_retry, || state.queries.stats(event_id)).await?;
    Ok(Json(stats))
}

/// Taken companies and attendees per slot.
pub async fn availability(
    State(state): State<AppState>,
    Path(event_id): Path<EventId>,
) -> Result<Json<Vec<SlotAvailability>>, AppError> {
    let grid = retry_read(&state.read_retry, || state.queries.availability(event_id)).await?;
    Ok(Json(grid))
}
