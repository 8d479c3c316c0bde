//! Booking endpoints.
//!
//! - POST /api/events/:event_id/bookings - Book a slot
//! - GET /api/events/:event_id/bookings - List bookings
//! - DELETE /api/bookings/:booking_id - Cancel a booking
//! - PUT /api/bookings/:booking_id/completed - Set the completion flag
//! - DELETE /api/events/:event_id/attendees/:attendee_id/bookings - Attendee removed
//! - DELETE /api/events/:event_id/bookings - Event removed

use crate::retry::retry_read;
use crate::server::state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use slotbook_core::{AttendeeId, Booking, BookingError, BookingFilter, BookingId, BookingRequest, EventId, SlotLabel};
use slotbook_web::{AppError, Requester};

// ============================================================================
// Request/Response Types
// ============================================================================

/// Body of a booking request. The event comes from the path.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    /// Attendee to book
    pub attendee_id: AttendeeId,
    /// Counterparty company
    pub company: String,
    /// Slot label, `HH:MM`
    pub slot: String,
}

/// Query string of the booking list.
#[derive(Debug, Default, Deserialize)]
pub struct ListBookingsQuery {
    /// Only this attendee
    pub attendee_id: Option<AttendeeId>,
    /// Only this company, case-insensitive
    pub company: Option<String>,
    /// Only this slot, `HH:MM`
    pub slot: Option<String>,
    /// Only completed or pending bookings
    pub completed: Option<bool>,
}

/// Body of a completion update.
#[derive(Debug, Deserialize)]
pub struct SetCompletedRequest {
    /// New completion flag
    pub completed: bool,
}

/// Result of a cascade deletion.
#[derive(Debug, Serialize, Deserialize)]
pub struct RemovedResponse {
    /// Number of bookings deleted
    pub removed: u64,
}

// ============================================================================
// Handlers
// ============================================================================

/// Book an attendee with a company in one slot.
///
/// ```bash
/// curl -X POST http://localhost:8080/api/events/$EVENT/bookings \
///   -H 'X-Requester-Role: manager' \
///   -H 'Content-Type: application/json' \
///   -d '{"attendeeId":"...","company":"Acme","slot":"10:00"}'
/// ```
///
/// Returns 201 with the booking, or 409 with `ATTENDEE_CONFLICT` /
/// `COMPANY_CONFLICT` when the slot is taken.
pub async fn create_booking(
    State(state): State<AppState>,
    Requester(role): Requester,
    Path(event_id): Path<EventId>,
    Json(body): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let request = BookingRequest {
        event_id,
        attendee_id: body.attendee_id,
        company: body.company,
        slot: body.slot,
    };
    let booking = state.service.book(role, request).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// List bookings of an event, ordered by slot.
pub async fn list_bookings(
    State(state): State<AppState>,
    Path(event_id): Path<EventId>,
    Query(query): Query<ListBookingsQuery>,
) -> Result<Json<Vec<Booking>>, AppError> {
    let mut filter = BookingFilter::all();
    filter.attendee_id = query.attendee_id;
    filter.company = query.company;
    filter.completed = query.completed;
    if let Some(raw) = query.slot {
        let slot = raw
            .parse::<SlotLabel>()
            .map_err(|_| BookingError::InvalidSlot { event_id, slot: raw })?;
        filter.slot_label = Some(slot);
    }

    let bookings = retry_read(&state.read_retry, || {
        state.queries.bookings(event_id, filter.clone())
    })
    .await?;
    Ok(Json(bookings))
}

/// Cancel a booking. Returns the cancelled booking.
pub async fn cancel_booking(
    State(state): State<AppState>,
    Requester(role): Requester,
    Path(booking_id): Path<BookingId>,
) -> Result<Json<Booking>, AppError> {
    Ok(Json(state.service.cancel(role, booking_id).await?))
}

/// Mark a booking completed, or reopen it.
pub async fn set_completed(
    State(state): State<AppState>,
    Requester(role): Requester,
    Path(booking_id): Path<BookingId>,
    Json(body): Json<SetCompletedRequest>,
) -> Result<Json<Booking>, AppError> {
    let booking = state
        .service
        .set_completed(role, booking_id, body.completed)
        .await?;
    Ok(Json(booking))
}

/// Drop the bookings of an attendee removed from the event.
pub async fn remove_attendee_bookings(
    State(state): State<AppState>,
    Requester(role): Requester,
    Path((event_id, attendee_id)): Path<(EventId, AttendeeId)>,
) -> Result<Json<RemovedResponse>, AppError> {
    let removed = state
        .service
        .remove_attendee(role, event_id, attendee_id)
        .await?;
    Ok(Json(RemovedResponse { removed }))
}

/// Drop every booking of a deleted event.
pub async fn remove_event_bookings(
    State(state): State<AppState>,
    Requester(role): Requester,
    Path(event_id): Path<EventId>,
) -> Result<Json<RemovedResponse>, AppError> {
    let removed = state.service.remove_event(role, event_id).await?;
    Ok(Json(RemovedResponse { removed }))
}
