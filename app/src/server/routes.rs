//! Router configuration for the booking server.

use super::health::readiness_check;
use super::state::AppState;
use crate::api::{bookings, events, queries};
use axum::{
    Router,
    routing::{delete, get, post, put},
};
use slotbook_web::correlation_id_layer;
use slotbook_web::handlers::health_check;
use tower_http::trace::TraceLayer;

/// Build the complete Axum router.
///
/// Health checks sit at the root; everything else is nested under `/api`.
/// Every request gets a correlation ID and a trace span.
#[must_use]
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Bookings
        .route(
            "/events/:event_id/bookings",
            post(bookings::create_booking)
                .get(bookings::list_bookings)
                .delete(bookings::remove_event_bookings),
        )
        .route("/bookings/:booking_id", delete(bookings::cancel_booking))
        .route("/bookings/:booking_id/completed", put(bookings::set_completed))
        .route(
            "/events/:event_id/attendees/:attendee_id/bookings",
            delete(bookings::remove_attendee_bookings),
        )
        // Slots
        .route("/events/:event_id/slots", get(events::get_slots))
        .route(
            "/events/:event_id/reschedule-check",
            post(events::reschedule_check),
        )
        // Read side
        .route(
            "/events/:event_id/roster/attendees",
            get(queries::attendee_roster),
        )
        .route(
            "/events/:event_id/roster/companies",
            get(queries::company_roster),
        )
        .route("/events/:event_id/stats", get(queries::stats))
        .route("/events/:event_id/availability", get(queries::availability));

    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(correlation_id_layer())
        .with_state(state)
}
