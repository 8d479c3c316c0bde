//! Event slot endpoints.
//!
//! - GET /api/events/:event_id/slots - Slot catalog
//! - POST /api/events/:event_id/reschedule-check - May the slot parameters change?

use crate::retry::retry_read;
use crate::server::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use slotbook_core::{EventId, Reschedule, SlotCatalog, SlotLabel};
use slotbook_web::{AppError, Requester};

/// Slot catalog of an event.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotsResponse {
    /// Event ID
    pub event_id: EventId,
    /// Slot labels in order
    pub slots: Vec<SlotLabel>,
}

impl SlotsResponse {
    fn new(event_id: EventId, catalog: &SlotCatalog) -> Self {
        Self {
            event_id,
            slots: catalog.as_slice().to_vec(),
        }
    }
}

/// Slot labels of an event.
///
/// ```bash
/// curl http://localhost:8080/api/events/$EVENT/slots
/// # {"eventId":"...","slots":["10:00","10:30"]}
/// ```
pub async fn get_slots(
    State(state): State<AppState>,
    Path(event_id): Path<EventId>,
) -> Result<Json<SlotsResponse>, AppError> {
    let catalog = retry_read(&state.read_retry, || state.service.slots(event_id)).await?;
    Ok(Json(SlotsResponse::new(event_id, &catalog)))
}

/// Check proposed slot parameters against existing bookings.
///
/// Returns 200 with the catalog the event would have, or 409
/// `CATALOG_LOCKED` if bookings exist and the catalog would change.
/// Event management calls this before saving an edit.
pub async fn reschedule_check(
    State(state): State<AppState>,
    Requester(role): Requester,
    Path(event_id): Path<EventId>,
    Json(body): Json<Reschedule>,
) -> Result<Json<SlotsResponse>, AppError> {
    let catalog = state
        .service
        .check_reschedule(role, event_id, body)
        .await?;
    Ok(Json(SlotsResponse::new(event_id, &catalog)))
}
