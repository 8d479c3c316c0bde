//! The booking service: validation, authorization and reservation.
//!
//! # Booking flow
//!
//! ```text
//! book(role, request)
//!   1. role may manage bookings?          → Forbidden
//!   2. company not blank?                 → InvalidRequest
//!   3. event exists?                      → EventNotFound
//!   4. catalog computable?                → InvalidConfiguration
//!   5. slot in catalog?                   → InvalidSlot
//!   6. attendee exists in this event?     → AttendeeNotFound
//!   7. ledger.reserve (atomic, both keys) → Conflict(kind)
//! ```
//!
//! Conflicts are business outcomes, not failures: they are returned as-is
//! and never retried here.

use crate::catalog::{SlotCatalog, catalog_edit_allowed, catalog_for, generate_slots, same_catalog};
use crate::directory::EventDirectory;
use crate::environment::Clock;
use crate::error::BookingError;
use crate::ledger::{BookingLedger, ConflictKind, LedgerError};
use crate::types::{AttendeeId, Booking, BookingId, Event, EventId, NewBooking, Role, SlotLabel};
use chrono::NaiveTime;
use serde::Deserialize;
use std::sync::Arc;

/// Request to book one attendee with one company in one slot.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    /// Event to book in
    pub event_id: EventId,
    /// Attendee to book
    pub attendee_id: AttendeeId,
    /// Counterparty company
    pub company: String,
    /// Slot label as supplied by the client (`HH:MM`)
    pub slot: String,
}

/// Proposed new slot parameters for an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reschedule {
    /// New start time
    pub starts_at: NaiveTime,
    /// New end time
    pub ends_at: NaiveTime,
    /// New gap in minutes
    pub slot_gap_minutes: i32,
}

/// Validates and executes booking commands against a ledger.
///
/// Cheap to clone; all dependencies are shared.
#[derive(Clone)]
pub struct BookingService {
    ledger: Arc<dyn BookingLedger>,
    directory: Arc<dyn EventDirectory>,
    clock: Arc<dyn Clock>,
}

impl BookingService {
    /// Create a service over a ledger, a directory and a clock.
    #[must_use]
    pub fn new(
        ledger: Arc<dyn BookingLedger>,
        directory: Arc<dyn EventDirectory>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            ledger,
            directory,
            clock,
        }
    }

    /// The underlying ledger.
    #[must_use]
    pub fn ledger(&self) -> &Arc<dyn BookingLedger> {
        &self.ledger
    }

    /// The underlying directory.
    #[must_use]
    pub fn directory(&self) -> &Arc<dyn EventDirectory> {
        &self.directory
    }

    fn authorize(role: Role, action: &'static str) -> Result<(), BookingError> {
        if role.can_manage_bookings() {
            Ok(())
        } else {
            tracing::warn!(%role, action, "Booking operation refused");
            Err(BookingError::Forbidden { role, action })
        }
    }

    async fn load_event(&self, event_id: EventId) -> Result<Event, BookingError> {
        self.directory
            .event(event_id)
            .await?
            .ok_or(BookingError::EventNotFound(event_id))
    }

    /// Book an attendee with a company in one slot.
    ///
    /// # Errors
    ///
    /// See the module documentation for the order in which checks run.
    /// Storage failures surface as [`BookingError::Storage`].
    #[tracing::instrument(
        skip(self, request),
        fields(event_id = %request.event_id, attendee_id = %request.attendee_id, slot = %request.slot)
    )]
    pub async fn book(&self, role: Role, request: BookingRequest) -> Result<Booking, BookingError> {
        Self::authorize(role, "create bookings")?;

        let company = request.company.trim();
        if company.is_empty() {
            return Err(BookingError::InvalidRequest(
                "company must not be blank".to_string(),
            ));
        }

        let event = self.load_event(request.event_id).await?;
        let catalog = catalog_for(&event)?;
        let slot = request
            .slot
            .parse::<SlotLabel>()
            .ok()
            .filter(|slot| catalog.contains(slot))
            .ok_or_else(|| BookingError::InvalidSlot {
                event_id: event.id,
                slot: request.slot.clone(),
            })?;

        let attendee = self
            .directory
            .attendee(request.attendee_id)
            .await?
            .filter(|attendee| attendee.event_id == event.id)
            .ok_or(BookingError::AttendeeNotFound {
                event_id: event.id,
                attendee_id: request.attendee_id,
            })?;

        let new_booking = NewBooking {
            id: BookingId::new(),
            event_id: event.id,
            attendee_id: attendee.id,
            company: company.to_string(),
            slot_label: slot,
            created_at: self.clock.now(),
        };

        match self.ledger.reserve(new_booking).await {
            Ok(booking) => {
                metrics::counter!("slotbook_bookings_total", "outcome" => "created").increment(1);
                tracing::info!(booking_id = %booking.id, company = %booking.company, "Booking created");
                Ok(booking)
            }
            Err(LedgerError::Conflict(kind)) => {
                let outcome = match kind {
                    ConflictKind::AttendeeConflict => "attendee_conflict",
                    ConflictKind::CompanyConflict => "company_conflict",
                };
                metrics::counter!("slotbook_bookings_total", "outcome" => outcome).increment(1);
                tracing::warn!(%company, conflict = ?kind, "Booking rejected");
                Err(BookingError::Conflict(kind))
            }
            Err(
                err @ (LedgerError::EventNotFound(_)
                | LedgerError::AttendeeNotFound { .. }
                | LedgerError::SlotNotInCatalog { .. }),
            ) => {
                metrics::counter!("slotbook_bookings_total", "outcome" => "stale").increment(1);
                tracing::warn!(error = %err, "Booking rejected by the ledger");
                Err(err.into())
            }
            Err(err) => {
                metrics::counter!("slotbook_bookings_total", "outcome" => "error").increment(1);
                tracing::error!(error = %err, "Booking failed");
                Err(err.into())
            }
        }
    }

    /// Cancel a booking, freeing its slot. Returns the cancelled booking.
    ///
    /// # Errors
    ///
    /// - [`BookingError::Forbidden`] for viewers
    /// - [`BookingError::BookingNotFound`] if it is already gone
    /// - [`BookingError::Storage`] on backend failure
    #[tracing::instrument(skip(self))]
    pub async fn cancel(&self, role: Role, booking_id: BookingId) -> Result<Booking, BookingError> {
        Self::authorize(role, "cancel bookings")?;

        let booking = self.ledger.release(booking_id).await?;
        metrics::counter!("slotbook_cancellations_total").increment(1);
        tracing::info!(
            event_id = %booking.event_id,
            slot = %booking.slot_label,
            "Booking cancelled"
        );
        Ok(booking)
    }

    /// Mark a booking as completed (or reopen it).
    ///
    /// # Errors
    ///
    /// - [`BookingError::Forbidden`] for viewers
    /// - [`BookingError::BookingNotFound`] if it does not exist
    /// - [`BookingError::Storage`] on backend failure
    #[tracing::instrument(skip(self))]
    pub async fn set_completed(
        &self,
        role: Role,
        booking_id: BookingId,
        completed: bool,
    ) -> Result<Booking, BookingError> {
        Self::authorize(role, "complete bookings")?;
        Ok(self.ledger.set_completed(booking_id, completed).await?)
    }

    /// Drop every booking of an attendee who was removed from an event.
    ///
    /// # Errors
    ///
    /// - [`BookingError::Forbidden`] for viewers
    /// - [`BookingError::Storage`] on backend failure
    #[tracing::instrument(skip(self))]
    pub async fn remove_attendee(
        &self,
        role: Role,
        event_id: EventId,
        attendee_id: AttendeeId,
    ) -> Result<u64, BookingError> {
        Self::authorize(role, "remove attendee bookings")?;
        let removed = self.ledger.release_attendee(event_id, attendee_id).await?;
        tracing::info!(removed, "Attendee bookings released");
        Ok(removed)
    }

    /// Drop every booking of an event that was deleted.
    ///
    /// # Errors
    ///
    /// - [`BookingError::Forbidden`] for viewers
    /// - [`BookingError::Storage`] on backend failure
    #[tracing::instrument(skip(self))]
    pub async fn remove_event(&self, role: Role, event_id: EventId) -> Result<u64, BookingError> {
        Self::authorize(role, "remove event bookings")?;
        let removed = self.ledger.release_event(event_id).await?;
        tracing::info!(removed, "Event bookings released");
        Ok(removed)
    }

    /// The slot catalog of an event.
    ///
    /// # Errors
    ///
    /// - [`BookingError::EventNotFound`]
    /// - [`BookingError::InvalidConfiguration`] if the stored parameters are broken
    /// - [`BookingError::Storage`] on backend failure
    pub async fn slots(&self, event_id: EventId) -> Result<SlotCatalog, BookingError> {
        let event = self.load_event(event_id).await?;
        Ok(catalog_for(&event)?)
    }

    /// Decide whether an event may take new slot parameters.
    ///
    /// An edit that leaves the catalog unchanged is always allowed. Any other
    /// edit is refused once the event holds a booking, since existing
    /// bookings would point at labels that no longer exist. Returns the
    /// catalog the event would have.
    ///
    /// This is a preview for the event-management UI. The directory backends
    /// apply the same rule when the event is actually written, so a booking
    /// that lands between this check and the write still blocks the edit.
    ///
    /// # Errors
    ///
    /// - [`BookingError::Forbidden`] for viewers
    /// - [`BookingError::InvalidConfiguration`] if the new parameters are invalid
    /// - [`BookingError::EventNotFound`]
    /// - [`BookingError::CatalogLocked`] if bookings exist and the catalog would change
    /// - [`BookingError::Storage`] on backend failure
    #[tracing::instrument(skip(self))]
    pub async fn check_reschedule(
        &self,
        role: Role,
        event_id: EventId,
        reschedule: Reschedule,
    ) -> Result<SlotCatalog, BookingError> {
        Self::authorize(role, "reschedule events")?;

        let proposed = generate_slots(
            reschedule.starts_at,
            reschedule.ends_at,
            reschedule.slot_gap_minutes,
        )?;
        let event = self.load_event(event_id).await?;
        let edited = Event {
            starts_at: reschedule.starts_at,
            ends_at: reschedule.ends_at,
            slot_gap_minutes: reschedule.slot_gap_minutes,
            ..event.clone()
        };
        if same_catalog(&event, &edited) {
            return Ok(proposed);
        }

        let bookings = self.ledger.count(event_id).await?;
        if !catalog_edit_allowed(&event, &edited, bookings) {
            return Err(BookingError::CatalogLocked { event_id, bookings });
        }
        Ok(proposed)
    }
}
