//! Booking ledger trait and related types.
//!
//! The ledger is the authoritative store of bookings. It owns the two
//! uniqueness constraints of the booking model:
//!
//! 1. at most one booking per `(event, attendee, slot)`
//! 2. at most one booking per `(event, company, slot)`
//!
//! `reserve` is the only insert path and must check both constraints and
//! insert in one atomic step. Two concurrent callers can never both succeed
//! for the same attendee and slot, or for the same company and slot, and a
//! half-applied reservation is never observable.
//!
//! # Implementations
//!
//! - `PgBookingLedger` (in `slotbook-postgres`): two unique indexes on the
//!   `bookings` table, the insert itself arbitrates
//! - `InMemoryBookingLedger` (in `slotbook-testing`): one writer lock over
//!   both indexes
//!
//! # Dyn Compatibility
//!
//! Methods return `Pin<Box<dyn Future>>` rather than using `async fn` so the
//! ledger can be shared as `Arc<dyn BookingLedger>`.

use crate::types::{AttendeeId, Booking, BookingId, EventId, NewBooking, SlotLabel, company_key};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Which uniqueness constraint a reservation violated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConflictKind {
    /// The attendee already has a booking in this slot.
    AttendeeConflict,
    /// The company already has a booking in this slot.
    CompanyConflict,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AttendeeConflict => f.write_str("attendee already booked in this slot"),
            Self::CompanyConflict => f.write_str("company already booked in this slot"),
        }
    }
}

/// Errors that can occur during ledger operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// A uniqueness constraint rejected the reservation.
    #[error("Booking conflict: {0}")]
    Conflict(ConflictKind),

    /// The booking does not exist (never did, or already released).
    #[error("Booking not found: {0}")]
    NotFound(BookingId),

    /// The ledger's event store has no such event.
    #[error("Event not found: {0}")]
    EventNotFound(EventId),

    /// The ledger's event store has no such attendee in the event.
    #[error("Attendee {attendee_id} not found in event {event_id}")]
    AttendeeNotFound {
        /// Event the booking targeted
        event_id: EventId,
        /// Missing attendee
        attendee_id: AttendeeId,
    },

    /// The slot is not part of the event's current catalog.
    #[error("Slot {slot_label} is not offered by event {event_id}")]
    SlotNotInCatalog {
        /// Event the booking targeted
        event_id: EventId,
        /// Rejected slot
        slot_label: SlotLabel,
    },

    /// The storage backend failed; the operation may be retried by the caller.
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Boxed future returned by ledger methods.
pub type LedgerFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Read-side filter for [`BookingLedger::find`].
///
/// Every field left as `None` matches all bookings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingFilter {
    /// Only bookings of this attendee
    pub attendee_id: Option<AttendeeId>,
    /// Only bookings with this company (compared like the uniqueness constraint)
    pub company: Option<String>,
    /// Only bookings in this slot
    pub slot_label: Option<SlotLabel>,
    /// Only completed (`true`) or pending (`false`) bookings
    pub completed: Option<bool>,
}

impl BookingFilter {
    /// A filter matching every booking.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict to one attendee.
    #[must_use]
    pub const fn attendee(mut self, attendee_id: AttendeeId) -> Self {
        self.attendee_id = Some(attendee_id);
        self
    }

    /// Restrict to one company.
    #[must_use]
    pub fn company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    /// Restrict to one slot.
    #[must_use]
    pub const fn slot(mut self, slot_label: SlotLabel) -> Self {
        self.slot_label = Some(slot_label);
        self
    }

    /// Restrict by completion flag.
    #[must_use]
    pub const fn completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    /// Whether `booking` passes this filter. The event is not checked.
    #[must_use]
    pub fn matches(&self, booking: &Booking) -> bool {
        self.attendee_id.is_none_or(|id| booking.attendee_id == id)
            && self
                .company
                .as_deref()
                .is_none_or(|company| company_key(company) == booking.company_key())
            && self.slot_label.is_none_or(|slot| booking.slot_label == slot)
            && self.completed.is_none_or(|done| booking.completed == done)
    }
}

/// Authoritative store of bookings with both uniqueness constraints.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; every request handler shares one
/// ledger. Atomicity of [`reserve`](Self::reserve) must hold across
/// processes, so it has to live in the storage layer, not in a process lock,
/// for any deployment with more than one server.
pub trait BookingLedger: Send + Sync {
    /// Atomically insert a booking if neither constraint is taken.
    ///
    /// # Errors
    ///
    /// - `Conflict(AttendeeConflict)`: the attendee is booked in this slot
    /// - `Conflict(CompanyConflict)`: the company is booked in this slot
    /// - `Storage`: the backend failed; nothing was inserted
    fn reserve(&self, booking: NewBooking) -> LedgerFuture<'_, Booking>;

    /// Remove a booking, freeing its slot for both attendee and company.
    ///
    /// Returns the removed booking.
    ///
    /// # Errors
    ///
    /// - `NotFound`: no such booking
    /// - `Storage`: the backend failed
    fn release(&self, booking_id: BookingId) -> LedgerFuture<'_, Booking>;

    /// Look up one booking.
    ///
    /// # Errors
    ///
    /// - `Storage`: the backend failed
    fn get(&self, booking_id: BookingId) -> LedgerFuture<'_, Option<Booking>>;

    /// All bookings of an event passing `filter`, ordered by slot then
    /// creation time.
    ///
    /// # Errors
    ///
    /// - `Storage`: the backend failed
    fn find(&self, event_id: EventId, filter: BookingFilter) -> LedgerFuture<'_, Vec<Booking>>;

    /// Set the completion flag of a booking and return the updated booking.
    ///
    /// # Errors
    ///
    /// - `NotFound`: no such booking
    /// - `Storage`: the backend failed
    fn set_completed(&self, booking_id: BookingId, completed: bool) -> LedgerFuture<'_, Booking>;

    /// Remove every booking of one attendee in an event. Returns how many
    /// were removed.
    ///
    /// # Errors
    ///
    /// - `Storage`: the backend failed
    fn release_attendee(&self, event_id: EventId, attendee_id: AttendeeId) -> LedgerFuture<'_, u64>;

    /// Remove every booking of an event. Returns how many were removed.
    ///
    /// # Errors
    ///
    /// - `Storage`: the backend failed
    fn release_event(&self, event_id: EventId) -> LedgerFuture<'_, u64>;

    /// Number of bookings in an event.
    ///
    /// # Errors
    ///
    /// - `Storage`: the backend failed
    fn count(&self, event_id: EventId) -> LedgerFuture<'_, u64>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn booking(company: &str, slot: &str) -> Booking {
        NewBooking {
            id: BookingId::new(),
            event_id: EventId::new(),
            attendee_id: AttendeeId::new(),
            company: company.to_string(),
            slot_label: slot.parse().unwrap(),
            created_at: Utc::now(),
        }
        .into_booking()
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(BookingFilter::all().matches(&booking("Acme", "10:00")));
    }

    #[test]
    fn company_filter_is_case_insensitive() {
        let b = booking("Acme", "10:00");
        assert!(BookingFilter::all().company(" ACME").matches(&b));
        assert!(!BookingFilter::all().company("Globex").matches(&b));
    }

    #[test]
    fn filters_combine() {
        let b = booking("Acme", "10:00");
        let filter = BookingFilter::all()
            .attendee(b.attendee_id)
            .slot("10:00".parse().unwrap())
            .completed(false);
        assert!(filter.matches(&b));
        assert!(!filter.clone().completed(true).matches(&b));
        assert!(!filter.slot("10:30".parse().unwrap()).matches(&b));
    }

    #[test]
    fn conflict_messages_name_the_constraint() {
        assert_eq!(
            LedgerError::Conflict(ConflictKind::AttendeeConflict).to_string(),
            "Booking conflict: attendee already booked in this slot"
        );
        assert_eq!(
            ConflictKind::CompanyConflict.to_string(),
            "company already booked in this slot"
        );
    }
}
