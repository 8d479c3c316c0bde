//! Error taxonomy of the booking core.
//!
//! Every variant maps to one user-facing outcome, so callers can tell
//! "attendee already booked" from "company already booked" from "slot does
//! not exist" without parsing messages. Nothing here is retried by the core:
//! conflicts are permanent until the conflicting booking is released, and
//! storage failures are surfaced for the caller to handle.

use crate::catalog::CatalogError;
use crate::directory::DirectoryError;
use crate::ledger::{ConflictKind, LedgerError};
use crate::types::{AttendeeId, BookingId, EventId, Role};
use thiserror::Error;

/// Errors returned by the booking service and the query facade.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    /// The event's slot parameters cannot produce a catalog.
    #[error("Invalid slot configuration: {0}")]
    InvalidConfiguration(#[from] CatalogError),

    /// The event does not exist.
    #[error("Event not found: {0}")]
    EventNotFound(EventId),

    /// The attendee does not exist or belongs to another event.
    #[error("Attendee {attendee_id} not found in event {event_id}")]
    AttendeeNotFound {
        /// Event that was searched
        event_id: EventId,
        /// Attendee that was requested
        attendee_id: AttendeeId,
    },

    /// The slot label is not part of the event's catalog.
    #[error("Slot {slot:?} does not exist in event {event_id}")]
    InvalidSlot {
        /// Event whose catalog was checked
        event_id: EventId,
        /// Label as supplied
        slot: String,
    },

    /// A uniqueness constraint rejected the booking.
    #[error("Booking conflict: {0}")]
    Conflict(ConflictKind),

    /// The booking does not exist (already cancelled, or never created).
    #[error("Booking not found: {0}")]
    BookingNotFound(BookingId),

    /// The requester's role does not allow the operation.
    #[error("Role {role} is not allowed to {action}")]
    Forbidden {
        /// Role of the requester
        role: Role,
        /// Operation that was refused
        action: &'static str,
    },

    /// The request is malformed (e.g. blank company name).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The event already has bookings, so its catalog may not change.
    #[error("Event {event_id} has {bookings} booking(s); its slot catalog cannot change")]
    CatalogLocked {
        /// Event that would be edited
        event_id: EventId,
        /// Bookings currently held
        bookings: u64,
    },

    /// The storage backend failed.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl BookingError {
    /// Whether retrying the same call later might succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

impl From<LedgerError> for BookingError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Conflict(kind) => Self::Conflict(kind),
            LedgerError::NotFound(id) => Self::BookingNotFound(id),
            LedgerError::EventNotFound(event_id) => Self::EventNotFound(event_id),
            LedgerError::AttendeeNotFound {
                event_id,
                attendee_id,
            } => Self::AttendeeNotFound {
                event_id,
                attendee_id,
            },
            LedgerError::SlotNotInCatalog {
                event_id,
                slot_label,
            } => Self::InvalidSlot {
                event_id,
                slot: slot_label.to_string(),
            },
            LedgerError::Storage(message) => Self::Storage(message),
        }
    }
}

impl From<DirectoryError> for BookingError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::CatalogLocked { event_id, bookings } => {
                Self::CatalogLocked { event_id, bookings }
            }
            DirectoryError::Storage(message) => Self::Storage(message),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::SlotLabel;

    #[test]
    fn ledger_errors_keep_their_kind() {
        assert_eq!(
            BookingError::from(LedgerError::Conflict(ConflictKind::CompanyConflict)),
            BookingError::Conflict(ConflictKind::CompanyConflict)
        );
        let id = BookingId::new();
        assert_eq!(
            BookingError::from(LedgerError::NotFound(id)),
            BookingError::BookingNotFound(id)
        );
        assert!(BookingError::from(LedgerError::Storage("down".into())).is_transient());
    }

    #[test]
    fn write_path_rejections_map_to_service_errors() {
        let event_id = EventId::new();
        let slot_label: SlotLabel = "10:15".parse().unwrap();
        assert_eq!(
            BookingError::from(LedgerError::SlotNotInCatalog {
                event_id,
                slot_label,
            }),
            BookingError::InvalidSlot {
                event_id,
                slot: "10:15".to_string(),
            }
        );
        assert_eq!(
            BookingError::from(LedgerError::EventNotFound(event_id)),
            BookingError::EventNotFound(event_id)
        );
        assert_eq!(
            BookingError::from(DirectoryError::CatalogLocked {
                event_id,
                bookings: 2,
            }),
            BookingError::CatalogLocked {
                event_id,
                bookings: 2,
            }
        );
    }

    #[test]
    fn only_storage_is_transient() {
        assert!(!BookingError::Conflict(ConflictKind::AttendeeConflict).is_transient());
        assert!(!BookingError::EventNotFound(EventId::new()).is_transient());
    }
}
