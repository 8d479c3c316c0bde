//! Read access to events and attendees.
//!
//! Events and attendees are created by the import and event-management
//! collaborators. The booking core only needs to look them up, so this
//! trait is read-only. Backends still refuse writes that would change the
//! slot catalog of an event that already holds bookings, reported as
//! [`DirectoryError::CatalogLocked`].

use crate::types::{Attendee, AttendeeId, Event, EventId};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Errors raised by a directory backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    /// The event has bookings and the write would change its slot catalog.
    #[error("Event {event_id} has {bookings} booking(s); its slot catalog is locked")]
    CatalogLocked {
        /// Event whose write was refused
        event_id: EventId,
        /// Bookings held at the time of the write
        bookings: u64,
    },

    /// The storage backend failed.
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Boxed future returned by directory methods.
pub type DirectoryFuture<'a, T> =
    Pin<Box<dyn Future<Output = Result<T, DirectoryError>> + Send + 'a>>;

/// Read model of events and their imported attendees.
pub trait EventDirectory: Send + Sync {
    /// Look up an event.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Storage`] if the backend fails.
    fn event(&self, event_id: EventId) -> DirectoryFuture<'_, Option<Event>>;

    /// Look up an attendee in any event.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Storage`] if the backend fails.
    fn attendee(&self, attendee_id: AttendeeId) -> DirectoryFuture<'_, Option<Attendee>>;

    /// All attendees imported into an event, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Storage`] if the backend fails.
    fn attendees(&self, event_id: EventId) -> DirectoryFuture<'_, Vec<Attendee>>;
}
