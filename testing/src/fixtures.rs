//! Builders for events, attendees and fully wired services.
//!
//! These helpers panic on malformed literals. They are meant for tests,
//! where a typo in a fixture should fail loudly.

#![allow(clippy::expect_used)]

use crate::directory::InMemoryEventDirectory;
use crate::ledger::InMemoryBookingLedger;
use crate::mocks::test_clock;
use chrono::NaiveTime;
use slotbook_core::query::QueryFacade;
use slotbook_core::service::{BookingRequest, BookingService};
use slotbook_core::types::{Attendee, AttendeeId, Event, EventId, SlotLabel};
use std::sync::Arc;

/// Parse an `HH:MM` literal into a time of day.
///
/// # Panics
///
/// If `hhmm` is not a valid `HH:MM` time.
#[must_use]
pub fn at(hhmm: &str) -> NaiveTime {
    NaiveTime::parse_from_str(hhmm, "%H:%M").expect("fixture time should be HH:MM")
}

/// Parse an `HH:MM` literal into a slot label.
///
/// # Panics
///
/// If `hhmm` is not a valid `HH:MM` time.
#[must_use]
pub fn at_slot(hhmm: &str) -> SlotLabel {
    SlotLabel::new(at(hhmm))
}

/// An event with a fresh ID.
///
/// # Panics
///
/// If `starts_at` or `ends_at` is not a valid `HH:MM` time.
#[must_use]
pub fn event(title: &str, starts_at: &str, ends_at: &str, slot_gap_minutes: i32) -> Event {
    Event {
        id: EventId::new(),
        title: title.to_string(),
        starts_at: at(starts_at),
        ends_at: at(ends_at),
        slot_gap_minutes,
    }
}

/// An attendee of `event_id` with a fresh ID.
#[must_use]
pub fn attendee(event_id: EventId, name: &str, company: &str) -> Attendee {
    Attendee {
        id: AttendeeId::new(),
        event_id,
        name: name.to_string(),
        company: company.to_string(),
    }
}

/// A booking service and query facade over fresh in-memory backends,
/// with one event already registered. The directory is attached to the
/// ledger, so catalog locks and cascades behave as in Postgres.
///
/// # Example
///
/// ```
/// use slotbook_testing::fixtures::Harness;
///
/// let harness = Harness::new("10:00", "11:00", 30);
/// let alice = harness.add_attendee("Alice", "Initech");
/// assert_eq!(alice.event_id, harness.event.id);
/// ```
#[derive(Clone)]
pub struct Harness {
    /// The event every helper books into
    pub event: Event,
    /// Shared ledger
    pub ledger: InMemoryBookingLedger,
    /// Shared directory
    pub directory: InMemoryEventDirectory,
    /// Command side
    pub service: BookingService,
    /// Read side
    pub queries: QueryFacade,
}

impl Harness {
    /// Wire a harness around a new event.
    ///
    /// # Panics
    ///
    /// If `starts_at` or `ends_at` is not a valid `HH:MM` time.
    #[must_use]
    pub fn new(starts_at: &str, ends_at: &str, slot_gap_minutes: i32) -> Self {
        let ledger = InMemoryBookingLedger::new();
        let directory = InMemoryEventDirectory::with_ledger(ledger.clone());
        let event = event("Partner day", starts_at, ends_at, slot_gap_minutes);
        directory
            .insert_event(event.clone())
            .expect("a new event is never catalog-locked");

        let service = BookingService::new(
            Arc::new(ledger.clone()),
            Arc::new(directory.clone()),
            Arc::new(test_clock()),
        );
        let queries = QueryFacade::new(Arc::new(ledger.clone()), Arc::new(directory.clone()));

        Self {
            event,
            ledger,
            directory,
            service,
            queries,
        }
    }

    /// Register an attendee in the harness event.
    pub fn add_attendee(&self, name: &str, company: &str) -> Attendee {
        let attendee = attendee(self.event.id, name, company);
        self.directory.insert_attendee(attendee.clone());
        attendee
    }

    /// A booking request in the harness event.
    #[must_use]
    pub fn request(&self, attendee_id: AttendeeId, company: &str, slot: &str) -> BookingRequest {
        BookingRequest {
            event_id: self.event.id,
            attendee_id,
            company: company.to_string(),
            slot: slot.to_string(),
        }
    }
}
