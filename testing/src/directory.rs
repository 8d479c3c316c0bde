//! In-memory event directory.
//!
//! A directory built with [`InMemoryEventDirectory::with_ledger`] behaves
//! like the Postgres schema: event writes go through the ledger's catalog
//! lock, and removing an attendee or an event removes their bookings.

use crate::ledger::InMemoryBookingLedger;
use slotbook_core::directory::{DirectoryError, DirectoryFuture, EventDirectory};
use slotbook_core::types::{Attendee, AttendeeId, Event, EventId};
use std::collections::HashMap;
use std::future;
use std::sync::{Arc, RwLock};

#[derive(Debug, Default)]
struct DirectoryState {
    events: HashMap<EventId, Event>,
    attendees: HashMap<AttendeeId, Attendee>,
}

/// In-memory directory of events and attendees.
///
/// Stands in for the event-management and import collaborators. Clones
/// share the same underlying maps.
#[derive(Clone, Debug, Default)]
pub struct InMemoryEventDirectory {
    state: Arc<RwLock<DirectoryState>>,
    ledger: Option<InMemoryBookingLedger>,
}

impl InMemoryEventDirectory {
    /// Create a new empty directory
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty directory whose writes are checked against `ledger`
    #[must_use]
    pub fn with_ledger(ledger: InMemoryBookingLedger) -> Self {
        Self {
            state: Arc::default(),
            ledger: Some(ledger),
        }
    }

    /// Insert or replace an event.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::CatalogLocked`] if the attached ledger holds
    /// bookings for the event and the new version changes its slot catalog.
    pub fn insert_event(&self, event: Event) -> Result<(), DirectoryError> {
        let Some(ledger) = &self.ledger else {
            return self.write(|state| {
                state.events.insert(event.id, event);
            });
        };
        let mut written = Ok(());
        ledger.update_event(&event, || {
            written = self.write(|state| {
                state.events.insert(event.id, event.clone());
            });
        })?;
        written
    }

    /// Insert or replace an attendee
    pub fn insert_attendee(&self, attendee: Attendee) {
        if let Ok(mut state) = self.state.write() {
            state.attendees.insert(attendee.id, attendee);
        }
    }

    /// Remove an attendee and their bookings, returning the attendee if it
    /// was present
    pub fn remove_attendee(&self, attendee_id: AttendeeId) -> Option<Attendee> {
        let removed = self
            .state
            .write()
            .ok()
            .and_then(|mut state| state.attendees.remove(&attendee_id))?;
        if let Some(ledger) = &self.ledger {
            ledger.forget_attendee(removed.event_id, removed.id);
        }
        Some(removed)
    }

    /// Remove an event with its attendees and bookings
    pub fn remove_event(&self, event_id: EventId) -> Option<Event> {
        let removed = self.state.write().ok().and_then(|mut state| {
            state.attendees.retain(|_, attendee| attendee.event_id != event_id);
            state.events.remove(&event_id)
        });
        if let Some(ledger) = &self.ledger {
            ledger.forget_event(event_id);
        }
        removed
    }

    fn write(&self, f: impl FnOnce(&mut DirectoryState)) -> Result<(), DirectoryError> {
        self.state
            .write()
            .map(|mut state| f(&mut state))
            .map_err(|_| DirectoryError::Storage("directory lock poisoned".to_string()))
    }

    fn read<T>(&self, f: impl FnOnce(&DirectoryState) -> T) -> Result<T, DirectoryError> {
        self.state
            .read()
            .map(|state| f(&state))
            .map_err(|_| DirectoryError::Storage("directory lock poisoned".to_string()))
    }
}

impl EventDirectory for InMemoryEventDirectory {
    fn event(&self, event_id: EventId) -> DirectoryFuture<'_, Option<Event>> {
        Box::pin(future::ready(
            self.read(|state| state.events.get(&event_id).cloned()),
        ))
    }

    fn attendee(&self, attendee_id: AttendeeId) -> DirectoryFuture<'_, Option<Attendee>> {
        Box::pin(future::ready(
            self.read(|state| state.attendees.get(&attendee_id).cloned()),
        ))
    }

    fn attendees(&self, event_id: EventId) -> DirectoryFuture<'_, Vec<Attendee>> {
        let result = self.read(|state| {
            let mut attendees: Vec<Attendee> = state
                .attendees
                .values()
                .filter(|attendee| attendee.event_id == event_id)
                .cloned()
                .collect();
            attendees.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
            attendees
        });
        Box::pin(future::ready(result))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::fixtures::{at_slot, attendee, event};
    use chrono::Utc;
    use slotbook_core::ledger::BookingLedger;
    use slotbook_core::types::{BookingId, NewBooking};

    #[tokio::test]
    async fn attendees_are_scoped_and_sorted() {
        let directory = InMemoryEventDirectory::new();
        let day = event("Day one", "10:00", "11:00", 30);
        let other = event("Day two", "10:00", "11:00", 30);
        directory.insert_event(day.clone()).unwrap();
        directory.insert_event(other.clone()).unwrap();
        directory.insert_attendee(attendee(day.id, "Zoe", "Acme"));
        directory.insert_attendee(attendee(day.id, "Ann", "Globex"));
        directory.insert_attendee(attendee(other.id, "Bob", "Initech"));

        let names: Vec<String> = directory
            .attendees(day.id)
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(names, ["Ann", "Zoe"]);
    }

    #[tokio::test]
    async fn removing_an_event_drops_its_attendees() {
        let directory = InMemoryEventDirectory::new();
        let day = event("Day one", "10:00", "11:00", 30);
        directory.insert_event(day.clone()).unwrap();
        let ann = attendee(day.id, "Ann", "Globex");
        directory.insert_attendee(ann.clone());

        assert!(directory.remove_event(day.id).is_some());
        assert_eq!(directory.event(day.id).await.unwrap(), None);
        assert_eq!(directory.attendee(ann.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn booked_event_keeps_its_catalog() {
        let ledger = InMemoryBookingLedger::new();
        let directory = InMemoryEventDirectory::with_ledger(ledger.clone());
        let day = event("Day one", "10:00", "11:00", 30);
        directory.insert_event(day.clone()).unwrap();
        let ann = attendee(day.id, "Ann", "Globex");
        directory.insert_attendee(ann.clone());
        ledger
            .reserve(NewBooking {
                id: BookingId::new(),
                event_id: day.id,
                attendee_id: ann.id,
                company: "Acme".to_string(),
                slot_label: at_slot("10:30"),
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        let regapped = Event {
            slot_gap_minutes: 20,
            ..day.clone()
        };
        assert_eq!(
            directory.insert_event(regapped.clone()),
            Err(DirectoryError::CatalogLocked {
                event_id: day.id,
                bookings: 1,
            })
        );
        assert_eq!(directory.event(day.id).await.unwrap(), Some(day.clone()));

        let retitled = Event {
            title: "Partner day".to_string(),
            ..day.clone()
        };
        directory.insert_event(retitled.clone()).unwrap();
        assert_eq!(directory.event(day.id).await.unwrap(), Some(retitled));

        assert!(directory.remove_attendee(ann.id).is_some());
        assert!(ledger.is_empty());
        directory.insert_event(regapped.clone()).unwrap();
        assert_eq!(directory.event(day.id).await.unwrap(), Some(regapped));
    }

    #[tokio::test]
    async fn removing_an_event_releases_its_bookings() {
        let ledger = InMemoryBookingLedger::new();
        let directory = InMemoryEventDirectory::with_ledger(ledger.clone());
        let day = event("Day one", "10:00", "11:00", 30);
        let other = event("Day two", "10:00", "11:00", 30);
        directory.insert_event(day.clone()).unwrap();
        directory.insert_event(other.clone()).unwrap();
        for (event_id, company) in [(day.id, "Acme"), (day.id, "Globex"), (other.id, "Acme")] {
            ledger
                .reserve(NewBooking {
                    id: BookingId::new(),
                    event_id,
                    attendee_id: AttendeeId::new(),
                    company: company.to_string(),
                    slot_label: at_slot("10:00"),
                    created_at: Utc::now(),
                })
                .await
                .unwrap();
        }

        assert!(directory.remove_event(day.id).is_some());
        assert_eq!(ledger.count(day.id).await.unwrap(), 0);
        assert_eq!(ledger.count(other.id).await.unwrap(), 1);
    }
}
