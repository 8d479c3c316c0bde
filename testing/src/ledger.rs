//! In-memory booking ledger.
//!
//! [`InMemoryBookingLedger`] keeps the booking table and both uniqueness
//! indexes behind one `Mutex`. `reserve` checks both indexes and inserts
//! while holding the lock, which makes it the single serialization point
//! for one process. That is enough for tests and local runs; deployments
//! with several server processes need `PgBookingLedger`.
//!
//! A ledger attached to an [`InMemoryEventDirectory`](crate::InMemoryEventDirectory)
//! also holds a copy of every event written through it. Reservations are
//! then checked against the event's catalog, and event writes that would
//! move the catalog under existing bookings are refused, both under the
//! same lock as the booking indexes.

use slotbook_core::catalog::{catalog_edit_allowed, catalog_for};
use slotbook_core::directory::DirectoryError;
use slotbook_core::ledger::{BookingFilter, BookingLedger, ConflictKind, LedgerError, LedgerFuture, Result};
use slotbook_core::types::{AttendeeId, Booking, BookingId, Event, EventId, NewBooking, SlotLabel};
use std::collections::HashMap;
use std::future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

type AttendeeKey = (EventId, AttendeeId, SlotLabel);
type CompanyKey = (EventId, String, SlotLabel);

#[derive(Debug, Default)]
struct LedgerState {
    events: HashMap<EventId, Event>,
    bookings: HashMap<BookingId, Booking>,
    by_attendee: HashMap<AttendeeKey, BookingId>,
    by_company: HashMap<CompanyKey, BookingId>,
}

impl LedgerState {
    fn attendee_key(booking: &Booking) -> AttendeeKey {
        (booking.event_id, booking.attendee_id, booking.slot_label)
    }

    fn company_key(booking: &Booking) -> CompanyKey {
        (booking.event_id, booking.company_key(), booking.slot_label)
    }

    fn remove(&mut self, booking_id: BookingId) -> Option<Booking> {
        let booking = self.bookings.remove(&booking_id)?;
        self.by_attendee.remove(&Self::attendee_key(&booking));
        self.by_company.remove(&Self::company_key(&booking));
        Some(booking)
    }

    fn remove_where(&mut self, predicate: impl Fn(&Booking) -> bool) -> u64 {
        let doomed: Vec<BookingId> = self
            .bookings
            .values()
            .filter(|booking| predicate(booking))
            .map(|booking| booking.id)
            .collect();
        for id in &doomed {
            self.remove(*id);
        }
        doomed.len() as u64
    }

    fn count(&self, event_id: EventId) -> u64 {
        self.bookings
            .values()
            .filter(|booking| booking.event_id == event_id)
            .count() as u64
    }

    fn check_catalog(&self, booking: &Booking) -> Result<()> {
        let Some(event) = self.events.get(&booking.event_id) else {
            return Ok(());
        };
        if catalog_for(event).is_ok_and(|catalog| catalog.contains(&booking.slot_label)) {
            Ok(())
        } else {
            Err(LedgerError::SlotNotInCatalog {
                event_id: booking.event_id,
                slot_label: booking.slot_label,
            })
        }
    }
}

/// In-memory ledger for fast, deterministic testing.
///
/// Clones share the same underlying state.
///
/// # Example
///
/// ```
/// use slotbook_testing::InMemoryBookingLedger;
///
/// let ledger = InMemoryBookingLedger::new();
/// assert!(ledger.is_empty());
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryBookingLedger {
    state: Arc<Mutex<LedgerState>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryBookingLedger {
    /// Create a new empty ledger
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every operation fail with [`LedgerError::Storage`] until reset.
    ///
    /// Simulates a database outage.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of bookings across all events
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().map_or(0, |state| state.bookings.len())
    }

    /// Whether the ledger holds no bookings
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, LedgerState>> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(LedgerError::Storage("ledger unavailable".to_string()));
        }
        self.state
            .lock()
            .map_err(|_| LedgerError::Storage("ledger lock poisoned".to_string()))
    }

    fn reserve_now(&self, new_booking: NewBooking) -> Result<Booking> {
        let mut state = self.lock()?;
        let booking = new_booking.into_booking();
        state.check_catalog(&booking)?;

        let attendee_key = LedgerState::attendee_key(&booking);
        if state.by_attendee.contains_key(&attendee_key) {
            return Err(LedgerError::Conflict(ConflictKind::AttendeeConflict));
        }
        let company_key = LedgerState::company_key(&booking);
        if state.by_company.contains_key(&company_key) {
            return Err(LedgerError::Conflict(ConflictKind::CompanyConflict));
        }

        state.by_attendee.insert(attendee_key, booking.id);
        state.by_company.insert(company_key, booking.id);
        state.bookings.insert(booking.id, booking.clone());
        Ok(booking)
    }

    fn find_now(&self, event_id: EventId, filter: &BookingFilter) -> Result<Vec<Booking>> {
        let state = self.lock()?;
        let mut bookings: Vec<Booking> = state
            .bookings
            .values()
            .filter(|booking| booking.event_id == event_id && filter.matches(booking))
            .cloned()
            .collect();
        bookings.sort_by(|a, b| {
            (a.slot_label, a.created_at, a.id).cmp(&(b.slot_label, b.created_at, b.id))
        });
        Ok(bookings)
    }

    fn set_completed_now(&self, booking_id: BookingId, completed: bool) -> Result<Booking> {
        let mut state = self.lock()?;
        let booking = state
            .bookings
            .get_mut(&booking_id)
            .ok_or(LedgerError::NotFound(booking_id))?;
        booking.completed = completed;
        Ok(booking.clone())
    }

    /// Record a new version of an event, then run `commit` under the same lock.
    ///
    /// Refused with [`DirectoryError::CatalogLocked`] when the event holds
    /// bookings and the new version changes its slot catalog.
    pub(crate) fn update_event(
        &self,
        event: &Event,
        commit: impl FnOnce(),
    ) -> std::result::Result<(), DirectoryError> {
        let mut state = self.lock().map_err(|err| DirectoryError::Storage(err.to_string()))?;
        if let Some(current) = state.events.get(&event.id) {
            let bookings = state.count(event.id);
            if !catalog_edit_allowed(current, event, bookings) {
                return Err(DirectoryError::CatalogLocked {
                    event_id: event.id,
                    bookings,
                });
            }
        }
        state.events.insert(event.id, event.clone());
        commit();
        Ok(())
    }

    /// Drop an event and every booking in it.
    pub(crate) fn forget_event(&self, event_id: EventId) -> u64 {
        self.state.lock().map_or(0, |mut state| {
            state.events.remove(&event_id);
            state.remove_where(|b| b.event_id == event_id)
        })
    }

    /// Drop every booking of an attendee.
    pub(crate) fn forget_attendee(&self, event_id: EventId, attendee_id: AttendeeId) -> u64 {
        self.state.lock().map_or(0, |mut state| {
            state.remove_where(|b| b.event_id == event_id && b.attendee_id == attendee_id)
        })
    }
}

impl BookingLedger for InMemoryBookingLedger {
    fn reserve(&self, booking: NewBooking) -> LedgerFuture<'_, Booking> {
        Box::pin(future::ready(self.reserve_now(booking)))
    }

    fn release(&self, booking_id: BookingId) -> LedgerFuture<'_, Booking> {
        let result = self.lock().and_then(|mut state| {
            state
                .remove(booking_id)
                .ok_or(LedgerError::NotFound(booking_id))
        });
        Box::pin(future::ready(result))
    }

    fn get(&self, booking_id: BookingId) -> LedgerFuture<'_, Option<Booking>> {
        let result = self
            .lock()
            .map(|state| state.bookings.get(&booking_id).cloned());
        Box::pin(future::ready(result))
    }

    fn find(&self, event_id: EventId, filter: BookingFilter) -> LedgerFuture<'_, Vec<Booking>> {
        Box::pin(future::ready(self.find_now(event_id, &filter)))
    }

    fn set_completed(&self, booking_id: BookingId, completed: bool) -> LedgerFuture<'_, Booking> {
        Box::pin(future::ready(self.set_completed_now(booking_id, completed)))
    }

    fn release_attendee(&self, event_id: EventId, attendee_id: AttendeeId) -> LedgerFuture<'_, u64> {
        let result = self.lock().map(|mut state| {
            state.remove_where(|b| b.event_id == event_id && b.attendee_id == attendee_id)
        });
        Box::pin(future::ready(result))
    }

    fn release_event(&self, event_id: EventId) -> LedgerFuture<'_, u64> {
        let result = self
            .lock()
            .map(|mut state| state.remove_where(|b| b.event_id == event_id));
        Box::pin(future::ready(result))
    }

    fn count(&self, event_id: EventId) -> LedgerFuture<'_, u64> {
        let result = self.lock().map(|state| state.count(event_id));
        Box::pin(future::ready(result))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::fixtures::{at_slot, event};
    use chrono::Utc;

    fn request(event_id: EventId, attendee_id: AttendeeId, company: &str, slot: &str) -> NewBooking {
        NewBooking {
            id: BookingId::new(),
            event_id,
            attendee_id,
            company: company.to_string(),
            slot_label: at_slot(slot),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn reserve_enforces_both_constraints() {
        let ledger = InMemoryBookingLedger::new();
        let event = EventId::new();
        let (a, b) = (AttendeeId::new(), AttendeeId::new());

        ledger.reserve(request(event, a, "Acme", "10:00")).await.unwrap();

        assert_eq!(
            ledger.reserve(request(event, a, "Globex", "10:00")).await,
            Err(LedgerError::Conflict(ConflictKind::AttendeeConflict))
        );
        assert_eq!(
            ledger.reserve(request(event, b, "ACME ", "10:00")).await,
            Err(LedgerError::Conflict(ConflictKind::CompanyConflict))
        );
        assert_eq!(ledger.len(), 1);
    }

    #[tokio::test]
    async fn constraints_are_scoped_to_the_event() {
        let ledger = InMemoryBookingLedger::new();
        let attendee = AttendeeId::new();

        ledger.reserve(request(EventId::new(), attendee, "Acme", "10:00")).await.unwrap();
        ledger.reserve(request(EventId::new(), attendee, "Acme", "10:00")).await.unwrap();
        assert_eq!(ledger.len(), 2);
    }

    #[tokio::test]
    async fn release_frees_both_keys() {
        let ledger = InMemoryBookingLedger::new();
        let event = EventId::new();
        let attendee = AttendeeId::new();

        let booking = ledger.reserve(request(event, attendee, "Acme", "10:00")).await.unwrap();
        ledger.release(booking.id).await.unwrap();
        assert_eq!(
            ledger.release(booking.id).await,
            Err(LedgerError::NotFound(booking.id))
        );

        ledger.reserve(request(event, attendee, "Acme", "10:00")).await.unwrap();
    }

    #[tokio::test]
    async fn find_orders_by_slot() {
        let ledger = InMemoryBookingLedger::new();
        let event = EventId::new();

        ledger.reserve(request(event, AttendeeId::new(), "B", "11:00")).await.unwrap();
        ledger.reserve(request(event, AttendeeId::new(), "A", "10:00")).await.unwrap();

        let found = ledger.find(event, BookingFilter::all()).await.unwrap();
        let slots: Vec<String> = found.iter().map(|b| b.slot_label.to_string()).collect();
        assert_eq!(slots, ["10:00", "11:00"]);
    }

    #[tokio::test]
    async fn cascades_only_touch_their_scope() {
        let ledger = InMemoryBookingLedger::new();
        let (event, other_event) = (EventId::new(), EventId::new());
        let (a, b) = (AttendeeId::new(), AttendeeId::new());

        ledger.reserve(request(event, a, "Acme", "10:00")).await.unwrap();
        ledger.reserve(request(event, a, "Globex", "10:30")).await.unwrap();
        ledger.reserve(request(event, b, "Initech", "10:00")).await.unwrap();
        ledger.reserve(request(other_event, a, "Acme", "10:00")).await.unwrap();

        assert_eq!(ledger.release_attendee(event, a).await.unwrap(), 2);
        assert_eq!(ledger.count(event).await.unwrap(), 1);
        assert_eq!(ledger.release_event(event).await.unwrap(), 1);
        assert_eq!(ledger.count(other_event).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn registered_event_gates_slots_and_catalog_edits() {
        let ledger = InMemoryBookingLedger::new();
        let day = event("Day one", "10:00", "11:00", 30);
        ledger.update_event(&day, || {}).unwrap();

        assert_eq!(
            ledger.reserve(request(day.id, AttendeeId::new(), "Acme", "10:15")).await,
            Err(LedgerError::SlotNotInCatalog {
                event_id: day.id,
                slot_label: at_slot("10:15"),
            })
        );
        ledger.reserve(request(day.id, AttendeeId::new(), "Acme", "10:30")).await.unwrap();

        let regapped = Event {
            slot_gap_minutes: 20,
            ..day.clone()
        };
        let mut committed = false;
        assert_eq!(
            ledger.update_event(&regapped, || committed = true),
            Err(DirectoryError::CatalogLocked {
                event_id: day.id,
                bookings: 1,
            })
        );
        assert!(!committed);

        let retitled = Event {
            title: "Partner day".to_string(),
            ..day.clone()
        };
        ledger.update_event(&retitled, || committed = true).unwrap();
        assert!(committed);

        assert_eq!(ledger.forget_event(day.id), 1);
        ledger.update_event(&regapped, || {}).unwrap();
    }

    #[tokio::test]
    async fn outage_surfaces_as_storage_error() {
        let ledger = InMemoryBookingLedger::new();
        ledger.set_unavailable(true);
        assert!(matches!(
            ledger.count(EventId::new()).await,
            Err(LedgerError::Storage(_))
        ));
        ledger.set_unavailable(false);
        assert_eq!(ledger.count(EventId::new()).await, Ok(0));
    }
}
