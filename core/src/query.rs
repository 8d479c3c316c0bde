//! Read-side projections over the ledger for dashboards and UI.
//!
//! Each query reads one snapshot of the event's bookings with a single
//! [`BookingLedger::find`] call and derives its view in memory. Nothing here
//! mutates the ledger, and nothing is cached: views are as fresh as the
//! ledger's read-committed state at the time of the call.

use crate::catalog::{SlotCatalog, catalog_for};
use crate::directory::EventDirectory;
use crate::error::BookingError;
use crate::ledger::{BookingFilter, BookingLedger};
use crate::types::{Attendee, AttendeeId, Booking, BookingId, Event, EventId, SlotLabel};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// One booked slot, as seen from an attendee.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendeeSlot {
    /// Booking ID
    pub booking_id: BookingId,
    /// Slot label
    pub slot_label: SlotLabel,
    /// Company met in this slot
    pub company: String,
    /// Completion flag
    pub completed: bool,
}

/// An attendee with their bookings, in catalog order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendeeRosterEntry {
    /// The attendee
    pub attendee: Attendee,
    /// Their booked slots
    pub slots: Vec<AttendeeSlot>,
}

/// One booked slot, as seen from a company.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanySlot {
    /// Booking ID
    pub booking_id: BookingId,
    /// Slot label
    pub slot_label: SlotLabel,
    /// Attendee met in this slot
    pub attendee_id: AttendeeId,
    /// Attendee name, if the attendee is still in the directory
    pub attendee_name: Option<String>,
    /// Completion flag
    pub completed: bool,
}

/// A company with every booking made against it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyRosterEntry {
    /// Company name as first booked
    pub company: String,
    /// Bookings in catalog order
    pub slots: Vec<CompanySlot>,
}

/// Aggregate booking counts for the dashboard.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingStats {
    /// Event the counts belong to
    pub event_id: EventId,
    /// Total bookings
    pub total: u64,
    /// Bookings marked completed
    pub completed: u64,
    /// Bookings not yet completed
    pub pending: u64,
    /// Number of slots in the catalog
    pub catalog_size: usize,
    /// Attendees imported into the event
    pub attendee_count: usize,
    /// Share of attendee slots that are booked, from 0.0 to 1.0
    pub fill_rate: f64,
    /// Bookings per company
    pub per_company: BTreeMap<String, u64>,
    /// Bookings per slot, every catalog slot included
    pub per_slot: BTreeMap<SlotLabel, u64>,
}

/// Occupancy of one catalog slot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotAvailability {
    /// Slot label
    pub slot_label: SlotLabel,
    /// Companies already booked in this slot
    pub taken_companies: Vec<String>,
    /// Attendees already booked in this slot
    pub booked_attendees: Vec<AttendeeId>,
}

/// Read-only projections over a ledger and a directory.
#[derive(Clone)]
pub struct QueryFacade {
    ledger: Arc<dyn BookingLedger>,
    directory: Arc<dyn EventDirectory>,
}

impl QueryFacade {
    /// Create a facade over a ledger and a directory.
    #[must_use]
    pub fn new(ledger: Arc<dyn BookingLedger>, directory: Arc<dyn EventDirectory>) -> Self {
        Self { ledger, directory }
    }

    async fn require_event(&self, event_id: EventId) -> Result<Event, BookingError> {
        self.directory
            .event(event_id)
            .await?
            .ok_or(BookingError::EventNotFound(event_id))
    }

    async fn require_catalog(&self, event_id: EventId) -> Result<SlotCatalog, BookingError> {
        let event = self.require_event(event_id).await?;
        Ok(catalog_for(&event)?)
    }

    /// Bookings of an event passing `filter`.
    ///
    /// # Errors
    ///
    /// - [`BookingError::EventNotFound`]
    /// - [`BookingError::Storage`] on backend failure
    pub async fn bookings(
        &self,
        event_id: EventId,
        filter: BookingFilter,
    ) -> Result<Vec<Booking>, BookingError> {
        self.require_event(event_id).await?;
        Ok(self.ledger.find(event_id, filter).await?)
    }

    /// Every attendee of the event with their booked slots.
    ///
    /// Attendees without bookings are included with an empty slot list.
    ///
    /// # Errors
    ///
    /// - [`BookingError::EventNotFound`]
    /// - [`BookingError::Storage`] on backend failure
    pub async fn attendee_roster(
        &self,
        event_id: EventId,
    ) -> Result<Vec<AttendeeRosterEntry>, BookingError> {
        self.require_event(event_id).await?;
        let attendees = self.directory.attendees(event_id).await?;
        let bookings = self.ledger.find(event_id, BookingFilter::all()).await?;

        let mut by_attendee: HashMap<AttendeeId, Vec<AttendeeSlot>> = HashMap::new();
        for booking in bookings {
            by_attendee
                .entry(booking.attendee_id)
                .or_default()
                .push(AttendeeSlot {
                    booking_id: booking.id,
                    slot_label: booking.slot_label,
                    company: booking.company,
                    completed: booking.completed,
                });
        }

        Ok(attendees
            .into_iter()
            .map(|attendee| {
                let mut slots = by_attendee.remove(&attendee.id).unwrap_or_default();
                slots.sort_by_key(|slot| slot.slot_label);
                AttendeeRosterEntry { attendee, slots }
            })
            .collect())
    }

    /// Every company with at least one booking, sorted by name.
    ///
    /// # Errors
    ///
    /// - [`BookingError::EventNotFound`]
    /// - [`BookingError::Storage`] on backend failure
    pub async fn company_roster(
        &self,
        event_id: EventId,
    ) -> Result<Vec<CompanyRosterEntry>, BookingError> {
        self.require_event(event_id).await?;
        let names: HashMap<AttendeeId, String> = self
            .directory
            .attendees(event_id)
            .await?
            .into_iter()
            .map(|attendee| (attendee.id, attendee.name))
            .collect();
        let bookings = self.ledger.find(event_id, BookingFilter::all()).await?;

        let mut by_company: BTreeMap<String, CompanyRosterEntry> = BTreeMap::new();
        for booking in bookings {
            let entry = by_company
                .entry(booking.company_key())
                .or_insert_with(|| CompanyRosterEntry {
                    company: booking.company.clone(),
                    slots: Vec::new(),
                });
            entry.slots.push(CompanySlot {
                booking_id: booking.id,
                slot_label: booking.slot_label,
                attendee_id: booking.attendee_id,
                attendee_name: names.get(&booking.attendee_id).cloned(),
                completed: booking.completed,
            });
        }

        Ok(by_company
            .into_values()
            .map(|mut entry| {
                entry.slots.sort_by_key(|slot| slot.slot_label);
                entry
            })
            .collect())
    }

    /// Aggregate counts for the dashboard.
    ///
    /// # Errors
    ///
    /// - [`BookingError::EventNotFound`]
    /// - [`BookingError::InvalidConfiguration`] if the event's slots are broken
    /// - [`BookingError::Storage`] on backend failure
    #[allow(clippy::cast_precision_loss)]
    pub async fn stats(&self, event_id: EventId) -> Result<BookingStats, BookingError> {
        let catalog = self.require_catalog(event_id).await?;
        let attendee_count = self.directory.attendees(event_id).await?.len();
        let bookings = self.ledger.find(event_id, BookingFilter::all()).await?;

        let mut per_slot: BTreeMap<SlotLabel, u64> =
            catalog.iter().map(|slot| (*slot, 0)).collect();
        let mut per_company: BTreeMap<String, u64> = BTreeMap::new();
        let mut display_names: HashMap<String, String> = HashMap::new();
        let mut completed = 0;

        for booking in &bookings {
            *per_slot.entry(booking.slot_label).or_insert(0) += 1;
            let name = display_names
                .entry(booking.company_key())
                .or_insert_with(|| booking.company.clone());
            *per_company.entry(name.clone()).or_insert(0) += 1;
            if booking.completed {
                completed += 1;
            }
        }

        let total = bookings.len() as u64;
        let capacity = catalog.len() * attendee_count;
        let fill_rate = if capacity == 0 {
            0.0
        } else {
            total as f64 / capacity as f64
        };

        Ok(BookingStats {
            event_id,
            total,
            completed,
            pending: total - completed,
            catalog_size: catalog.len(),
            attendee_count,
            fill_rate,
            per_company,
            per_slot,
        })
    }

    /// For each catalog slot, who is already taken in it.
    ///
    /// Bookings whose label is not in the catalog, left over from data
    /// written before the catalog lock, get a row of their own in label
    /// order, matching the per-slot counts of [`Self::stats`].
    ///
    /// # Errors
    ///
    /// - [`BookingError::EventNotFound`]
    /// - [`BookingError::InvalidConfiguration`] if the event's slots are broken
    /// - [`BookingError::Storage`] on backend failure
    pub async fn availability(
        &self,
        event_id: EventId,
    ) -> Result<Vec<SlotAvailability>, BookingError> {
        let catalog = self.require_catalog(event_id).await?;
        let bookings = self.ledger.find(event_id, BookingFilter::all()).await?;

        let empty = |slot_label: SlotLabel| SlotAvailability {
            slot_label,
            taken_companies: Vec::new(),
            booked_attendees: Vec::new(),
        };
        let mut grid: BTreeMap<SlotLabel, SlotAvailability> =
            catalog.iter().map(|slot| (*slot, empty(*slot))).collect();

        for booking in bookings {
            let cell = grid
                .entry(booking.slot_label)
                .or_insert_with(|| empty(booking.slot_label));
            cell.taken_companies.push(booking.company);
            cell.booked_attendees.push(booking.attendee_id);
        }

        Ok(grid.into_values().collect())
    }
}
