//! # Slotbook Core
//!
//! Domain model and business rules for booking meetings between conference
//! attendees and companies in fixed time slots.
//!
//! ## Components
//!
//! - **Slot Catalog** ([`catalog`]): the ordered slot labels of an event,
//!   derived from its start, end and gap
//! - **Booking Ledger** ([`ledger`]): authoritative booking store with two
//!   uniqueness constraints, `(event, attendee, slot)` and
//!   `(event, company, slot)`
//! - **Booking Service** ([`service`]): authorization and validation in
//!   front of the ledger's atomic `reserve`
//! - **Query Facade** ([`query`]): read-only rosters and dashboard counts
//!
//! ## Request Flow
//!
//! ```text
//! book ──▶ BookingService ──▶ EventDirectory (event, attendee)
//!                │        ──▶ SlotCatalog    (slot is legal?)
//!                ▼
//!          BookingLedger::reserve  ── atomic on both constraints
//!                │
//!                ▼
//!        Booking | Conflict(AttendeeConflict | CompanyConflict)
//!
//! QueryFacade ──▶ BookingLedger::find   (never mutates)
//! ```
//!
//! Storage backends live in other crates: `slotbook-postgres` for
//! production and `slotbook-testing` for in-memory tests.

pub mod catalog;
pub mod directory;
pub mod environment;
pub mod error;
pub mod ledger;
pub mod query;
pub mod service;
pub mod types;

pub use catalog::{
    CatalogError, SlotCatalog, catalog_edit_allowed, catalog_for, generate_slots, same_catalog,
};
pub use directory::{DirectoryError, EventDirectory};
pub use environment::{Clock, SystemClock};
pub use error::BookingError;
pub use ledger::{BookingFilter, BookingLedger, ConflictKind, LedgerError};
pub use query::QueryFacade;
pub use service::{BookingRequest, BookingService, Reschedule};
pub use types::{Attendee, AttendeeId, Booking, BookingId, Event, EventId, NewBooking, Role, SlotLabel};
