//! Domain types for slot booking.
//!
//! Identifiers, the externally owned `Event` and `Attendee` read models, the
//! `Booking` entity and the `SlotLabel` value type.

use chrono::{DateTime, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for an event
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    /// Creates a new random `EventId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an `EventId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for an attendee
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttendeeId(Uuid);

impl AttendeeId {
    /// Creates a new random `AttendeeId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an `AttendeeId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for AttendeeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AttendeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a booking
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingId(Uuid);

impl BookingId {
    /// Creates a new random `BookingId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `BookingId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for BookingId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Slot labels
// ============================================================================

/// Error type for `SlotLabel` parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid slot label: {0:?} (expected HH:MM)")]
pub struct ParseSlotLabelError(String);

/// A bookable time slot, identified by its start time of day.
///
/// Labels always have minute precision and render as `HH:MM`. Ordering
/// follows the time of day, which is also the catalog order.
///
/// # Examples
///
/// ```
/// use slotbook_core::types::SlotLabel;
///
/// let slot: SlotLabel = "10:30".parse().unwrap();
/// assert_eq!(slot.to_string(), "10:30");
/// assert!("24:00".parse::<SlotLabel>().is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotLabel(NaiveTime);

impl SlotLabel {
    /// Create a label from a time of day, dropping seconds.
    #[must_use]
    pub fn new(time: NaiveTime) -> Self {
        Self(NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time))
    }

    /// The start time of this slot.
    #[must_use]
    pub const fn time(self) -> NaiveTime {
        self.0
    }
}

impl fmt::Display for SlotLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

impl FromStr for SlotLabel {
    type Err = ParseSlotLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveTime::parse_from_str(s.trim(), "%H:%M")
            .map(Self::new)
            .map_err(|_| ParseSlotLabelError(s.to_string()))
    }
}

impl Serialize for SlotLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SlotLabel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Roles
// ============================================================================

/// Error type for `Role` parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown role: {0}")]
pub struct ParseRoleError(String);

/// Role of whoever issues a request against the booking core.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access.
    Admin,
    /// Organizer: may create, cancel and complete bookings.
    Manager,
    /// Read-only access.
    Viewer,
}

impl Role {
    /// Whether this role may create, cancel or complete bookings.
    #[must_use]
    pub const fn can_manage_bookings(self) -> bool {
        matches!(self, Self::Admin | Self::Manager)
    }

    /// Lowercase name, as used on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Viewer => "viewer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            // "organizer" is what the import tooling calls a manager
            "manager" | "organizer" => Ok(Self::Manager),
            "viewer" => Ok(Self::Viewer),
            _ => Err(ParseRoleError(s.to_string())),
        }
    }
}

// ============================================================================
// Read models owned by event management
// ============================================================================

/// A booking session (conference day).
///
/// Events are created and edited by the event-management collaborator;
/// the booking core only reads them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Event ID
    pub id: EventId,
    /// Display title
    pub title: String,
    /// First slot starts here
    pub starts_at: NaiveTime,
    /// No slot may extend past this
    pub ends_at: NaiveTime,
    /// Length of one slot in minutes
    pub slot_gap_minutes: i32,
}

/// A person eligible to be booked, imported into exactly one event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    /// Attendee ID
    pub id: AttendeeId,
    /// Event that imported this attendee
    pub event_id: EventId,
    /// Full name
    pub name: String,
    /// The attendee's own company affiliation
    pub company: String,
}

// ============================================================================
// Bookings
// ============================================================================

/// Normalized key under which company names are compared.
///
/// Company names are trimmed and compared case-insensitively, so `"Acme"`
/// and `" acme "` occupy the same slot.
#[must_use]
pub fn company_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// A confirmed assignment of one attendee to one company for one slot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    /// Booking ID
    pub id: BookingId,
    /// Event the slot belongs to
    pub event_id: EventId,
    /// Booked attendee
    pub attendee_id: AttendeeId,
    /// Counterparty company, trimmed
    pub company: String,
    /// Slot within the event's catalog
    pub slot_label: SlotLabel,
    /// Set by an organizer once the meeting took place
    pub completed: bool,
    /// When the reservation succeeded
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// Key used by the company uniqueness constraint.
    #[must_use]
    pub fn company_key(&self) -> String {
        company_key(&self.company)
    }
}

/// A validated reservation request, ready for the ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewBooking {
    /// ID the booking will carry
    pub id: BookingId,
    /// Event the slot belongs to
    pub event_id: EventId,
    /// Attendee to book
    pub attendee_id: AttendeeId,
    /// Counterparty company, trimmed
    pub company: String,
    /// Slot within the event's catalog
    pub slot_label: SlotLabel,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl NewBooking {
    /// The booking this request becomes once reserved.
    #[must_use]
    pub fn into_booking(self) -> Booking {
        Booking {
            id: self.id,
            event_id: self.event_id,
            attendee_id: self.attendee_id,
            company: self.company,
            slot_label: self.slot_label,
            completed: false,
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn slot_label_drops_seconds() {
        let time = NaiveTime::from_hms_opt(9, 15, 42).unwrap();
        assert_eq!(SlotLabel::new(time).to_string(), "09:15");
        assert_eq!(SlotLabel::new(time), "09:15".parse().unwrap());
    }

    #[test]
    fn slot_label_rejects_garbage() {
        assert!("".parse::<SlotLabel>().is_err());
        assert!("10h30".parse::<SlotLabel>().is_err());
        assert!("25:00".parse::<SlotLabel>().is_err());
    }

    #[test]
    fn slot_label_serializes_as_string() {
        let slot: SlotLabel = "10:30".parse().unwrap();
        assert_eq!(serde_json::to_string(&slot).unwrap(), "\"10:30\"");
        let back: SlotLabel = serde_json::from_str("\"10:30\"").unwrap();
        assert_eq!(back, slot);
    }

    #[test]
    fn booking_uses_camel_case_on_the_wire() {
        let booking = NewBooking {
            id: BookingId::new(),
            event_id: EventId::new(),
            attendee_id: AttendeeId::new(),
            company: "Acme".to_string(),
            slot_label: "10:00".parse().unwrap(),
            created_at: Utc::now(),
        }
        .into_booking();

        let json = serde_json::to_value(&booking).unwrap();
        for field in ["id", "eventId", "attendeeId", "company", "slotLabel", "completed", "createdAt"] {
            assert!(json.get(field).is_some(), "missing field {field}");
        }
        assert_eq!(json["slotLabel"], "10:00");
        assert_eq!(json["completed"], false);
    }

    #[test]
    fn roles() {
        assert_eq!("Manager".parse::<Role>().unwrap(), Role::Manager);
        assert_eq!("organizer".parse::<Role>().unwrap(), Role::Manager);
        assert!("root".parse::<Role>().is_err());
        assert!(Role::Admin.can_manage_bookings());
        assert!(!Role::Viewer.can_manage_bookings());
    }

    #[test]
    fn company_key_ignores_case_and_padding() {
        assert_eq!(company_key("  Acme Corp "), company_key("acme corp"));
    }
}
