//! Slot catalog generation.
//!
//! The catalog of an event is the ordered list of slot labels it offers:
//! one slot every `slot_gap_minutes`, starting at `starts_at`, keeping only
//! slots that end no later than `ends_at`. A trailing partial interval is
//! truncated, so an event yields `floor((ends_at - starts_at) / gap)` slots.
//!
//! Slots start on whole minutes. A start with seconds is rounded up to the
//! next minute, so no slot begins before the event does.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveTime;
//! use slotbook_core::catalog::generate_slots;
//!
//! let start = NaiveTime::from_hms_opt(10, 0, 0).unwrap();
//! let end = NaiveTime::from_hms_opt(11, 0, 0).unwrap();
//! let catalog = generate_slots(start, end, 30).unwrap();
//!
//! let labels: Vec<String> = catalog.iter().map(ToString::to_string).collect();
//! assert_eq!(labels, ["10:00", "10:30"]);
//! ```

use crate::types::{Event, SlotLabel};
use chrono::{NaiveTime, Timelike};
use thiserror::Error;

/// Errors raised for slot parameters that cannot produce a catalog.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// The slot gap is zero or negative.
    #[error("slot gap must be positive, got {0} minutes")]
    NonPositiveGap(i32),

    /// The event ends at or before its start.
    #[error("event must end after it starts (starts {starts_at}, ends {ends_at})")]
    EmptyWindow {
        /// Configured start time
        starts_at: NaiveTime,
        /// Configured end time
        ends_at: NaiveTime,
    },
}

/// The ordered, deterministic list of bookable slots of one event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotCatalog {
    slots: Vec<SlotLabel>,
}

impl SlotCatalog {
    /// Whether `slot` is bookable in this catalog.
    #[must_use]
    pub fn contains(&self, slot: &SlotLabel) -> bool {
        self.slots.binary_search(slot).is_ok()
    }

    /// Zero-based position of `slot`, if it belongs to the catalog.
    #[must_use]
    pub fn position(&self, slot: &SlotLabel) -> Option<usize> {
        self.slots.binary_search(slot).ok()
    }

    /// Number of slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the catalog has no slots (the window is shorter than one gap).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Iterate over slots in order.
    pub fn iter(&self) -> impl Iterator<Item = &SlotLabel> {
        self.slots.iter()
    }

    /// The slots as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[SlotLabel] {
        &self.slots
    }
}

impl IntoIterator for SlotCatalog {
    type Item = SlotLabel;
    type IntoIter = std::vec::IntoIter<SlotLabel>;

    fn into_iter(self) -> Self::IntoIter {
        self.slots.into_iter()
    }
}

/// Generate the slot catalog for a start/end window and a gap in minutes.
///
/// # Errors
///
/// - [`CatalogError::NonPositiveGap`] if `gap_minutes <= 0`
/// - [`CatalogError::EmptyWindow`] if `ends_at <= starts_at`
pub fn generate_slots(
    starts_at: NaiveTime,
    ends_at: NaiveTime,
    gap_minutes: i32,
) -> Result<SlotCatalog, CatalogError> {
    let gap = match u32::try_from(gap_minutes) {
        Ok(gap) if gap > 0 => gap,
        _ => return Err(CatalogError::NonPositiveGap(gap_minutes)),
    };
    if ends_at <= starts_at {
        return Err(CatalogError::EmptyWindow { starts_at, ends_at });
    }

    let partial_second = u32::from(starts_at.nanosecond() > 0);
    let first_minute = (starts_at.num_seconds_from_midnight() + partial_second).div_ceil(60);
    let last_minute = ends_at.num_seconds_from_midnight() / 60;
    let count = last_minute.saturating_sub(first_minute) / gap;

    let slots = (0..count)
        .filter_map(|k| {
            NaiveTime::from_num_seconds_from_midnight_opt((first_minute + k * gap) * 60, 0)
        })
        .map(SlotLabel::new)
        .collect();

    Ok(SlotCatalog { slots })
}

/// Generate the slot catalog of an event.
///
/// # Errors
///
/// See [`generate_slots`].
pub fn catalog_for(event: &Event) -> Result<SlotCatalog, CatalogError> {
    generate_slots(event.starts_at, event.ends_at, event.slot_gap_minutes)
}

/// Whether two versions of an event offer the same valid catalog.
///
/// Title and other fields are ignored. An event whose parameters cannot
/// produce a catalog never matches.
#[must_use]
pub fn same_catalog(current: &Event, proposed: &Event) -> bool {
    match (catalog_for(current), catalog_for(proposed)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Whether an event holding `bookings` bookings may take `proposed`'s
/// slot parameters.
///
/// Free while the event is unbooked; afterwards only edits that keep the
/// catalog identical are allowed, so every booking keeps a valid label.
#[must_use]
pub fn catalog_edit_allowed(current: &Event, proposed: &Event, bookings: u64) -> bool {
    bookings == 0 || same_catalog(current, proposed)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn at(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    fn labels(catalog: &SlotCatalog) -> Vec<String> {
        catalog.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn exact_boundary() {
        let catalog = generate_slots(at(10, 0), at(11, 0), 30).unwrap();
        assert_eq!(labels(&catalog), ["10:00", "10:30"]);
    }

    #[test]
    fn trailing_partial_interval_is_truncated() {
        let catalog = generate_slots(at(9, 0), at(10, 50), 20).unwrap();
        assert_eq!(labels(&catalog), ["09:00", "09:20", "09:40", "10:00", "10:20"]);
    }

    #[test]
    fn window_shorter_than_gap_is_empty() {
        let catalog = generate_slots(at(9, 0), at(9, 10), 15).unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn invalid_configuration() {
        assert_eq!(
            generate_slots(at(9, 0), at(10, 0), 0),
            Err(CatalogError::NonPositiveGap(0))
        );
        assert_eq!(
            generate_slots(at(9, 0), at(10, 0), -15),
            Err(CatalogError::NonPositiveGap(-15))
        );
        assert!(matches!(
            generate_slots(at(10, 0), at(10, 0), 15),
            Err(CatalogError::EmptyWindow { .. })
        ));
        assert!(matches!(
            generate_slots(at(11, 0), at(10, 0), 15),
            Err(CatalogError::EmptyWindow { .. })
        ));
    }

    #[test]
    fn start_with_seconds_rounds_up_to_the_next_minute() {
        let start = NaiveTime::from_hms_opt(10, 0, 45).unwrap();

        let short_end = NaiveTime::from_hms_opt(10, 30, 20).unwrap();
        assert!(generate_slots(start, short_end, 30).unwrap().is_empty());

        let catalog = generate_slots(start, at(11, 1), 30).unwrap();
        assert_eq!(labels(&catalog), ["10:01", "10:31"]);
        assert!(catalog.iter().all(|slot| slot.time() >= start));

        let late = NaiveTime::from_hms_opt(23, 59, 30).unwrap();
        let end = NaiveTime::from_hms_opt(23, 59, 59).unwrap();
        assert!(generate_slots(late, end, 1).unwrap().is_empty());
    }

    #[test]
    fn edits_are_free_until_booked() {
        let current = Event {
            id: crate::types::EventId::new(),
            title: "Day one".to_string(),
            starts_at: at(10, 0),
            ends_at: at(11, 0),
            slot_gap_minutes: 30,
        };
        let retitled = Event {
            title: "Partner day".to_string(),
            ..current.clone()
        };
        let cosmetic = Event {
            ends_at: at(11, 10),
            ..current.clone()
        };
        let regapped = Event {
            slot_gap_minutes: 20,
            ..current.clone()
        };

        assert!(catalog_edit_allowed(&current, &regapped, 0));
        assert!(catalog_edit_allowed(&current, &retitled, 3));
        assert!(catalog_edit_allowed(&current, &cosmetic, 3));
        assert!(!catalog_edit_allowed(&current, &regapped, 1));
    }

    #[test]
    fn membership_and_position() {
        let catalog = generate_slots(at(10, 0), at(11, 0), 30).unwrap();
        let second: SlotLabel = "10:30".parse().unwrap();
        let outside: SlotLabel = "11:00".parse().unwrap();
        let misaligned: SlotLabel = "10:15".parse().unwrap();

        assert!(catalog.contains(&second));
        assert_eq!(catalog.position(&second), Some(1));
        assert!(!catalog.contains(&outside));
        assert!(!catalog.contains(&misaligned));
    }

    proptest! {
        #[test]
        fn length_is_floor_of_window_over_gap(
            start in 0u32..(23 * 60),
            span in 1u32..(60 * 12),
            gap in 1i32..240,
        ) {
            let end_minutes = (start + span).min(23 * 60 + 59);
            prop_assume!(end_minutes > start);
            let starts_at = at(start / 60, start % 60);
            let ends_at = at(end_minutes / 60, end_minutes % 60);

            let catalog = generate_slots(starts_at, ends_at, gap).unwrap();
            let expected = i64::from(end_minutes - start) / i64::from(gap);
            prop_assert_eq!(catalog.len() as i64, expected);
        }

        #[test]
        fn generation_is_deterministic_and_sorted(
            start in 0u32..(20 * 60),
            span in 1u32..(60 * 4),
            gap in 1i32..90,
        ) {
            let starts_at = at(start / 60, start % 60);
            let end_minutes = start + span;
            let ends_at = at(end_minutes / 60, end_minutes % 60);

            let first = generate_slots(starts_at, ends_at, gap).unwrap();
            let second = generate_slots(starts_at, ends_at, gap).unwrap();
            prop_assert_eq!(&first, &second);
            prop_assert!(first.as_slice().windows(2).all(|w| w[0] < w[1]));
        }
    }
}
