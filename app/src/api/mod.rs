//! HTTP handlers, grouped by resource.
//!
//! - [`bookings`]: book, list, cancel, complete, cascades
//! - [`events`]: slot catalog and reschedule check
//! - [`queries`]: rosters, stats and availability

pub mod bookings;
pub mod events;
pub mod queries;
