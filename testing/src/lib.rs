//! # Slotbook Testing
//!
//! Testing utilities for Slotbook.
//!
//! This crate provides:
//! - [`InMemoryBookingLedger`]: a ledger with the same uniqueness rules as
//!   the Postgres one, held in process memory
//! - [`InMemoryEventDirectory`]: events and attendees without a database
//! - [`FixedClock`]: deterministic time
//! - [`fixtures`]: event builders and a wired [`fixtures::Harness`]
//!
//! ## Example
//!
//! ```
//! use slotbook_core::types::Role;
//! use slotbook_testing::fixtures::Harness;
//!
//! # tokio_test::block_on(async {
//! let harness = Harness::new("10:00", "11:00", 30);
//! let alice = harness.add_attendee("Alice", "Initech");
//!
//! let booking = harness
//!     .service
//!     .book(Role::Manager, harness.request(alice.id, "Acme", "10:00"))
//!     .await;
//! assert!(booking.is_ok());
//! # });
//! ```

pub mod directory;
pub mod fixtures;
pub mod ledger;

use chrono::{DateTime, Utc};
use slotbook_core::environment::Clock;

/// Mock implementations of injected dependencies.
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use slotbook_testing::mocks::FixedClock;
    /// use slotbook_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

pub use directory::InMemoryEventDirectory;
pub use ledger::InMemoryBookingLedger;
pub use mocks::{FixedClock, test_clock};
