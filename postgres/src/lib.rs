//! `PostgreSQL` storage for Slotbook.
//!
//! This crate provides:
//!
//! - [`PgBookingLedger`]: the production [`BookingLedger`], where the two
//!   booking invariants are unique indexes and one `INSERT` is the arbiter
//! - [`PgEventDirectory`]: events and attendees read from their tables,
//!   with writes that keep a booked event's slot catalog fixed
//! - [`migrate`]: embedded schema migrations
//!
//! # Example
//!
//! ```no_run
//! use slotbook_postgres::{PgBookingLedger, migrate};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = sqlx::PgPool::connect("postgres://localhost/slotbook").await?;
//! migrate(&pool).await?;
//! let ledger = PgBookingLedger::new(pool);
//! # Ok(())
//! # }
//! ```
//!
//! [`BookingLedger`]: slotbook_core::BookingLedger

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod directory;
pub mod ledger;

pub use directory::PgEventDirectory;
pub use ledger::PgBookingLedger;

use sqlx::PgPool;
use thiserror::Error;

/// Errors raised while preparing the database.
#[derive(Error, Debug)]
pub enum PostgresError {
    /// A migration failed to apply.
    #[error("Migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Apply the embedded migrations.
///
/// # Errors
///
/// Returns [`PostgresError::Migration`] if a migration fails.
pub async fn migrate(pool: &PgPool) -> Result<(), PostgresError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Database migrations applied");
    Ok(())
}
