//! Booking ledger backed by the `bookings` table.
//!
//! `reserve` runs in a transaction that holds a share lock on the event
//! row. Event writes take an exclusive lock on the same row, so a
//! reservation always sees the catalog it is checked against, and a
//! catalog change always sees every committed booking.

use chrono::{DateTime, NaiveTime, Utc};
use slotbook_core::catalog::generate_slots;
use slotbook_core::ledger::{BookingFilter, BookingLedger, ConflictKind, LedgerError, LedgerFuture};
use slotbook_core::types::{AttendeeId, Booking, BookingId, EventId, NewBooking, SlotLabel, company_key};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

/// Unique index on `(event_id, attendee_id, slot_label)`.
pub const ATTENDEE_SLOT_KEY: &str = "bookings_attendee_slot_key";

/// Unique index on `(event_id, company_key, slot_label)`.
pub const COMPANY_SLOT_KEY: &str = "bookings_company_slot_key";

/// Foreign key from `(event_id, attendee_id)` to `attendees`.
pub const ATTENDEE_FKEY: &str = "bookings_attendee_fkey";

/// Foreign key from `event_id` to `events`.
pub const EVENT_FKEY: &str = "bookings_event_fkey";

const BOOKING_COLUMNS: &str =
    "id, event_id, attendee_id, company, slot_label, completed, created_at";

fn booking_from_row(row: &PgRow) -> Result<Booking, sqlx::Error> {
    Ok(Booking {
        id: BookingId::from_uuid(row.try_get("id")?),
        event_id: EventId::from_uuid(row.try_get("event_id")?),
        attendee_id: AttendeeId::from_uuid(row.try_get("attendee_id")?),
        company: row.try_get("company")?,
        slot_label: SlotLabel::new(row.try_get::<NaiveTime, _>("slot_label")?),
        completed: row.try_get("completed")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

fn storage(op: &'static str, err: &sqlx::Error) -> LedgerError {
    metrics::counter!("slotbook_ledger_errors_total", "op" => op).increment(1);
    tracing::error!(op, error = %err, "Ledger query failed");
    LedgerError::Storage(format!("{op}: {err}"))
}

/// Map an insert failure to the constraint that rejected it.
fn insert_error(err: &sqlx::Error, booking: &NewBooking) -> LedgerError {
    if let sqlx::Error::Database(db) = err {
        match db.constraint() {
            Some(ATTENDEE_SLOT_KEY) => return LedgerError::Conflict(ConflictKind::AttendeeConflict),
            Some(COMPANY_SLOT_KEY) => return LedgerError::Conflict(ConflictKind::CompanyConflict),
            Some(ATTENDEE_FKEY) => {
                return LedgerError::AttendeeNotFound {
                    event_id: booking.event_id,
                    attendee_id: booking.attendee_id,
                };
            }
            Some(EVENT_FKEY) => return LedgerError::EventNotFound(booking.event_id),
            _ => {}
        }
    }
    storage("reserve", err)
}

/// Whether `slot_label` is in the catalog of a locked `events` row.
fn offers_slot(row: &PgRow, slot_label: &SlotLabel) -> Result<bool, sqlx::Error> {
    let catalog = generate_slots(
        row.try_get("starts_at")?,
        row.try_get("ends_at")?,
        row.try_get("slot_gap_minutes")?,
    );
    Ok(catalog.is_ok_and(|catalog| catalog.contains(slot_label)))
}

/// `PostgreSQL` implementation of [`BookingLedger`].
///
/// Safe to share between any number of server processes: the unique
/// indexes and the event row lock, not this type, enforce the invariants.
#[derive(Clone, Debug)]
pub struct PgBookingLedger {
    pool: PgPool,
}

impl PgBookingLedger {
    /// Create a ledger over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get the underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl BookingLedger for PgBookingLedger {
    fn reserve(&self, booking: NewBooking) -> LedgerFuture<'_, Booking> {
        Box::pin(async move {
            let mut tx = self.pool.begin().await.map_err(|e| storage("reserve", &e))?;

            let event = sqlx::query(
                "SELECT starts_at, ends_at, slot_gap_minutes FROM events WHERE id = $1 FOR SHARE",
            )
            .bind(booking.event_id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| storage("reserve", &e))?
            .ok_or(LedgerError::EventNotFound(booking.event_id))?;
            if !offers_slot(&event, &booking.slot_label).map_err(|e| storage("reserve", &e))? {
                return Err(LedgerError::SlotNotInCatalog {
                    event_id: booking.event_id,
                    slot_label: booking.slot_label,
                });
            }

            let sql = format!(
                "INSERT INTO bookings (id, event_id, attendee_id, company, company_key, slot_label, created_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7) \
                 RETURNING {BOOKING_COLUMNS}"
            );
            let row = sqlx::query(&sql)
                .bind(booking.id.as_uuid())
                .bind(booking.event_id.as_uuid())
                .bind(booking.attendee_id.as_uuid())
                .bind(&booking.company)
                .bind(company_key(&booking.company))
                .bind(booking.slot_label.time())
                .bind(booking.created_at)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| insert_error(&e, &booking))?;
            let reserved = booking_from_row(&row).map_err(|e| storage("reserve", &e))?;

            tx.commit().await.map_err(|e| storage("reserve", &e))?;
            Ok(reserved)
        })
    }

    fn release(&self, booking_id: BookingId) -> LedgerFuture<'_, Booking> {
        Box::pin(async move {
            let sql = format!("DELETE FROM bookings WHERE id = $1 RETURNING {BOOKING_COLUMNS}");
            let row = sqlx::query(&sql)
                .bind(booking_id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| storage("release", &e))?
                .ok_or(LedgerError::NotFound(booking_id))?;
            booking_from_row(&row).map_err(|e| storage("release", &e))
        })
    }

    fn get(&self, booking_id: BookingId) -> LedgerFuture<'_, Option<Booking>> {
        Box::pin(async move {
            let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1");
            sqlx::query(&sql)
                .bind(booking_id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .and_then(|row| row.as_ref().map(booking_from_row).transpose())
                .map_err(|e| storage("get", &e))
        })
    }

    fn find(&self, event_id: EventId, filter: BookingFilter) -> LedgerFuture<'_, Vec<Booking>> {
        Box::pin(async move {
            let sql = format!(
                "SELECT {BOOKING_COLUMNS} FROM bookings \
                 WHERE event_id = $1 \
                   AND ($2::uuid IS NULL OR attendee_id = $2) \
                   AND ($3::text IS NULL OR company_key = $3) \
                   AND ($4::time IS NULL OR slot_label = $4) \
                   AND ($5::bool IS NULL OR completed = $5) \
                 ORDER BY slot_label, created_at, id"
            );
            let rows = sqlx::query(&sql)
                .bind(event_id.as_uuid())
                .bind(filter.attendee_id.map(|id| *id.as_uuid()))
                .bind(filter.company.as_deref().map(company_key))
                .bind(filter.slot_label.map(SlotLabel::time))
                .bind(filter.completed)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| storage("find", &e))?;
            rows.iter()
                .map(booking_from_row)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| storage("find", &e))
        })
    }

    fn set_completed(&self, booking_id: BookingId, completed: bool) -> LedgerFuture<'_, Booking> {
        Box::pin(async move {
            let sql = format!(
                "UPDATE bookings SET completed = $2 WHERE id = $1 RETURNING {BOOKING_COLUMNS}"
            );
            let row = sqlx::query(&sql)
                .bind(booking_id.as_uuid())
                .bind(completed)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| storage("set_completed", &e))?
                .ok_or(LedgerError::NotFound(booking_id))?;
            booking_from_row(&row).map_err(|e| storage("set_completed", &e))
        })
    }

    fn release_attendee(&self, event_id: EventId, attendee_id: AttendeeId) -> LedgerFuture<'_, u64> {
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM bookings WHERE event_id = $1 AND attendee_id = $2")
                .bind(event_id.as_uuid())
                .bind(attendee_id.as_uuid())
                .execute(&self.pool)
                .await
                .map_err(|e| storage("release_attendee", &e))?;
            Ok(result.rows_affected())
        })
    }

    fn release_event(&self, event_id: EventId) -> LedgerFuture<'_, u64> {
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM bookings WHERE event_id = $1")
                .bind(event_id.as_uuid())
                .execute(&self.pool)
                .await
                .map_err(|e| storage("release_event", &e))?;
            Ok(result.rows_affected())
        })
    }

    fn count(&self, event_id: EventId) -> LedgerFuture<'_, u64> {
        Box::pin(async move {
            let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM bookings WHERE event_id = $1")
                .bind(event_id.as_uuid())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| storage("count", &e))?;
            Ok(u64::try_from(count).unwrap_or_default())
        })
    }
}
