//! Event directory backed by the `events` and `attendees` tables.
//!
//! The read side implements [`EventDirectory`]. The write helpers are for
//! the collaborators that own these tables, and for seeding tests.
//!
//! Bookings reference both tables with `ON DELETE CASCADE`: deleting an
//! attendee or an event deletes their bookings in the same statement.

use slotbook_core::catalog::catalog_edit_allowed;
use slotbook_core::directory::{DirectoryError, DirectoryFuture, EventDirectory};
use slotbook_core::types::{Attendee, AttendeeId, Event, EventId};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

fn storage(err: &sqlx::Error) -> DirectoryError {
    tracing::error!(error = %err, "Directory query failed");
    DirectoryError::Storage(err.to_string())
}

fn event_from_row(row: &PgRow) -> Result<Event, sqlx::Error> {
    Ok(Event {
        id: EventId::from_uuid(row.try_get("id")?),
        title: row.try_get("title")?,
        starts_at: row.try_get("starts_at")?,
        ends_at: row.try_get("ends_at")?,
        slot_gap_minutes: row.try_get("slot_gap_minutes")?,
    })
}

fn attendee_from_row(row: &PgRow) -> Result<Attendee, sqlx::Error> {
    Ok(Attendee {
        id: AttendeeId::from_uuid(row.try_get("id")?),
        event_id: EventId::from_uuid(row.try_get("event_id")?),
        name: row.try_get("name")?,
        company: row.try_get("company")?,
    })
}

/// `PostgreSQL` implementation of [`EventDirectory`].
#[derive(Clone, Debug)]
pub struct PgEventDirectory {
    pool: PgPool,
}

impl PgEventDirectory {
    /// Create a directory over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert an event or overwrite its fields.
    ///
    /// The current row is locked for the duration of the write. Once the
    /// event holds bookings, only writes that keep its slot catalog
    /// identical are accepted.
    ///
    /// # Errors
    ///
    /// - [`DirectoryError::CatalogLocked`] if bookings exist and the catalog
    ///   would change
    /// - [`DirectoryError::Storage`] if the write fails
    pub async fn upsert_event(&self, event: &Event) -> Result<(), DirectoryError> {
        let mut tx = self.pool.begin().await.map_err(|e| storage(&e))?;

        let current = sqlx::query(
            "SELECT id, title, starts_at, ends_at, slot_gap_minutes FROM events \
             WHERE id = $1 FOR UPDATE",
        )
        .bind(event.id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .and_then(|row| row.as_ref().map(event_from_row).transpose())
        .map_err(|e| storage(&e))?;

        if let Some(current) = current {
            let bookings: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bookings WHERE event_id = $1")
                .bind(event.id.as_uuid())
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| storage(&e))?;
            let bookings = u64::try_from(bookings).unwrap_or_default();
            if !catalog_edit_allowed(&current, event, bookings) {
                tracing::warn!(event_id = %event.id, bookings, "Refused slot catalog change");
                return Err(DirectoryError::CatalogLocked {
                    event_id: event.id,
                    bookings,
                });
            }
        }

        sqlx::query(
            r"
            INSERT INTO events (id, title, starts_at, ends_at, slot_gap_minutes)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                title = EXCLUDED.title,
                starts_at = EXCLUDED.starts_at,
                ends_at = EXCLUDED.ends_at,
                slot_gap_minutes = EXCLUDED.slot_gap_minutes
            ",
        )
        .bind(event.id.as_uuid())
        .bind(&event.title)
        .bind(event.starts_at)
        .bind(event.ends_at)
        .bind(event.slot_gap_minutes)
        .execute(&mut *tx)
        .await
        .map_err(|e| storage(&e))?;

        tx.commit().await.map_err(|e| storage(&e))
    }

    /// Insert an attendee or overwrite its fields.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Storage`] if the write fails, including
    /// when the attendee's event does not exist.
    pub async fn upsert_attendee(&self, attendee: &Attendee) -> Result<(), DirectoryError> {
        sqlx::query(
            r"
            INSERT INTO attendees (id, event_id, name, company)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE SET
                event_id = EXCLUDED.event_id,
                name = EXCLUDED.name,
                company = EXCLUDED.company
            ",
        )
        .bind(attendee.id.as_uuid())
        .bind(attendee.event_id.as_uuid())
        .bind(&attendee.name)
        .bind(&attendee.company)
        .execute(&self.pool)
        .await
        .map_err(|e| storage(&e))?;
        Ok(())
    }

    /// Delete an attendee and their bookings. Returns whether a row was
    /// removed.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Storage`] if the delete fails.
    pub async fn delete_attendee(&self, attendee_id: AttendeeId) -> Result<bool, DirectoryError> {
        let result = sqlx::query("DELETE FROM attendees WHERE id = $1")
            .bind(attendee_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| storage(&e))?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete an event with its attendees and bookings. Returns whether a
    /// row was removed.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Storage`] if the delete fails.
    pub async fn delete_event(&self, event_id: EventId) -> Result<bool, DirectoryError> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(event_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| storage(&e))?;
        Ok(result.rows_affected() > 0)
    }
}

impl EventDirectory for PgEventDirectory {
    fn event(&self, event_id: EventId) -> DirectoryFuture<'_, Option<Event>> {
        Box::pin(async move {
            sqlx::query(
                "SELECT id, title, starts_at, ends_at, slot_gap_minutes FROM events WHERE id = $1",
            )
            .bind(event_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .and_then(|row| row.as_ref().map(event_from_row).transpose())
            .map_err(|e| storage(&e))
        })
    }

    fn attendee(&self, attendee_id: AttendeeId) -> DirectoryFuture<'_, Option<Attendee>> {
        Box::pin(async move {
            sqlx::query("SELECT id, event_id, name, company FROM attendees WHERE id = $1")
                .bind(attendee_id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .and_then(|row| row.as_ref().map(attendee_from_row).transpose())
                .map_err(|e| storage(&e))
        })
    }

    fn attendees(&self, event_id: EventId) -> DirectoryFuture<'_, Vec<Attendee>> {
        Box::pin(async move {
            let rows = sqlx::query(
                "SELECT id, event_id, name, company FROM attendees \
                 WHERE event_id = $1 ORDER BY name, id",
            )
            .bind(event_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage(&e))?;
            rows.iter()
                .map(attendee_from_row)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| storage(&e))
        })
    }
}
