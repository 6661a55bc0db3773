//! Scan-event persistence operations.
//!
//! All functions take a `&PgPool` and operate on the `scan_events`
//! table. Events are immutable once created — there are no update or
//! delete operations.

use chrono::{DateTime, Utc};
use packhouse_core::{ActorId, LabelId, Timestamp};
use packhouse_label::ScanEvent;
use sqlx::PgPool;
use uuid::Uuid;

use super::decode_error;

/// Insert a new scan event.
pub async fn insert(pool: &PgPool, event: &ScanEvent) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO scan_events (id, label_id, action, actor, at, note)
         VALUES ($1, $2, $3, $4, $5, $6)
         ON CONFLICT (id) DO NOTHING",
    )
    .bind(event.id)
    .bind(event.label_id.0)
    .bind(event.action.as_str())
    .bind(event.actor.map(|a| a.0))
    .bind(*event.at.as_datetime())
    .bind(event.note.as_deref())
    .execute(pool)
    .await?;

    Ok(())
}

/// Load the full event history on startup, oldest first.
pub async fn load_all(pool: &PgPool) -> Result<Vec<ScanEvent>, sqlx::Error> {
    let rows = sqlx::query_as::<_, EventRow>(
        "SELECT id, label_id, action, actor, at, note FROM scan_events ORDER BY at",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(EventRow::into_event).collect()
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct EventRow {
    id: Uuid,
    label_id: Uuid,
    action: String,
    actor: Option<i64>,
    at: DateTime<Utc>,
    note: Option<String>,
}

impl EventRow {
    fn into_event(self) -> Result<ScanEvent, sqlx::Error> {
        Ok(ScanEvent {
            id: self.id,
            label_id: LabelId(self.label_id),
            action: self.action.parse().map_err(decode_error)?,
            actor: self.actor.map(ActorId),
            at: Timestamp::from_utc(self.at),
            note: self.note,
        })
    }
}
