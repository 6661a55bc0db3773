//! Packing-session persistence operations.
//!
//! Sessions live in `box_sessions`; the membership set lives in
//! `box_session_items`, one row per packed item. Completion applies
//! its multi-row write inside a single transaction.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use packhouse_core::{ActorId, ComponentTypeId, KitId, LabelId, SessionId, Timestamp};
use packhouse_label::{Label, LabelCode, ScanEvent};
use packhouse_packing::{PackedItem, PackingSession};
use sqlx::PgPool;
use uuid::Uuid;

use super::decode_error;

/// Insert a freshly-started session.
pub async fn insert(pool: &PgPool, session: &PackingSession) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO box_sessions (id, kit_id, box_label, status, actor, started_at, completed_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(session.id.0)
    .bind(session.kit_id.0)
    .bind(session.box_label.0)
    .bind(session.status.as_str())
    .bind(session.actor.map(|a| a.0))
    .bind(*session.started_at.as_datetime())
    .bind(session.completed_at.map(|t| *t.as_datetime()))
    .execute(pool)
    .await?;

    Ok(())
}

/// Insert one membership row.
pub async fn insert_item(
    pool: &PgPool,
    session_id: SessionId,
    item: &PackedItem,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO box_session_items (session_id, label_id, component_type_id, code, packed_at)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(session_id.0)
    .bind(item.label_id.0)
    .bind(item.component_type_id.0)
    .bind(item.code.as_str())
    .bind(*item.packed_at.as_datetime())
    .execute(pool)
    .await?;

    Ok(())
}

/// Delete one membership row. Returns whether a row was removed.
pub async fn delete_item(
    pool: &PgPool,
    session_id: SessionId,
    label_id: LabelId,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "DELETE FROM box_session_items WHERE session_id = $1 AND label_id = $2",
    )
    .bind(session_id.0)
    .bind(label_id.0)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Persist a completion: the session columns, the sealed box label,
/// and the summarizing box event, all-or-nothing.
pub async fn persist_completion(
    pool: &PgPool,
    session: &PackingSession,
    box_label: &Label,
    box_event: Option<&ScanEvent>,
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "UPDATE box_sessions SET status = $2, actor = $3, completed_at = $4 WHERE id = $1",
    )
    .bind(session.id.0)
    .bind(session.status.as_str())
    .bind(session.actor.map(|a| a.0))
    .bind(session.completed_at.map(|t| *t.as_datetime()))
    .execute(&mut *tx)
    .await?;

    sqlx::query("UPDATE labels SET status = $2, parent_label = $3 WHERE id = $1")
        .bind(box_label.id.0)
        .bind(box_label.status.as_str())
        .bind(box_label.parent_label.map(|p| p.0))
        .execute(&mut *tx)
        .await?;

    if let Some(event) = box_event {
        sqlx::query(
            "INSERT INTO scan_events (id, label_id, action, actor, at, note)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(event.id)
        .bind(event.label_id.0)
        .bind(event.action.as_str())
        .bind(event.actor.map(|a| a.0))
        .bind(*event.at.as_datetime())
        .bind(event.note.as_deref())
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await
}

/// Load all sessions with their membership sets on startup.
pub async fn load_all(pool: &PgPool) -> Result<Vec<PackingSession>, sqlx::Error> {
    let session_rows = sqlx::query_as::<_, SessionRow>(
        "SELECT id, kit_id, box_label, status, actor, started_at, completed_at
         FROM box_sessions ORDER BY started_at",
    )
    .fetch_all(pool)
    .await?;

    let item_rows = sqlx::query_as::<_, ItemRow>(
        "SELECT session_id, label_id, component_type_id, code, packed_at
         FROM box_session_items ORDER BY packed_at",
    )
    .fetch_all(pool)
    .await?;

    let mut by_session: HashMap<Uuid, Vec<PackedItem>> = HashMap::new();
    for row in item_rows {
        let session_id = row.session_id;
        by_session.entry(session_id).or_default().push(row.into_item()?);
    }

    session_rows
        .into_iter()
        .map(|row| {
            let items = by_session.remove(&row.id).unwrap_or_default();
            row.into_session(items)
        })
        .collect()
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct SessionRow {
    id: Uuid,
    kit_id: Uuid,
    box_label: Uuid,
    status: String,
    actor: Option<i64>,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl SessionRow {
    fn into_session(self, items: Vec<PackedItem>) -> Result<PackingSession, sqlx::Error> {
        Ok(PackingSession {
            id: SessionId(self.id),
            kit_id: KitId(self.kit_id),
            box_label: LabelId(self.box_label),
            status: self.status.parse().map_err(decode_error)?,
            actor: self.actor.map(ActorId),
            started_at: Timestamp::from_utc(self.started_at),
            completed_at: self.completed_at.map(Timestamp::from_utc),
            items,
        })
    }
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct ItemRow {
    session_id: Uuid,
    label_id: Uuid,
    component_type_id: Uuid,
    code: String,
    packed_at: DateTime<Utc>,
}

impl ItemRow {
    fn into_item(self) -> Result<PackedItem, sqlx::Error> {
        Ok(PackedItem {
            label_id: LabelId(self.label_id),
            component_type_id: ComponentTypeId(self.component_type_id),
            code: LabelCode::new(self.code).map_err(decode_error)?,
            packed_at: Timestamp::from_utc(self.packed_at),
        })
    }
}
