//! Label persistence operations.
//!
//! All functions take a `&PgPool` and operate on the `labels` table.
//! Codes are immutable; upserts only touch the mutable lifecycle
//! columns.

use chrono::{DateTime, Utc};
use packhouse_core::{ActorId, LabelId, Timestamp};
use packhouse_label::{Label, LabelCode};
use sqlx::PgPool;
use uuid::Uuid;

use super::decode_error;

/// Insert a label, or update its mutable columns if it already exists.
pub async fn upsert(pool: &PgPool, label: &Label) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO labels (id, code, object_type, object_id, quantity, status,
         parent_label, rendered, last_collected_by, last_collected_at, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
         ON CONFLICT (id) DO UPDATE SET
           status = EXCLUDED.status,
           parent_label = EXCLUDED.parent_label,
           rendered = EXCLUDED.rendered,
           last_collected_by = EXCLUDED.last_collected_by,
           last_collected_at = EXCLUDED.last_collected_at",
    )
    .bind(label.id.0)
    .bind(label.code.as_str())
    .bind(label.object_type.as_str())
    .bind(label.object_id)
    .bind(i32::try_from(label.quantity).unwrap_or(i32::MAX))
    .bind(label.status.as_str())
    .bind(label.parent_label.map(|p| p.0))
    .bind(label.rendered)
    .bind(label.last_collected_by.map(|a| a.0))
    .bind(label.last_collected_at.map(|t| *t.as_datetime()))
    .bind(*label.created_at.as_datetime())
    .execute(pool)
    .await?;

    Ok(())
}

/// Load all labels into the in-memory registry on startup.
pub async fn load_all(pool: &PgPool) -> Result<Vec<Label>, sqlx::Error> {
    let rows = sqlx::query_as::<_, LabelRow>(
        "SELECT id, code, object_type, object_id, quantity, status,
         parent_label, rendered, last_collected_by, last_collected_at, created_at
         FROM labels ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(LabelRow::into_label).collect()
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct LabelRow {
    id: Uuid,
    code: String,
    object_type: String,
    object_id: Uuid,
    quantity: i32,
    status: String,
    parent_label: Option<Uuid>,
    rendered: bool,
    last_collected_by: Option<i64>,
    last_collected_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl LabelRow {
    fn into_label(self) -> Result<Label, sqlx::Error> {
        Ok(Label {
            id: LabelId(self.id),
            code: LabelCode::new(self.code).map_err(decode_error)?,
            object_type: self.object_type.parse().map_err(decode_error)?,
            object_id: self.object_id,
            quantity: u32::try_from(self.quantity).unwrap_or_else(|_| {
                tracing::error!(
                    label = %self.id,
                    quantity = self.quantity,
                    "negative quantity in database; defaulting to 0"
                );
                0
            }),
            status: self.status.parse().map_err(decode_error)?,
            parent_label: self.parent_label.map(LabelId),
            rendered: self.rendered,
            last_collected_by: self.last_collected_by.map(ActorId),
            last_collected_at: self.last_collected_at.map(Timestamp::from_utc),
            created_at: Timestamp::from_utc(self.created_at),
        })
    }
}
