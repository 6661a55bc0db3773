//! # Persistence Layer
//!
//! Write-through persistence over PostgreSQL. All functions take a
//! `&PgPool`; the in-memory services remain authoritative and the pool
//! mirrors them for durability. Schema management is out of scope —
//! the expected tables are:
//!
//! - `labels(id, code, object_type, object_id, quantity, status,
//!    parent_label, rendered, last_collected_by, last_collected_at,
//!    created_at)`
//! - `scan_events(id, label_id, action, actor, at, note)`
//! - `kits(id, name, description, created_at)`
//! - `kit_requirements(kit_id, component_type_id, required_quantity,
//!    label_prefix, position)`
//! - `box_sessions(id, kit_id, box_label, status, actor, started_at,
//!    completed_at)`
//! - `box_session_items(session_id, label_id, component_type_id, code,
//!    packed_at)`

pub mod events;
pub mod kits;
pub mod labels;
pub mod sessions;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Initialize the connection pool from `DATABASE_URL`.
///
/// Returns `Ok(None)` when the variable is unset — the service then
/// runs in-memory only.
pub async fn init_pool() -> Result<Option<PgPool>, sqlx::Error> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        return Ok(None);
    };
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&url)
        .await?;
    tracing::info!("database pool connected");
    Ok(Some(pool))
}

/// Wrap a conversion failure from a persisted row as a decode error.
pub(crate) fn decode_error<E>(err: E) -> sqlx::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    sqlx::Error::Decode(Box::new(err))
}
