//! Kit definition persistence operations.
//!
//! Kit metadata is managed externally; this module only reads it back
//! into the catalog on startup. Requirement rows keep their insertion
//! order via the `position` column.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use packhouse_core::{ComponentTypeId, KitId, Timestamp};
use packhouse_kit::{KitDefinition, KitRequirement};
use packhouse_label::CodePrefix;
use sqlx::PgPool;
use uuid::Uuid;

use super::decode_error;

/// Load all kit definitions with their requirements on startup.
pub async fn load_all(pool: &PgPool) -> Result<Vec<KitDefinition>, sqlx::Error> {
    let kit_rows = sqlx::query_as::<_, KitRow>(
        "SELECT id, name, description, created_at FROM kits ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    let requirement_rows = sqlx::query_as::<_, RequirementRow>(
        "SELECT kit_id, component_type_id, required_quantity, label_prefix
         FROM kit_requirements ORDER BY kit_id, position",
    )
    .fetch_all(pool)
    .await?;

    let mut by_kit: HashMap<Uuid, Vec<KitRequirement>> = HashMap::new();
    for row in requirement_rows {
        let kit_id = row.kit_id;
        by_kit.entry(kit_id).or_default().push(row.into_requirement()?);
    }

    kit_rows
        .into_iter()
        .map(|row| {
            let requirements = by_kit.remove(&row.id).unwrap_or_default();
            Ok(KitDefinition {
                id: KitId(row.id),
                name: row.name,
                description: row.description,
                requirements,
                created_at: Timestamp::from_utc(row.created_at),
            })
        })
        .collect()
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct KitRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct RequirementRow {
    kit_id: Uuid,
    component_type_id: Uuid,
    required_quantity: i32,
    label_prefix: Option<String>,
}

impl RequirementRow {
    fn into_requirement(self) -> Result<KitRequirement, sqlx::Error> {
        let label_prefix = self
            .label_prefix
            .map(CodePrefix::new)
            .transpose()
            .map_err(decode_error)?;
        Ok(KitRequirement {
            component_type_id: ComponentTypeId(self.component_type_id),
            required_quantity: u32::try_from(self.required_quantity).unwrap_or_else(|_| {
                tracing::error!(
                    kit = %self.kit_id,
                    quantity = self.required_quantity,
                    "negative required_quantity in database; defaulting to 0"
                );
                0
            }),
            label_prefix,
        })
    }
}
