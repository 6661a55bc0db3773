//! # Kit Routes
//!
//! Read-only requirement resolution. Kit metadata management is an
//! external concern; definitions arrive through the persistent store.
//!
//! ## Endpoints
//!
//! - `GET /v1/kits/{kit_id}/requirements` — resolve a kit's bill-of-materials

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use packhouse_core::KitId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

// ── Response DTOs ───────────────────────────────────────────────────

/// One resolved requirement row.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct KitRequirementDto {
    pub component_type_id: Uuid,
    pub required_quantity: u32,
    pub label_prefix: Option<String>,
}

/// A kit's resolved bill-of-materials.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct KitRequirementsResponse {
    pub kit_id: Uuid,
    pub kit_name: String,
    /// Requirements in their stored order.
    pub requirements: Vec<KitRequirementDto>,
}

// ── Router ──────────────────────────────────────────────────────────

/// Build the kits router.
pub fn router() -> Router<AppState> {
    Router::new().route("/v1/kits/{kit_id}/requirements", get(get_requirements))
}

// ── Handlers ────────────────────────────────────────────────────────

/// GET /v1/kits/{kit_id}/requirements — Resolve a kit's requirements.
#[utoipa::path(
    get,
    path = "/v1/kits/{kit_id}/requirements",
    params(("kit_id" = Uuid, Path, description = "Kit identifier")),
    responses(
        (status = 200, description = "Resolved requirements", body = KitRequirementsResponse),
        (status = 404, description = "Unknown kit", body = crate::error::ErrorBody),
    ),
    tag = "kits"
)]
async fn get_requirements(
    State(state): State<AppState>,
    Path(kit_id): Path<Uuid>,
) -> Result<Json<KitRequirementsResponse>, AppError> {
    let kit = state.catalog.get(KitId(kit_id))?;
    Ok(Json(KitRequirementsResponse {
        kit_id: kit.id.0,
        kit_name: kit.name,
        requirements: kit
            .requirements
            .into_iter()
            .map(|r| KitRequirementDto {
                component_type_id: r.component_type_id.0,
                required_quantity: r.required_quantity,
                label_prefix: r.label_prefix.map(|p| p.to_string()),
            })
            .collect(),
    }))
}
