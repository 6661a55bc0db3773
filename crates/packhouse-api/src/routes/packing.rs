//! # Packing Routes
//!
//! The box-assembly surface: start a session, add and remove items,
//! complete, and query progress.
//!
//! ## Endpoints
//!
//! - `POST /v1/packing/start` — start or resume a session
//! - `POST /v1/packing/items` — pack an item into the box
//! - `DELETE /v1/packing/items` — take an item back out
//! - `POST /v1/packing/complete` — seal the box
//! - `GET /v1/packing/status/{box_code}` — progress report

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use packhouse_core::{ActorId, KitId};
use packhouse_label::LabelCode;
use packhouse_packing::{PackingProgress, PackingSession, RequirementProgress, SessionStatus};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db;
use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::routes::labels::{parse_code, LabelDto};
use crate::routes::mirror_label;
use crate::state::AppState;

// ── Request/Response DTOs ───────────────────────────────────────────

/// Request to start (or resume) packing a box.
#[derive(Debug, Deserialize, ToSchema)]
pub struct StartPackingRequest {
    /// The kit to assemble. Required for a new session; ignored when
    /// resuming.
    pub kit_id: Option<Uuid>,
    /// The box label's code.
    pub box_code: String,
    /// Acting user.
    pub actor: Option<i64>,
}

impl Validate for StartPackingRequest {
    fn validate(&self) -> Result<(), String> {
        if self.box_code.trim().is_empty() {
            return Err("box_code must not be empty".to_string());
        }
        Ok(())
    }
}

/// Request to add or remove one item.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PackItemRequest {
    /// The box label's code.
    pub box_code: String,
    /// The item label's code.
    pub item_code: String,
    /// Acting user.
    pub actor: Option<i64>,
}

impl Validate for PackItemRequest {
    fn validate(&self) -> Result<(), String> {
        if self.box_code.trim().is_empty() || self.item_code.trim().is_empty() {
            return Err("box_code and item_code must not be empty".to_string());
        }
        Ok(())
    }
}

/// Request to complete a box.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CompleteBoxRequest {
    /// The box label's code.
    pub box_code: String,
    /// Acting user.
    pub actor: Option<i64>,
}

impl Validate for CompleteBoxRequest {
    fn validate(&self) -> Result<(), String> {
        if self.box_code.trim().is_empty() {
            return Err("box_code must not be empty".to_string());
        }
        Ok(())
    }
}

/// API representation of a packing session.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionDto {
    pub id: Uuid,
    pub kit_id: Uuid,
    pub box_label: Uuid,
    /// IN_PROGRESS or COMPLETED.
    #[schema(value_type = String)]
    pub status: SessionStatus,
    pub actor: Option<i64>,
    pub started_at: String,
    pub completed_at: Option<String>,
    /// Codes currently in the membership set.
    pub item_codes: Vec<String>,
}

impl From<PackingSession> for SessionDto {
    fn from(session: PackingSession) -> Self {
        Self {
            id: session.id.0,
            kit_id: session.kit_id.0,
            box_label: session.box_label.0,
            status: session.status,
            actor: session.actor.map(|a| a.0),
            started_at: session.started_at.to_iso8601(),
            completed_at: session.completed_at.map(|t| t.to_iso8601()),
            item_codes: session.items.iter().map(|i| i.code.to_string()).collect(),
        }
    }
}

/// Per-requirement progress.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RequirementProgressDto {
    pub component_type_id: Uuid,
    pub required: u32,
    pub scanned: u32,
    pub scanned_codes: Vec<String>,
    pub complete: bool,
}

impl From<RequirementProgress> for RequirementProgressDto {
    fn from(progress: RequirementProgress) -> Self {
        Self {
            component_type_id: progress.component_type_id.0,
            required: progress.required,
            scanned: progress.scanned,
            scanned_codes: progress.scanned_codes.iter().map(|c| c.to_string()).collect(),
            complete: progress.complete,
        }
    }
}

/// A box's progress report.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProgressDto {
    pub box_code: String,
    pub kit_id: Uuid,
    pub session_id: Uuid,
    /// IN_PROGRESS or COMPLETED.
    #[schema(value_type = String)]
    pub status: SessionStatus,
    pub requirements: Vec<RequirementProgressDto>,
    pub total_scanned: u32,
    pub total_required: u32,
    pub all_complete: bool,
}

impl From<PackingProgress> for ProgressDto {
    fn from(progress: PackingProgress) -> Self {
        Self {
            box_code: progress.box_code.to_string(),
            kit_id: progress.kit_id.0,
            session_id: progress.session_id.0,
            status: progress.status,
            requirements: progress
                .requirements
                .into_iter()
                .map(RequirementProgressDto::from)
                .collect(),
            total_scanned: progress.total_scanned,
            total_required: progress.total_required,
            all_complete: progress.all_complete,
        }
    }
}

/// Response to a start request.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StartPackingResponse {
    pub session: SessionDto,
    /// True when an existing in-progress session was resumed.
    pub resumed: bool,
    /// Current progress (useful when resuming after a station restart).
    pub progress: ProgressDto,
}

/// Response to an item mutation.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PackItemResponse {
    pub item: LabelDto,
    pub progress: ProgressDto,
}

/// Response to a completion.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CompleteBoxResponse {
    pub session: SessionDto,
    pub box_code: String,
    /// Final manifest-grade progress report.
    pub progress: ProgressDto,
}

// ── Router ──────────────────────────────────────────────────────────

/// Build the packing router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/packing/start", post(start_packing))
        .route("/v1/packing/items", post(add_item).delete(remove_item))
        .route("/v1/packing/complete", post(complete_box))
        .route("/v1/packing/status/{box_code}", get(packing_status))
}

// ── Handlers ────────────────────────────────────────────────────────

/// POST /v1/packing/start — Start or resume a session.
#[utoipa::path(
    post,
    path = "/v1/packing/start",
    request_body = StartPackingRequest,
    responses(
        (status = 200, description = "Session started or resumed", body = StartPackingResponse),
        (status = 404, description = "Unknown box or kit", body = crate::error::ErrorBody),
        (status = 409, description = "Box already completed", body = crate::error::ErrorBody),
    ),
    tag = "packing"
)]
async fn start_packing(
    State(state): State<AppState>,
    body: Result<Json<StartPackingRequest>, JsonRejection>,
) -> Result<Json<StartPackingResponse>, AppError> {
    let req = extract_validated_json(body)?;
    let box_code = parse_code(&req.box_code)?;
    let outcome = state.packing.start(
        req.kit_id.map(KitId),
        &box_code,
        req.actor.map(ActorId),
    )?;

    if !outcome.resumed {
        if let Some(pool) = &state.db_pool {
            if let Err(e) = db::sessions::insert(pool, &outcome.session).await {
                tracing::error!(session = %outcome.session.id, error = %e,
                    "session write-through failed");
            }
        }
    }

    let progress = state.packing.status(&box_code)?;
    Ok(Json(StartPackingResponse {
        session: outcome.session.into(),
        resumed: outcome.resumed,
        progress: progress.into(),
    }))
}

/// POST /v1/packing/items — Pack an item into the box.
#[utoipa::path(
    post,
    path = "/v1/packing/items",
    request_body = PackItemRequest,
    responses(
        (status = 200, description = "Item packed", body = PackItemResponse),
        (status = 404, description = "Unknown box or item", body = crate::error::ErrorBody),
        (status = 409, description = "Item not eligible", body = crate::error::ErrorBody),
        (status = 422, description = "Kit policy rejection", body = crate::error::ErrorBody),
    ),
    tag = "packing"
)]
async fn add_item(
    State(state): State<AppState>,
    body: Result<Json<PackItemRequest>, JsonRejection>,
) -> Result<Json<PackItemResponse>, AppError> {
    let req = extract_validated_json(body)?;
    let box_code = parse_code(&req.box_code)?;
    let item_code = parse_code(&req.item_code)?;
    let outcome = state
        .packing
        .add_item(&box_code, &item_code, req.actor.map(ActorId))?;

    mirror_label(&state, &outcome.item).await;
    mirror_membership_insert(&state, &outcome.progress, &item_code).await;

    Ok(Json(PackItemResponse {
        item: outcome.item.into(),
        progress: outcome.progress.into(),
    }))
}

/// DELETE /v1/packing/items — Take an item back out of the box.
#[utoipa::path(
    delete,
    path = "/v1/packing/items",
    request_body = PackItemRequest,
    responses(
        (status = 200, description = "Item removed", body = PackItemResponse),
        (status = 404, description = "Unknown box or item", body = crate::error::ErrorBody),
        (status = 409, description = "Item not in this box, or box completed", body = crate::error::ErrorBody),
    ),
    tag = "packing"
)]
async fn remove_item(
    State(state): State<AppState>,
    body: Result<Json<PackItemRequest>, JsonRejection>,
) -> Result<Json<PackItemResponse>, AppError> {
    let req = extract_validated_json(body)?;
    let box_code = parse_code(&req.box_code)?;
    let item_code = parse_code(&req.item_code)?;
    let outcome = state
        .packing
        .remove_item(&box_code, &item_code, req.actor.map(ActorId))?;

    mirror_label(&state, &outcome.item).await;
    if let Some(pool) = &state.db_pool {
        if let Err(e) =
            db::sessions::delete_item(pool, outcome.progress.session_id, outcome.item.id).await
        {
            tracing::error!(error = %e, "membership delete write-through failed");
        }
    }

    Ok(Json(PackItemResponse {
        item: outcome.item.into(),
        progress: outcome.progress.into(),
    }))
}

/// POST /v1/packing/complete — Seal the box.
#[utoipa::path(
    post,
    path = "/v1/packing/complete",
    request_body = CompleteBoxRequest,
    responses(
        (status = 200, description = "Box completed", body = CompleteBoxResponse),
        (status = 404, description = "Unknown box", body = crate::error::ErrorBody),
        (status = 409, description = "Box already completed", body = crate::error::ErrorBody),
        (status = 422, description = "Unmet requirements", body = crate::error::ErrorBody),
    ),
    tag = "packing"
)]
async fn complete_box(
    State(state): State<AppState>,
    body: Result<Json<CompleteBoxRequest>, JsonRejection>,
) -> Result<Json<CompleteBoxResponse>, AppError> {
    let req = extract_validated_json(body)?;
    let box_code = parse_code(&req.box_code)?;
    let session = state
        .packing
        .complete(&box_code, req.actor.map(ActorId))?;

    if let Some(pool) = &state.db_pool {
        let box_label = state.registry.find(&box_code)?;
        let box_event = state
            .registry
            .history(box_label.id)
            .into_iter()
            .next_back();
        if let Err(e) =
            db::sessions::persist_completion(pool, &session, &box_label, box_event.as_ref()).await
        {
            tracing::error!(session = %session.id, error = %e,
                "completion write-through failed");
        }
    }

    let progress = state.packing.status(&box_code)?;
    Ok(Json(CompleteBoxResponse {
        session: session.into(),
        box_code: box_code.to_string(),
        progress: progress.into(),
    }))
}

/// GET /v1/packing/status/{box_code} — Progress report.
#[utoipa::path(
    get,
    path = "/v1/packing/status/{box_code}",
    params(("box_code" = String, Path, description = "Box label code")),
    responses(
        (status = 200, description = "Progress report", body = ProgressDto),
        (status = 404, description = "Unknown box", body = crate::error::ErrorBody),
        (status = 409, description = "Packing not started", body = crate::error::ErrorBody),
    ),
    tag = "packing"
)]
async fn packing_status(
    State(state): State<AppState>,
    Path(box_code): Path<String>,
) -> Result<Json<ProgressDto>, AppError> {
    let box_code = parse_code(&box_code)?;
    let progress = state.packing.status(&box_code)?;
    Ok(Json(progress.into()))
}

/// Mirror a freshly-inserted membership row to the database.
async fn mirror_membership_insert(
    state: &AppState,
    progress: &PackingProgress,
    item_code: &LabelCode,
) {
    let Some(pool) = &state.db_pool else { return };
    // The manager owns the membership set; fetch the row it just added.
    let Some(session) = state.packing.session(progress.session_id) else {
        return;
    };
    let Some(item) = session.items.iter().find(|i| &i.code == item_code) else {
        return;
    };
    if let Err(e) = db::sessions::insert_item(pool, session.id, item).await {
        tracing::error!(code = %item_code, error = %e, "membership write-through failed");
    }
}
