//! # Label Routes
//!
//! Issuance, lookup, history, and render marking.
//!
//! ## Endpoints
//!
//! - `POST /v1/labels` — issue a batch of labels
//! - `GET /v1/labels/{code}` — look up one label
//! - `GET /v1/labels/{code}/history` — audit history for one label
//! - `POST /v1/labels/render` — mark labels rendered

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use packhouse_core::ActorId;
use packhouse_label::{CodePrefix, Label, LabelCode, ObjectType, ScanEvent};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::routes::mirror_label;
use crate::state::AppState;

/// Largest label batch one request may issue.
const MAX_BATCH: u32 = 500;

/// Fallback prefix when no kit requirement carries a hint.
const DEFAULT_PREFIX: &str = "CP";

// ── Request/Response DTOs ───────────────────────────────────────────

/// API representation of a label.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LabelDto {
    pub id: Uuid,
    pub code: String,
    /// COMPONENT or BOX.
    #[schema(value_type = String)]
    pub object_type: ObjectType,
    pub object_id: Uuid,
    pub quantity: u32,
    /// CREATED, COLLECTED, PACKED, or VOID.
    #[schema(value_type = String)]
    pub status: packhouse_label::LabelStatus,
    pub parent_label: Option<Uuid>,
    pub rendered: bool,
    pub last_collected_by: Option<i64>,
    pub last_collected_at: Option<String>,
    pub created_at: String,
}

impl From<Label> for LabelDto {
    fn from(label: Label) -> Self {
        Self {
            id: label.id.0,
            code: label.code.to_string(),
            object_type: label.object_type,
            object_id: label.object_id,
            quantity: label.quantity,
            status: label.status,
            parent_label: label.parent_label.map(|p| p.0),
            rendered: label.rendered,
            last_collected_by: label.last_collected_by.map(|a| a.0),
            last_collected_at: label.last_collected_at.map(|t| t.to_iso8601()),
            created_at: label.created_at.to_iso8601(),
        }
    }
}

/// API representation of one audit event.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ScanEventDto {
    pub id: Uuid,
    pub label_id: Uuid,
    /// ISSUED, COLLECTED, UNCOLLECTED, PACKED, UNPACKED, or RENDERED.
    #[schema(value_type = String)]
    pub action: packhouse_label::ScanAction,
    pub actor: Option<i64>,
    pub at: String,
    pub note: Option<String>,
}

impl From<ScanEvent> for ScanEventDto {
    fn from(event: ScanEvent) -> Self {
        Self {
            id: event.id,
            label_id: event.label_id.0,
            action: event.action,
            actor: event.actor.map(|a| a.0),
            at: event.at.to_iso8601(),
            note: event.note,
        }
    }
}

/// Request to issue a batch of labels.
#[derive(Debug, Deserialize, ToSchema)]
pub struct IssueLabelsRequest {
    /// COMPONENT or BOX.
    #[schema(value_type = String)]
    pub object_type: ObjectType,
    /// Component type to label. Required for COMPONENT labels.
    pub component_type_id: Option<Uuid>,
    /// The kit context: resolves the prefix hint for component labels,
    /// and is what a BOX label denotes. Required for BOX labels.
    pub kit_id: Option<Uuid>,
    /// How many labels to issue. Defaults to 1.
    #[serde(default)]
    pub count: Option<u32>,
    /// Units one labeled packet contains. Defaults to 1.
    #[serde(default)]
    pub quantity: Option<u32>,
    /// Acting user.
    pub actor: Option<i64>,
}

impl Validate for IssueLabelsRequest {
    fn validate(&self) -> Result<(), String> {
        let count = self.count.unwrap_or(1);
        if count == 0 || count > MAX_BATCH {
            return Err(format!("count must be between 1 and {MAX_BATCH}"));
        }
        match self.object_type {
            ObjectType::Component if self.component_type_id.is_none() => {
                Err("component_type_id is required for COMPONENT labels".to_string())
            }
            ObjectType::Box if self.kit_id.is_none() => {
                Err("kit_id is required for BOX labels".to_string())
            }
            _ => Ok(()),
        }
    }
}

/// Response to a batch issuance.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IssueLabelsResponse {
    /// The issued codes, in issuance order.
    pub codes: Vec<String>,
    /// Number of labels issued.
    pub count: u32,
    /// The issued labels.
    pub labels: Vec<LabelDto>,
}

/// Request to mark labels rendered.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RenderLabelsRequest {
    /// The codes whose imagery was produced.
    pub codes: Vec<String>,
    /// Acting user.
    pub actor: Option<i64>,
}

impl Validate for RenderLabelsRequest {
    fn validate(&self) -> Result<(), String> {
        if self.codes.is_empty() {
            return Err("codes must not be empty".to_string());
        }
        Ok(())
    }
}

/// Response to a render marking.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RenderLabelsResponse {
    /// How many labels were marked rendered. Unknown codes are skipped.
    pub rendered: u32,
}

// ── Router ──────────────────────────────────────────────────────────

/// Build the labels router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/labels", post(issue_labels))
        .route("/v1/labels/render", post(render_labels))
        .route("/v1/labels/{code}", get(get_label))
        .route("/v1/labels/{code}/history", get(get_label_history))
}

// ── Handlers ────────────────────────────────────────────────────────

/// POST /v1/labels — Issue a batch of labels.
#[utoipa::path(
    post,
    path = "/v1/labels",
    request_body = IssueLabelsRequest,
    responses(
        (status = 201, description = "Labels issued", body = IssueLabelsResponse),
        (status = 404, description = "Unknown kit", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "labels"
)]
async fn issue_labels(
    State(state): State<AppState>,
    body: Result<Json<IssueLabelsRequest>, JsonRejection>,
) -> Result<(axum::http::StatusCode, Json<IssueLabelsResponse>), AppError> {
    let req = extract_validated_json(body)?;
    let actor = req.actor.map(ActorId);
    let count = req.count.unwrap_or(1);
    let quantity = req.quantity.unwrap_or(1);

    let (object_id, prefix) = match req.object_type {
        ObjectType::Component => {
            let component_type_id = req.component_type_id.ok_or_else(|| {
                AppError::Validation("component_type_id is required for COMPONENT labels".into())
            })?;
            // The kit requirement's prefix hint drives the numbering
            // scheme; CP is the fallback for kit-less issuance.
            let hint = match req.kit_id {
                Some(kit_id) => state
                    .catalog
                    .prefix_for(
                        packhouse_core::KitId(kit_id),
                        packhouse_core::ComponentTypeId(component_type_id),
                    )
                    .map_err(AppError::from)?,
                None => None,
            };
            let prefix = match hint {
                Some(p) => p,
                None => CodePrefix::new(DEFAULT_PREFIX)
                    .map_err(|e| AppError::Internal(e.to_string()))?,
            };
            (component_type_id, prefix)
        }
        ObjectType::Box => {
            let kit_id = req.kit_id.ok_or_else(|| {
                AppError::Validation("kit_id is required for BOX labels".into())
            })?;
            let kit = state.catalog.get(packhouse_core::KitId(kit_id))?;
            (kit_id, CodePrefix::for_box(&kit.name))
        }
    };

    let mut labels = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let label = state
            .registry
            .issue(req.object_type, object_id, quantity, &prefix, actor);
        mirror_label(&state, &label).await;
        labels.push(label);
    }

    let response = IssueLabelsResponse {
        codes: labels.iter().map(|l| l.code.to_string()).collect(),
        count,
        labels: labels.into_iter().map(LabelDto::from).collect(),
    };
    Ok((axum::http::StatusCode::CREATED, Json(response)))
}

/// GET /v1/labels/{code} — Look up one label.
#[utoipa::path(
    get,
    path = "/v1/labels/{code}",
    params(("code" = String, Path, description = "Label code")),
    responses(
        (status = 200, description = "Label found", body = LabelDto),
        (status = 404, description = "Unknown code", body = crate::error::ErrorBody),
    ),
    tag = "labels"
)]
async fn get_label(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<LabelDto>, AppError> {
    let code = parse_code(&code)?;
    let label = state.registry.find(&code)?;
    Ok(Json(label.into()))
}

/// GET /v1/labels/{code}/history — Audit history for one label.
#[utoipa::path(
    get,
    path = "/v1/labels/{code}/history",
    params(("code" = String, Path, description = "Label code")),
    responses(
        (status = 200, description = "Event history", body = [ScanEventDto]),
        (status = 404, description = "Unknown code", body = crate::error::ErrorBody),
    ),
    tag = "labels"
)]
async fn get_label_history(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Vec<ScanEventDto>>, AppError> {
    let code = parse_code(&code)?;
    let events = state.registry.history_for_code(&code)?;
    Ok(Json(events.into_iter().map(ScanEventDto::from).collect()))
}

/// POST /v1/labels/render — Mark labels rendered.
///
/// Imagery is produced by an external collaborator; this endpoint only
/// records that it happened. Unknown codes are skipped, matching the
/// best-effort semantics of batch rendering.
#[utoipa::path(
    post,
    path = "/v1/labels/render",
    request_body = RenderLabelsRequest,
    responses(
        (status = 200, description = "Labels marked rendered", body = RenderLabelsResponse),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "labels"
)]
async fn render_labels(
    State(state): State<AppState>,
    body: Result<Json<RenderLabelsRequest>, JsonRejection>,
) -> Result<Json<RenderLabelsResponse>, AppError> {
    let req = extract_validated_json(body)?;
    let actor = req.actor.map(ActorId);

    let mut rendered = 0u32;
    for raw in &req.codes {
        let Ok(code) = LabelCode::new(raw.clone()) else {
            continue;
        };
        match state.registry.mark_rendered(&code, actor) {
            Ok(label) => {
                mirror_label(&state, &label).await;
                rendered += 1;
            }
            Err(e) => {
                tracing::debug!(code = %code, error = %e, "render marking skipped");
            }
        }
    }
    Ok(Json(RenderLabelsResponse { rendered }))
}

/// Parse a path code segment into a validated label code.
pub(crate) fn parse_code(raw: &str) -> Result<LabelCode, AppError> {
    LabelCode::new(raw).map_err(|e| AppError::Validation(e.to_string()))
}
