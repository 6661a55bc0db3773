//! # Scan Routes
//!
//! The station-facing scan surface: collect, uncollect, and read-only
//! preview.
//!
//! ## Endpoints
//!
//! - `POST /v1/scan/collect` — mark a label collected
//! - `POST /v1/scan/uncollect` — revert a collect
//! - `GET /v1/scan/preview/{code}` — look up without mutating

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use packhouse_core::ActorId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::routes::labels::{parse_code, LabelDto};
use crate::routes::mirror_label;
use crate::state::AppState;

// ── Request/Response DTOs ───────────────────────────────────────────

/// Request to collect or uncollect one code.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ScanRequest {
    /// The scanned code.
    pub code: String,
    /// Acting user.
    pub actor: Option<i64>,
}

impl Validate for ScanRequest {
    fn validate(&self) -> Result<(), String> {
        if self.code.trim().is_empty() {
            return Err("code must not be empty".to_string());
        }
        Ok(())
    }
}

/// Response to a scan mutation.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ScanResponse {
    /// The label after the scan.
    pub label: LabelDto,
}

// ── Router ──────────────────────────────────────────────────────────

/// Build the scan router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/scan/collect", post(collect))
        .route("/v1/scan/uncollect", post(uncollect))
        .route("/v1/scan/preview/{code}", get(preview))
}

// ── Handlers ────────────────────────────────────────────────────────

/// POST /v1/scan/collect — Mark a label collected.
#[utoipa::path(
    post,
    path = "/v1/scan/collect",
    request_body = ScanRequest,
    responses(
        (status = 200, description = "Label collected", body = ScanResponse),
        (status = 404, description = "Unknown code", body = crate::error::ErrorBody),
        (status = 409, description = "Already collected or void", body = crate::error::ErrorBody),
    ),
    tag = "scan"
)]
async fn collect(
    State(state): State<AppState>,
    body: Result<Json<ScanRequest>, JsonRejection>,
) -> Result<Json<ScanResponse>, AppError> {
    let req = extract_validated_json(body)?;
    let code = parse_code(&req.code)?;
    let label = state.validator.collect(&code, req.actor.map(ActorId))?;
    mirror_label(&state, &label).await;
    Ok(Json(ScanResponse {
        label: label.into(),
    }))
}

/// POST /v1/scan/uncollect — Revert a collect.
#[utoipa::path(
    post,
    path = "/v1/scan/uncollect",
    request_body = ScanRequest,
    responses(
        (status = 200, description = "Label uncollected", body = ScanResponse),
        (status = 404, description = "Unknown code", body = crate::error::ErrorBody),
        (status = 409, description = "Not collected, or packed", body = crate::error::ErrorBody),
    ),
    tag = "scan"
)]
async fn uncollect(
    State(state): State<AppState>,
    body: Result<Json<ScanRequest>, JsonRejection>,
) -> Result<Json<ScanResponse>, AppError> {
    let req = extract_validated_json(body)?;
    let code = parse_code(&req.code)?;
    let label = state.validator.uncollect(&code, req.actor.map(ActorId))?;
    mirror_label(&state, &label).await;
    Ok(Json(ScanResponse {
        label: label.into(),
    }))
}

/// GET /v1/scan/preview/{code} — Look up without mutating.
#[utoipa::path(
    get,
    path = "/v1/scan/preview/{code}",
    params(("code" = String, Path, description = "Label code")),
    responses(
        (status = 200, description = "Label preview", body = LabelDto),
        (status = 404, description = "Unknown code", body = crate::error::ErrorBody),
    ),
    tag = "scan"
)]
async fn preview(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<LabelDto>, AppError> {
    let code = parse_code(&code)?;
    let label = state.validator.preview(&code)?;
    Ok(Json(label.into()))
}
