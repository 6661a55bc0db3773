//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI spec,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Packhouse API",
        version = "0.1.0",
        description = "Inventory labeling and kit-packing service: label issuance, \
                       collect/uncollect scans, kit requirement resolution, and \
                       box-assembly sessions.",
        license(name = "AGPL-3.0-or-later")
    ),
    paths(
        // Labels
        crate::routes::labels::issue_labels,
        crate::routes::labels::get_label,
        crate::routes::labels::get_label_history,
        crate::routes::labels::render_labels,
        // Scan
        crate::routes::scan::collect,
        crate::routes::scan::uncollect,
        crate::routes::scan::preview,
        // Kits
        crate::routes::kits::get_requirements,
        // Packing
        crate::routes::packing::start_packing,
        crate::routes::packing::add_item,
        crate::routes::packing::remove_item,
        crate::routes::packing::complete_box,
        crate::routes::packing::packing_status,
    ),
    tags(
        (name = "labels", description = "Label issuance, lookup, history, rendering"),
        (name = "scan", description = "Collect and uncollect scans"),
        (name = "kits", description = "Kit requirement resolution"),
        (name = "packing", description = "Box-assembly sessions"),
    )
)]
pub struct ApiDoc;

/// Router serving the assembled spec.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(serve_openapi))
}

async fn serve_openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
