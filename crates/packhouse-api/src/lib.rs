//! # packhouse-api — Axum API Service for Packhouse
//!
//! The HTTP surface over the Packhouse domain crates: label issuance
//! and scans, kit requirement resolution, and box-assembly sessions.
//!
//! ## API Surface
//!
//! | Prefix                  | Module               | Domain            |
//! |-------------------------|----------------------|-------------------|
//! | `/v1/labels/*`          | [`routes::labels`]   | Label registry    |
//! | `/v1/scan/*`            | [`routes::scan`]     | Collect/uncollect |
//! | `/v1/kits/*`            | [`routes::kits`]     | Kit resolution    |
//! | `/v1/packing/*`         | [`routes::packing`]  | Box assembly      |
//! | `/health/*`             | (here)               | Probes            |
//! | `/openapi.json`         | [`openapi`]          | API docs          |
//!
//! ## Architecture
//!
//! Request/response types are compile-time contracts via serde derive;
//! handlers hold no business logic and delegate to the domain crates.
//! All errors map to structured HTTP responses via [`AppError`]. The
//! in-memory services are authoritative; PostgreSQL mirrors them when
//! configured.

pub mod db;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::middleware::from_fn;
use axum::Router;
use tower_http::trace::TraceLayer;

pub use error::AppError;
pub use state::{AppConfig, AppState};

/// Assemble the full application router with all routes and middleware.
///
/// Health probes are mounted outside the instrumented stack so they
/// stay cheap and unlogged.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(routes::labels::router())
        .merge(routes::scan::router())
        .merge(routes::kits::router())
        .merge(routes::packing::router())
        .merge(openapi::router())
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let health = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness));

    Router::new().merge(health).merge(api)
}

/// Liveness probe — always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — returns 200 when the application is ready to serve.
async fn readiness() -> &'static str {
    "ready"
}
