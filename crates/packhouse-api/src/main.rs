//! # packhouse-api — Binary Entry Point
//!
//! Starts the Axum HTTP server. Configuration comes from the
//! environment: `PORT` (default 8080) and `DATABASE_URL` (optional —
//! absent means in-memory only).

use anyhow::Context;
use metrics_exporter_prometheus::PrometheusBuilder;
use packhouse_api::{AppConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Build configuration from environment.
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);
    let config = AppConfig { port };

    // Initialize database pool (optional — absent means in-memory only).
    let db_pool = packhouse_api::db::init_pool()
        .await
        .context("database initialization failed")?;

    // Build state and hydrate from the database if connected.
    let state = AppState::new(config, db_pool);
    state
        .hydrate_from_db()
        .await
        .context("database hydration failed")?;

    // Prometheus exporter for the request metrics middleware.
    let metrics_handle = PrometheusBuilder::new()
        .install_recorder()
        .context("metrics recorder installation failed")?;

    let app = packhouse_api::app(state).route(
        "/metrics",
        axum::routing::get(move || {
            let handle = metrics_handle.clone();
            async move { handle.render() }
        }),
    );

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Packhouse API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
