//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor: the label registry, scan validator, kit
//! catalog, and packing manager, plus the optional PostgreSQL pool for
//! write-through persistence.
//!
//! The in-memory services are authoritative; the pool mirrors them for
//! durability. On startup [`AppState::hydrate_from_db`] loads all five
//! entities back into the services, and the code counters continue
//! past the highest persisted code per prefix.

use std::sync::Arc;

use packhouse_kit::KitCatalog;
use packhouse_label::{LabelRegistry, ScanValidator};
use packhouse_packing::PackingManager;
use sqlx::PgPool;

use crate::db;

/// Application configuration, built from the environment by the binary.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

/// Shared application state accessible to all route handlers.
///
/// Clone-friendly: the services share state via `Arc` internals.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Label registry — the single status authority.
    pub registry: Arc<LabelRegistry>,
    /// Scan surface over the registry.
    pub validator: ScanValidator,
    /// Kit catalog and requirement resolver.
    pub catalog: Arc<KitCatalog>,
    /// Packing session manager.
    pub packing: Arc<PackingManager>,
    /// PostgreSQL pool for durable persistence. `None` means
    /// in-memory-only mode.
    pub db_pool: Option<PgPool>,
    /// Application configuration.
    pub config: AppConfig,
}

impl AppState {
    /// Create application state with fresh, empty services.
    pub fn new(config: AppConfig, db_pool: Option<PgPool>) -> Self {
        let registry = Arc::new(LabelRegistry::new());
        let catalog = Arc::new(KitCatalog::new());
        let validator = ScanValidator::new(Arc::clone(&registry));
        let packing = Arc::new(PackingManager::new(
            Arc::clone(&registry),
            Arc::clone(&catalog),
        ));
        Self {
            registry,
            validator,
            catalog,
            packing,
            db_pool,
            config,
        }
    }

    /// Hydrate the in-memory services from the database, if connected.
    ///
    /// Kits load first (sessions reference them), then labels, the
    /// event history, and finally the sessions with their membership.
    pub async fn hydrate_from_db(&self) -> Result<(), sqlx::Error> {
        let Some(pool) = &self.db_pool else {
            tracing::info!("no database configured; running in-memory only");
            return Ok(());
        };

        let kits = db::kits::load_all(pool).await?;
        let kit_count = kits.len();
        for kit in kits {
            self.catalog.restore(kit);
        }

        let labels = db::labels::load_all(pool).await?;
        let label_count = labels.len();
        for label in labels {
            self.registry.restore(label);
        }

        let events = db::events::load_all(pool).await?;
        let event_count = events.len();
        self.registry.restore_events(events);

        let sessions = db::sessions::load_all(pool).await?;
        let session_count = sessions.len();
        for session in sessions {
            self.packing.restore(session);
        }

        tracing::info!(
            kits = kit_count,
            labels = label_count,
            events = event_count,
            sessions = session_count,
            "hydrated from database"
        );
        Ok(())
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AppConfig::default(), None)
    }
}
