//! # HTTP Routes
//!
//! One module per surface: label issuance and lookup, scans, kit
//! requirement resolution, and packing sessions. Handlers hold no
//! business logic — they validate DTOs, delegate to the domain
//! services, and mirror successful mutations to the database.

pub mod kits;
pub mod labels;
pub mod packing;
pub mod scan;

use packhouse_label::{Label, ScanEvent};

use crate::db;
use crate::state::AppState;

/// Mirror a mutated label (and its freshly-appended audit event) to
/// the database. The in-memory services are authoritative; a mirror
/// failure is logged, not surfaced.
pub(crate) async fn mirror_label(state: &AppState, label: &Label) {
    let Some(pool) = &state.db_pool else { return };
    if let Err(e) = db::labels::upsert(pool, label).await {
        tracing::error!(code = %label.code, error = %e, "label write-through failed");
    }
    if let Some(event) = state.registry.history(label.id).into_iter().next_back() {
        mirror_event(state, &event).await;
    }
}

/// Mirror one audit event to the database.
pub(crate) async fn mirror_event(state: &AppState, event: &ScanEvent) {
    let Some(pool) = &state.db_pool else { return };
    if let Err(e) = db::events::insert(pool, event).await {
        tracing::error!(event = %event.id, error = %e, "event write-through failed");
    }
}
