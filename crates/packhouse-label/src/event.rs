//! # Scan-Event History
//!
//! Append-only audit trail. Events are never mutated or deleted; the
//! log is the sole source of audit truth. Successful state-changing
//! operations append exactly one event; failed calls append nothing.

use std::sync::Arc;

use packhouse_core::{ActorId, LabelId, Timestamp};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::status::ScanAction;

/// One entry in a label's audit history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanEvent {
    /// Event identifier.
    pub id: Uuid,
    /// The label this event belongs to.
    pub label_id: LabelId,
    /// What happened.
    pub action: ScanAction,
    /// Who did it, if known.
    pub actor: Option<ActorId>,
    /// When it happened.
    pub at: Timestamp,
    /// Free-form remark (e.g. the member manifest on box completion).
    pub note: Option<String>,
}

/// Append-only, thread-safe event log.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<RwLock<Vec<ScanEvent>>>,
}

impl EventLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new event and return it.
    pub fn append(
        &self,
        label_id: LabelId,
        action: ScanAction,
        actor: Option<ActorId>,
        note: Option<String>,
    ) -> ScanEvent {
        let event = ScanEvent {
            id: Uuid::new_v4(),
            label_id,
            action,
            actor,
            at: Timestamp::now(),
            note,
        };
        self.events.write().push(event.clone());
        event
    }

    /// All events for one label, in append order.
    pub fn for_label(&self, label_id: LabelId) -> Vec<ScanEvent> {
        self.events
            .read()
            .iter()
            .filter(|e| e.label_id == label_id)
            .cloned()
            .collect()
    }

    /// All events, in append order.
    pub fn all(&self) -> Vec<ScanEvent> {
        self.events.read().clone()
    }

    /// Number of events in the log.
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replace the log contents with events restored from the store.
    /// Startup hydration only; not an audit-path operation.
    pub fn restore(&self, mut events: Vec<ScanEvent>) {
        events.sort_by_key(|e| e.at);
        *self.events.write() = events;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_and_filter_by_label() {
        let log = EventLog::new();
        let a = LabelId::new();
        let b = LabelId::new();
        log.append(a, ScanAction::Issued, None, None);
        log.append(b, ScanAction::Issued, Some(ActorId(3)), None);
        log.append(a, ScanAction::Collected, Some(ActorId(3)), None);

        let for_a = log.for_label(a);
        assert_eq!(for_a.len(), 2);
        assert_eq!(for_a[0].action, ScanAction::Issued);
        assert_eq!(for_a[1].action, ScanAction::Collected);
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn restore_orders_by_time() {
        let log = EventLog::new();
        let id = LabelId::new();
        let older = ScanEvent {
            id: Uuid::new_v4(),
            label_id: id,
            action: ScanAction::Issued,
            actor: None,
            at: Timestamp::parse("2026-01-01T00:00:00Z").unwrap(),
            note: None,
        };
        let newer = ScanEvent {
            at: Timestamp::parse("2026-02-01T00:00:00Z").unwrap(),
            action: ScanAction::Collected,
            ..older.clone()
        };
        log.restore(vec![newer, older]);
        let events = log.for_label(id);
        assert_eq!(events[0].action, ScanAction::Issued);
        assert_eq!(events[1].action, ScanAction::Collected);
    }
}
