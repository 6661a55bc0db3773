//! # Label Registry
//!
//! Owns label records and their status. `transition` is the **only**
//! write path for `Label.status`: it validates the edge against the
//! legality table, applies the write, and appends the audit event, all
//! under the label's mutual-exclusion guard. Other components request
//! transitions through it rather than mutating status directly, which
//! keeps the legality check and the audit trail in one place.

use packhouse_core::{ActorId, Classified, EntityLocks, ErrorClass, LabelId, LockContention, Store, Timestamp};
use thiserror::Error;
use uuid::Uuid;

use crate::code::{CodePrefix, CodeSequence, LabelCode};
use crate::event::{EventLog, ScanEvent};
use crate::label::Label;
use crate::status::{can_transition, LabelStatus, ObjectType, ScanAction};

/// Errors from registry operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LabelError {
    /// No label exists with the given code.
    #[error("no label with code {code}")]
    NotFound {
        /// The unknown code.
        code: String,
    },

    /// The requested edge is not in the legality table.
    #[error("illegal transition {from} -> {to} for label {code}")]
    IllegalTransition {
        /// The label's code.
        code: String,
        /// Current status.
        from: LabelStatus,
        /// Requested status.
        to: LabelStatus,
    },

    /// The label is void; no further transitions are permitted.
    #[error("label {code} is void")]
    VoidItem {
        /// The label's code.
        code: String,
    },

    /// A component label cannot become `Packed` without a containing box.
    #[error("label {code} cannot be packed without a parent box")]
    ParentRequired {
        /// The label's code.
        code: String,
    },

    /// The label's guard could not be acquired in time.
    #[error(transparent)]
    Contention(#[from] LockContention),
}

impl Classified for LabelError {
    fn class(&self) -> ErrorClass {
        match self {
            Self::NotFound { .. } => ErrorClass::NotFound,
            Self::IllegalTransition { .. } | Self::VoidItem { .. } | Self::ParentRequired { .. } => {
                ErrorClass::IllegalState
            }
            Self::Contention(e) => e.class(),
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "INVALID_CODE",
            Self::IllegalTransition { .. } => "ILLEGAL_TRANSITION",
            Self::VoidItem { .. } => "VOID_ITEM",
            Self::ParentRequired { .. } => "PARENT_REQUIRED",
            Self::Contention(e) => e.code(),
        }
    }
}

/// A requested status transition.
#[derive(Debug, Clone)]
pub struct Transition {
    /// Target status.
    pub to: LabelStatus,
    /// Containing box, required when packing a component label.
    pub parent: Option<LabelId>,
    /// Acting user.
    pub actor: Option<ActorId>,
    /// Free-form remark recorded on the audit event.
    pub note: Option<String>,
}

impl Transition {
    /// A transition with no parent and no note.
    pub fn to(status: LabelStatus, actor: Option<ActorId>) -> Self {
        Self {
            to: status,
            parent: None,
            actor,
            note: None,
        }
    }
}

/// The label registry service.
#[derive(Debug, Default)]
pub struct LabelRegistry {
    labels: Store<LabelId, Label>,
    codes: Store<LabelCode, LabelId>,
    events: EventLog,
    sequence: CodeSequence,
    locks: EntityLocks,
}

impl LabelRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh label: a unique code per the numbering scheme,
    /// status `Created`, and an `Issued` audit event.
    pub fn issue(
        &self,
        object_type: ObjectType,
        object_id: Uuid,
        quantity: u32,
        prefix: &CodePrefix,
        actor: Option<ActorId>,
    ) -> Label {
        let code = self.sequence.next(prefix);
        let label = Label {
            id: LabelId::new(),
            code: code.clone(),
            object_type,
            object_id,
            quantity,
            status: LabelStatus::Created,
            parent_label: None,
            rendered: false,
            last_collected_by: None,
            last_collected_at: None,
            created_at: Timestamp::now(),
        };
        self.labels.insert(label.id, label.clone());
        self.codes.insert(code, label.id);
        self.events.append(label.id, ScanAction::Issued, actor, None);
        tracing::debug!(code = %label.code, object_type = %label.object_type, "label issued");
        label
    }

    /// Look up a label by its code.
    pub fn find(&self, code: &LabelCode) -> Result<Label, LabelError> {
        self.codes
            .get(code)
            .and_then(|id| self.labels.get(&id))
            .ok_or_else(|| LabelError::NotFound {
                code: code.to_string(),
            })
    }

    /// Look up a label by its internal id.
    pub fn get(&self, id: LabelId) -> Option<Label> {
        self.labels.get(&id)
    }

    /// Apply a status transition.
    ///
    /// Validates the edge under the label's guard, re-reading the current
    /// status there — a precondition observed by the caller before the
    /// guard was taken cannot go stale between check and write. On
    /// success the status (and `parent_label`, for pack/unpack edges) is
    /// updated and exactly one audit event is appended.
    ///
    /// Re-asserting `Packed` on an already-packed label is an idempotent
    /// no-op: the record is returned unchanged and no event is appended.
    pub fn transition(&self, id: LabelId, request: Transition) -> Result<Label, LabelError> {
        let _guard = self.locks.acquire(id.0)?;

        let outcome = self
            .labels
            .try_update(&id, |label| -> Result<(Label, Option<ScanAction>), LabelError> {
                let from = label.status;
                if from == LabelStatus::Void {
                    return Err(LabelError::VoidItem {
                        code: label.code.to_string(),
                    });
                }
                if from == LabelStatus::Packed && request.to == LabelStatus::Packed {
                    return Ok((label.clone(), None));
                }
                if !can_transition(label.object_type, from, request.to) {
                    return Err(LabelError::IllegalTransition {
                        code: label.code.to_string(),
                        from,
                        to: request.to,
                    });
                }
                if request.to == LabelStatus::Packed
                    && label.parent_required()
                    && request.parent.is_none()
                {
                    return Err(LabelError::ParentRequired {
                        code: label.code.to_string(),
                    });
                }

                label.status = request.to;
                match request.to {
                    LabelStatus::Packed => label.parent_label = request.parent,
                    // Unpack and uncollect both leave the box (or never entered one).
                    LabelStatus::Collected | LabelStatus::Created => label.parent_label = None,
                    LabelStatus::Void => {}
                }
                if from == LabelStatus::Created && request.to == LabelStatus::Collected {
                    label.last_collected_by = request.actor;
                    label.last_collected_at = Some(Timestamp::now());
                }

                // Every legal edge maps to an action; the table test pins this.
                let action = ScanAction::for_edge(from, request.to);
                Ok((label.clone(), action))
            })
            .ok_or_else(|| LabelError::NotFound {
                code: id.to_string(),
            })??;

        let (label, action) = outcome;
        if let Some(action) = action {
            self.events
                .append(id, action, request.actor, request.note.clone());
            tracing::debug!(code = %label.code, %action, status = %label.status, "label transition");
        }
        Ok(label)
    }

    /// Mark a label as rendered and append a `Rendered` event.
    ///
    /// Imagery is produced by an external collaborator; the registry only
    /// records that it happened.
    pub fn mark_rendered(
        &self,
        code: &LabelCode,
        actor: Option<ActorId>,
    ) -> Result<Label, LabelError> {
        let found = self.find(code)?;
        let _guard = self.locks.acquire(found.id.0)?;
        let label = self
            .labels
            .update(&found.id, |label| label.rendered = true)
            .ok_or_else(|| LabelError::NotFound {
                code: code.to_string(),
            })?;
        self.events.append(label.id, ScanAction::Rendered, actor, None);
        Ok(label)
    }

    /// The audit history for a label, in append order.
    pub fn history(&self, id: LabelId) -> Vec<ScanEvent> {
        self.events.for_label(id)
    }

    /// The audit history for a code.
    pub fn history_for_code(&self, code: &LabelCode) -> Result<Vec<ScanEvent>, LabelError> {
        let label = self.find(code)?;
        Ok(self.history(label.id))
    }

    /// All labels (unordered).
    pub fn list(&self) -> Vec<Label> {
        self.labels.list()
    }

    /// Number of labels in the registry.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the registry holds no labels.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Restore a label from the persistent store. Startup hydration
    /// only: no event is appended, and the code counters advance past
    /// the restored code.
    pub fn restore(&self, label: Label) {
        self.sequence.observe(&label.code);
        self.codes.insert(label.code.clone(), label.id);
        self.labels.insert(label.id, label);
    }

    /// Restore the event log from the persistent store.
    pub fn restore_events(&self, events: Vec<ScanEvent>) {
        self.events.restore(events);
    }
}
