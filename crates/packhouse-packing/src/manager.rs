//! # Packing Session Manager
//!
//! Start, add, remove, complete, and report on box-assembly sessions.
//! Item eligibility and every label status write go through the label
//! registry; target quantities come from the kit catalog.
//!
//! ## Locking discipline
//!
//! The session scope (keyed by box label) is acquired before any label
//! scope, workspace-wide. `add_item` and `remove_item` take the session
//! guard and then transition the item (which takes the item's guard);
//! `complete` takes the session guard and then member guards one at a
//! time. Check-then-act sequences never escape the owning guard.

use std::sync::Arc;

use packhouse_core::{
    ActorId, Classified, ComponentTypeId, EntityLocks, ErrorClass, KitId, LabelId, LockContention,
    SessionId, Store, Timestamp,
};
use packhouse_kit::{KitCatalog, KitError};
use packhouse_label::{
    Label, LabelCode, LabelError, LabelRegistry, LabelStatus, ObjectType, Transition,
};
use thiserror::Error;

use crate::progress::{compute_progress, shortfall, PackingProgress, Shortfall};
use crate::session::{PackedItem, PackingSession, SessionStatus};

/// Errors from the packing surface.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PackingError {
    /// The box code is unknown or does not denote a box label.
    #[error("{code} is not a box label")]
    InvalidBox {
        /// The rejected code.
        code: String,
    },

    /// The item code is unknown.
    #[error("no item with code {code}")]
    ItemNotFound {
        /// The unknown code.
        code: String,
    },

    /// The scanned code denotes a box, not a component.
    #[error("{code} is not a component label")]
    ItemMustBeComponent {
        /// The rejected code.
        code: String,
    },

    /// The item has not been collected yet (or is no longer collected).
    #[error("item {code} must be collected before packing")]
    ItemNotScanned {
        /// The item's code.
        code: String,
    },

    /// The item already sits inside a box.
    #[error("item {code} is already packed into a box")]
    ItemAlreadyBoxed {
        /// The item's code.
        code: String,
    },

    /// No packing session exists for this box.
    #[error("packing has not started for box {box_code}")]
    PackingNotStarted {
        /// The box code.
        box_code: String,
    },

    /// The box's session is already completed.
    #[error("box {box_code} has already been completed")]
    BoxAlreadyCompleted {
        /// The box code.
        box_code: String,
    },

    /// Items cannot leave a completed box.
    #[error("cannot remove items from completed box {box_code}")]
    CannotRemoveFromCompletedBox {
        /// The box code.
        box_code: String,
    },

    /// The item is not in this box's membership set.
    #[error("item {code} is not in box {box_code}")]
    ItemNotInThisBox {
        /// The item's code.
        code: String,
        /// The box code.
        box_code: String,
    },

    /// A new session needs a kit identifier.
    #[error("kit_id is required to start packing")]
    KitRequired,

    /// The kit has no requirement row for this component type.
    #[error("component type {component_type_id} is not required for kit {kit_id}")]
    ComponentNotRequiredForKit {
        /// The offending component type.
        component_type_id: ComponentTypeId,
        /// The kit being assembled.
        kit_id: KitId,
    },

    /// The requirement for this component type is already satisfied;
    /// over-packing is rejected, not silently capped.
    #[error("component type {component_type_id} already has its required {required} item(s)")]
    ComponentQuantityExceeded {
        /// The offending component type.
        component_type_id: ComponentTypeId,
        /// The satisfied quantity.
        required: u32,
    },

    /// Completion rejected: one or more requirements are unmet.
    #[error("box cannot be completed; {} requirement(s) unmet", missing.len())]
    MissingComponents {
        /// The unmet requirements, in requirement order.
        missing: Vec<Shortfall>,
    },

    /// Kit catalog rejection (unknown kit).
    #[error(transparent)]
    Kit(#[from] KitError),

    /// Label registry rejection not covered by a packing kind.
    #[error(transparent)]
    Label(#[from] LabelError),

    /// A guard could not be acquired in time.
    #[error(transparent)]
    Contention(#[from] LockContention),
}

impl Classified for PackingError {
    fn class(&self) -> ErrorClass {
        match self {
            Self::InvalidBox { .. } | Self::ItemNotFound { .. } => ErrorClass::NotFound,
            Self::ItemMustBeComponent { .. }
            | Self::ItemNotScanned { .. }
            | Self::ItemAlreadyBoxed { .. }
            | Self::PackingNotStarted { .. }
            | Self::BoxAlreadyCompleted { .. }
            | Self::CannotRemoveFromCompletedBox { .. }
            | Self::ItemNotInThisBox { .. } => ErrorClass::IllegalState,
            Self::KitRequired
            | Self::ComponentNotRequiredForKit { .. }
            | Self::ComponentQuantityExceeded { .. }
            | Self::MissingComponents { .. } => ErrorClass::PolicyViolation,
            Self::Kit(e) => e.class(),
            Self::Label(e) => e.class(),
            Self::Contention(e) => e.class(),
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::InvalidBox { .. } => "INVALID_BOX",
            Self::ItemNotFound { .. } => "ITEM_NOT_FOUND",
            Self::ItemMustBeComponent { .. } => "ITEM_MUST_BE_COMPONENT",
            Self::ItemNotScanned { .. } => "ITEM_NOT_SCANNED",
            Self::ItemAlreadyBoxed { .. } => "ITEM_ALREADY_BOXED",
            Self::PackingNotStarted { .. } => "PACKING_NOT_STARTED",
            Self::BoxAlreadyCompleted { .. } => "BOX_ALREADY_COMPLETED",
            Self::CannotRemoveFromCompletedBox { .. } => "CANNOT_REMOVE_FROM_COMPLETED_BOX",
            Self::ItemNotInThisBox { .. } => "ITEM_NOT_IN_THIS_BOX",
            Self::KitRequired => "KIT_ID_REQUIRED",
            Self::ComponentNotRequiredForKit { .. } => "COMPONENT_NOT_REQUIRED_FOR_KIT",
            Self::ComponentQuantityExceeded { .. } => "COMPONENT_QUANTITY_EXCEEDED",
            Self::MissingComponents { .. } => "MISSING_COMPONENTS",
            Self::Kit(e) => e.code(),
            Self::Label(e) => e.code(),
            Self::Contention(e) => e.code(),
        }
    }
}

/// Result of `start`: the session, and whether it already existed.
#[derive(Debug, Clone)]
pub struct StartOutcome {
    /// The in-progress session for the box.
    pub session: PackingSession,
    /// True when an existing in-progress session was resumed.
    pub resumed: bool,
}

/// Result of `add_item` / `remove_item`: the touched item and the
/// recomputed progress.
#[derive(Debug, Clone)]
pub struct AddOutcome {
    /// The item after its transition.
    pub item: Label,
    /// Progress after the mutation.
    pub progress: PackingProgress,
}

/// The packing session manager service.
#[derive(Debug)]
pub struct PackingManager {
    sessions: Store<SessionId, PackingSession>,
    by_box: Store<LabelId, SessionId>,
    registry: Arc<LabelRegistry>,
    catalog: Arc<KitCatalog>,
    locks: EntityLocks,
}

impl PackingManager {
    /// Create a manager over the shared registry and catalog.
    pub fn new(registry: Arc<LabelRegistry>, catalog: Arc<KitCatalog>) -> Self {
        Self {
            sessions: Store::new(),
            by_box: Store::new(),
            registry,
            catalog,
            locks: EntityLocks::new(),
        }
    }

    /// Start packing a box against a kit, or resume the box's
    /// in-progress session.
    ///
    /// Resuming ignores `kit_id` — a station restart must not lose
    /// progress. A completed box refuses to start again.
    pub fn start(
        &self,
        kit_id: Option<KitId>,
        box_code: &LabelCode,
        actor: Option<ActorId>,
    ) -> Result<StartOutcome, PackingError> {
        let box_label = self.resolve_box(box_code)?;
        let _guard = self.locks.acquire(box_label.id.0)?;

        if let Some(existing) = self.session_for(box_label.id) {
            if existing.status == SessionStatus::Completed {
                return Err(PackingError::BoxAlreadyCompleted {
                    box_code: box_code.to_string(),
                });
            }
            return Ok(StartOutcome {
                session: existing,
                resumed: true,
            });
        }

        let kit_id = kit_id.ok_or(PackingError::KitRequired)?;
        let kit = self.catalog.get(kit_id)?;
        let session = PackingSession::start(kit.id, box_label.id, actor);
        self.sessions.insert(session.id, session.clone());
        self.by_box.insert(box_label.id, session.id);
        tracing::info!(box_code = %box_code, kit = %kit.name, session = %session.id, "packing started");
        Ok(StartOutcome {
            session,
            resumed: false,
        })
    }

    /// Pack a collected component item into the box.
    pub fn add_item(
        &self,
        box_code: &LabelCode,
        item_code: &LabelCode,
        actor: Option<ActorId>,
    ) -> Result<AddOutcome, PackingError> {
        let box_label = self.resolve_box(box_code)?;
        let item = self.resolve_item(item_code)?;
        if item.status != LabelStatus::Collected {
            return Err(PackingError::ItemNotScanned {
                code: item_code.to_string(),
            });
        }
        if item.parent_label.is_some() {
            return Err(PackingError::ItemAlreadyBoxed {
                code: item_code.to_string(),
            });
        }

        let _guard = self.locks.acquire(box_label.id.0)?;
        let session = self
            .session_for(box_label.id)
            .ok_or_else(|| PackingError::PackingNotStarted {
                box_code: box_code.to_string(),
            })?;
        if session.status == SessionStatus::Completed {
            return Err(PackingError::BoxAlreadyCompleted {
                box_code: box_code.to_string(),
            });
        }

        let requirements = self.catalog.requirements_for(session.kit_id)?;
        let component_type_id = ComponentTypeId(item.object_id);
        let requirement = requirements
            .iter()
            .find(|r| r.component_type_id == component_type_id)
            .ok_or(PackingError::ComponentNotRequiredForKit {
                component_type_id,
                kit_id: session.kit_id,
            })?;

        if session.count_of(component_type_id) >= requirement.required_quantity {
            return Err(PackingError::ComponentQuantityExceeded {
                component_type_id,
                required: requirement.required_quantity,
            });
        }

        // The registry re-validates under the item's guard; a scan that
        // raced us surfaces as the right caller error.
        let item = self
            .registry
            .transition(
                item.id,
                Transition {
                    to: LabelStatus::Packed,
                    parent: Some(box_label.id),
                    actor,
                    note: None,
                },
            )
            .map_err(|e| Self::remap_pack(item_code, e))?;

        let session = self
            .sessions
            .update(&session.id, |s| {
                s.items.push(PackedItem {
                    label_id: item.id,
                    component_type_id,
                    code: item.code.clone(),
                    packed_at: Timestamp::now(),
                })
            })
            .ok_or_else(|| PackingError::PackingNotStarted {
                box_code: box_code.to_string(),
            })?;

        let progress = compute_progress(box_label.code.clone(), &session, &requirements);
        tracing::debug!(box_code = %box_code, item = %item.code,
            scanned = progress.total_scanned, required = progress.total_required, "item packed");
        Ok(AddOutcome { item, progress })
    }

    /// Take an item back out of the box: the exact inverse of
    /// `add_item`, modulo the audit trail.
    pub fn remove_item(
        &self,
        box_code: &LabelCode,
        item_code: &LabelCode,
        actor: Option<ActorId>,
    ) -> Result<AddOutcome, PackingError> {
        let box_label = self.resolve_box(box_code)?;
        let item = self.resolve_item(item_code)?;

        let _guard = self.locks.acquire(box_label.id.0)?;
        let session = self
            .session_for(box_label.id)
            .ok_or_else(|| PackingError::PackingNotStarted {
                box_code: box_code.to_string(),
            })?;
        if session.status == SessionStatus::Completed {
            return Err(PackingError::CannotRemoveFromCompletedBox {
                box_code: box_code.to_string(),
            });
        }
        if !session.contains(item.id) {
            return Err(PackingError::ItemNotInThisBox {
                code: item_code.to_string(),
                box_code: box_code.to_string(),
            });
        }

        let item = self.registry.transition(
            item.id,
            Transition {
                to: LabelStatus::Collected,
                parent: None,
                actor,
                note: Some(format!("removed from box {box_code}")),
            },
        )?;

        let session = self
            .sessions
            .update(&session.id, |s| s.items.retain(|i| i.label_id != item.id))
            .ok_or_else(|| PackingError::PackingNotStarted {
                box_code: box_code.to_string(),
            })?;

        let requirements = self.catalog.requirements_for(session.kit_id)?;
        let progress = compute_progress(box_label.code.clone(), &session, &requirements);
        tracing::debug!(box_code = %box_code, item = %item.code, "item removed");
        Ok(AddOutcome { item, progress })
    }

    /// Seal the box: verify every requirement is exactly met, pack the
    /// box label, and complete the session irreversibly.
    pub fn complete(
        &self,
        box_code: &LabelCode,
        actor: Option<ActorId>,
    ) -> Result<PackingSession, PackingError> {
        let box_label = self.resolve_box(box_code)?;
        let _guard = self.locks.acquire(box_label.id.0)?;

        let session = self
            .session_for(box_label.id)
            .ok_or_else(|| PackingError::PackingNotStarted {
                box_code: box_code.to_string(),
            })?;
        if session.status == SessionStatus::Completed {
            return Err(PackingError::BoxAlreadyCompleted {
                box_code: box_code.to_string(),
            });
        }

        let requirements = self.catalog.requirements_for(session.kit_id)?;
        let missing = shortfall(&session, &requirements);
        if !missing.is_empty() {
            return Err(PackingError::MissingComponents { missing });
        }

        // Re-assert every member as packed. Members were packed by
        // add_item; the registry treats a repeat as an idempotent no-op.
        for member in &session.items {
            self.registry.transition(
                member.label_id,
                Transition {
                    to: LabelStatus::Packed,
                    parent: Some(box_label.id),
                    actor,
                    note: None,
                },
            )?;
        }

        // One summarizing event on the box label carries the manifest.
        let manifest = session
            .items
            .iter()
            .map(|i| i.code.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        self.registry.transition(
            box_label.id,
            Transition {
                to: LabelStatus::Packed,
                parent: None,
                actor,
                note: Some(format!("box packed; members: {manifest}")),
            },
        )?;

        let completed = self
            .sessions
            .update(&session.id, |s| {
                s.status = SessionStatus::Completed;
                s.completed_at = Some(Timestamp::now());
                if actor.is_some() {
                    s.actor = actor;
                }
            })
            .ok_or_else(|| PackingError::PackingNotStarted {
                box_code: box_code.to_string(),
            })?;

        tracing::info!(box_code = %box_code, session = %completed.id,
            items = completed.items.len(), "box completed");
        Ok(completed)
    }

    /// Read-only progress report. Usable at any time, including after
    /// completion, to render a final manifest.
    pub fn status(&self, box_code: &LabelCode) -> Result<PackingProgress, PackingError> {
        let box_label = self.resolve_box(box_code)?;
        let session = self
            .session_for(box_label.id)
            .ok_or_else(|| PackingError::PackingNotStarted {
                box_code: box_code.to_string(),
            })?;
        let requirements = self.catalog.requirements_for(session.kit_id)?;
        Ok(compute_progress(box_label.code, &session, &requirements))
    }

    /// The session assembling a box label, if one exists.
    pub fn session_for(&self, box_label: LabelId) -> Option<PackingSession> {
        self.by_box.get(&box_label).and_then(|sid| self.sessions.get(&sid))
    }

    /// Fetch a session by id.
    pub fn session(&self, id: SessionId) -> Option<PackingSession> {
        self.sessions.get(&id)
    }

    /// All sessions (unordered).
    pub fn list(&self) -> Vec<PackingSession> {
        self.sessions.list()
    }

    /// Restore a session from the persistent store. Startup hydration
    /// only.
    pub fn restore(&self, session: PackingSession) {
        self.by_box.insert(session.box_label, session.id);
        self.sessions.insert(session.id, session);
    }

    fn resolve_box(&self, box_code: &LabelCode) -> Result<Label, PackingError> {
        let label = self
            .registry
            .find(box_code)
            .map_err(|_| PackingError::InvalidBox {
                code: box_code.to_string(),
            })?;
        if label.object_type != ObjectType::Box {
            return Err(PackingError::InvalidBox {
                code: box_code.to_string(),
            });
        }
        Ok(label)
    }

    fn resolve_item(&self, item_code: &LabelCode) -> Result<Label, PackingError> {
        let item = self
            .registry
            .find(item_code)
            .map_err(|_| PackingError::ItemNotFound {
                code: item_code.to_string(),
            })?;
        if item.object_type != ObjectType::Component {
            return Err(PackingError::ItemMustBeComponent {
                code: item_code.to_string(),
            });
        }
        Ok(item)
    }

    /// A registry rejection after our eligibility read means a scan
    /// raced us; translate by what the state became.
    fn remap_pack(item_code: &LabelCode, err: LabelError) -> PackingError {
        match err {
            LabelError::IllegalTransition {
                from: LabelStatus::Packed,
                ..
            } => PackingError::ItemAlreadyBoxed {
                code: item_code.to_string(),
            },
            LabelError::IllegalTransition { .. } | LabelError::VoidItem { .. } => {
                PackingError::ItemNotScanned {
                    code: item_code.to_string(),
                }
            }
            other => PackingError::Label(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use packhouse_kit::KitRequirement;
    use packhouse_label::{CodePrefix, ScanAction, ScanValidator};
    use uuid::Uuid;

    struct Bench {
        registry: Arc<LabelRegistry>,
        catalog: Arc<KitCatalog>,
        validator: ScanValidator,
        manager: PackingManager,
    }

    fn bench() -> Bench {
        let registry = Arc::new(LabelRegistry::new());
        let catalog = Arc::new(KitCatalog::new());
        let validator = ScanValidator::new(Arc::clone(&registry));
        let manager = PackingManager::new(Arc::clone(&registry), Arc::clone(&catalog));
        Bench {
            registry,
            catalog,
            validator,
            manager,
        }
    }

    /// Kit requiring `quantities[i]` of a fresh component type each.
    fn define_kit(bench: &Bench, quantities: &[u32]) -> (KitId, Vec<ComponentTypeId>) {
        let kit = bench.catalog.define("Power Kit", None).unwrap();
        let types: Vec<ComponentTypeId> = quantities
            .iter()
            .map(|&required_quantity| {
                let component_type_id = ComponentTypeId::new();
                bench
                    .catalog
                    .add_requirement(
                        kit.id,
                        KitRequirement {
                            component_type_id,
                            required_quantity,
                            label_prefix: None,
                        },
                    )
                    .unwrap();
                component_type_id
            })
            .collect();
        (kit.id, types)
    }

    fn issue_box(bench: &Bench, kit_id: KitId) -> LabelCode {
        bench
            .registry
            .issue(
                ObjectType::Box,
                *kit_id.as_uuid(),
                1,
                &CodePrefix::for_box("Power Kit"),
                None,
            )
            .code
    }

    /// Issue and collect one component of the given type.
    fn collected_item(bench: &Bench, component_type_id: ComponentTypeId) -> LabelCode {
        let label = bench.registry.issue(
            ObjectType::Component,
            *component_type_id.as_uuid(),
            1,
            &CodePrefix::new("PWR").unwrap(),
            None,
        );
        bench.validator.collect(&label.code, Some(ActorId(1))).unwrap();
        label.code
    }

    // ── start ───────────────────────────────────────────────────────

    #[test]
    fn start_requires_a_box_label() {
        let b = bench();
        let (kit_id, types) = define_kit(&b, &[1]);
        let item = collected_item(&b, types[0]);

        let err = b.manager.start(Some(kit_id), &item, None).unwrap_err();
        assert_eq!(err.code(), "INVALID_BOX");

        let ghost = LabelCode::new("GHOSTBOX1").unwrap();
        let err = b.manager.start(Some(kit_id), &ghost, None).unwrap_err();
        assert_eq!(err.code(), "INVALID_BOX");
    }

    #[test]
    fn start_requires_an_existing_kit() {
        let b = bench();
        let (kit_id, _) = define_kit(&b, &[1]);
        let box_code = issue_box(&b, kit_id);

        let err = b.manager.start(Some(KitId::new()), &box_code, None).unwrap_err();
        assert_eq!(err.code(), "KIT_NOT_FOUND");

        let err = b.manager.start(None, &box_code, None).unwrap_err();
        assert_eq!(err.code(), "KIT_ID_REQUIRED");
    }

    #[test]
    fn start_twice_resumes_the_same_session() {
        let b = bench();
        let (kit_id, _) = define_kit(&b, &[2]);
        let box_code = issue_box(&b, kit_id);

        let first = b.manager.start(Some(kit_id), &box_code, Some(ActorId(1))).unwrap();
        assert!(!first.resumed);

        // Resume works even without a kit id (station restart).
        let second = b.manager.start(None, &box_code, Some(ActorId(2))).unwrap();
        assert!(second.resumed);
        assert_eq!(second.session.id, first.session.id);
        assert_eq!(b.manager.list().len(), 1);
    }

    #[test]
    fn start_does_not_pack_the_box_label() {
        let b = bench();
        let (kit_id, _) = define_kit(&b, &[1]);
        let box_code = issue_box(&b, kit_id);
        b.manager.start(Some(kit_id), &box_code, None).unwrap();

        let box_label = b.registry.find(&box_code).unwrap();
        assert_eq!(box_label.status, LabelStatus::Created);
    }

    // ── add_item ────────────────────────────────────────────────────

    #[test]
    fn add_item_validates_the_item() {
        let b = bench();
        let (kit_id, types) = define_kit(&b, &[1]);
        let box_code = issue_box(&b, kit_id);
        b.manager.start(Some(kit_id), &box_code, None).unwrap();

        let ghost = LabelCode::new("GHOST1").unwrap();
        assert_eq!(
            b.manager.add_item(&box_code, &ghost, None).unwrap_err().code(),
            "ITEM_NOT_FOUND"
        );

        let other_box = issue_box(&b, kit_id);
        assert_eq!(
            b.manager.add_item(&box_code, &other_box, None).unwrap_err().code(),
            "ITEM_MUST_BE_COMPONENT"
        );

        // Issued but never collected.
        let uncollected = b.registry.issue(
            ObjectType::Component,
            *types[0].as_uuid(),
            1,
            &CodePrefix::new("PWR").unwrap(),
            None,
        );
        assert_eq!(
            b.manager.add_item(&box_code, &uncollected.code, None).unwrap_err().code(),
            "ITEM_NOT_SCANNED"
        );
    }

    #[test]
    fn add_item_requires_a_started_session() {
        let b = bench();
        let (kit_id, types) = define_kit(&b, &[1]);
        let box_code = issue_box(&b, kit_id);
        let item = collected_item(&b, types[0]);

        let err = b.manager.add_item(&box_code, &item, None).unwrap_err();
        assert_eq!(err.code(), "PACKING_NOT_STARTED");
    }

    #[test]
    fn add_item_rejects_components_outside_the_kit() {
        let b = bench();
        let (kit_id, _) = define_kit(&b, &[1]);
        let box_code = issue_box(&b, kit_id);
        b.manager.start(Some(kit_id), &box_code, None).unwrap();

        let foreign = collected_item(&b, ComponentTypeId::new());
        let err = b.manager.add_item(&box_code, &foreign, None).unwrap_err();
        assert_eq!(err.code(), "COMPONENT_NOT_REQUIRED_FOR_KIT");
        assert_eq!(err.class(), ErrorClass::PolicyViolation);
    }

    #[test]
    fn add_item_packs_and_reports_progress() {
        let b = bench();
        let (kit_id, types) = define_kit(&b, &[2, 1]);
        let box_code = issue_box(&b, kit_id);
        b.manager.start(Some(kit_id), &box_code, None).unwrap();

        let item = collected_item(&b, types[0]);
        let outcome = b.manager.add_item(&box_code, &item, Some(ActorId(5))).unwrap();
        assert_eq!(outcome.item.status, LabelStatus::Packed);
        assert!(outcome.item.parent_label.is_some());
        assert!(!outcome.progress.all_complete);
        assert_eq!(outcome.progress.total_scanned, 1);
        assert_eq!(outcome.progress.total_required, 3);

        // Packed item cannot be added twice.
        let err = b.manager.add_item(&box_code, &item, None).unwrap_err();
        assert_eq!(err.code(), "ITEM_ALREADY_BOXED");
    }

    #[test]
    fn over_packing_is_rejected_not_capped() {
        let b = bench();
        let (kit_id, types) = define_kit(&b, &[1]);
        let box_code = issue_box(&b, kit_id);
        b.manager.start(Some(kit_id), &box_code, None).unwrap();

        let first = collected_item(&b, types[0]);
        b.manager.add_item(&box_code, &first, None).unwrap();

        let second = collected_item(&b, types[0]);
        let err = b.manager.add_item(&box_code, &second, None).unwrap_err();
        assert_eq!(err.code(), "COMPONENT_QUANTITY_EXCEEDED");
        // The rejected item stays collected and boxless.
        let second_label = b.registry.find(&second).unwrap();
        assert_eq!(second_label.status, LabelStatus::Collected);
        assert_eq!(second_label.parent_label, None);
    }

    // ── remove_item ─────────────────────────────────────────────────

    #[test]
    fn remove_restores_the_exact_pre_add_state() {
        let b = bench();
        let (kit_id, types) = define_kit(&b, &[2, 1]);
        let box_code = issue_box(&b, kit_id);
        b.manager.start(Some(kit_id), &box_code, None).unwrap();

        let before = {
            let item = collected_item(&b, types[0]);
            let pre = b.manager.status(&box_code).unwrap();
            let added = b.manager.add_item(&box_code, &item, None).unwrap();
            assert_eq!(added.progress.total_scanned, pre.total_scanned + 1);

            let removed = b.manager.remove_item(&box_code, &item, None).unwrap();
            assert_eq!(removed.item.status, LabelStatus::Collected);
            assert_eq!(removed.item.parent_label, None);

            let post = b.manager.status(&box_code).unwrap();
            assert_eq!(post.total_scanned, pre.total_scanned);
            assert_eq!(post.requirements, pre.requirements);

            // Audit trail grew: packed then unpacked.
            let history = b.registry.history_for_code(&item).unwrap();
            let actions: Vec<ScanAction> = history.iter().map(|e| e.action).collect();
            assert!(actions.ends_with(&[ScanAction::Packed, ScanAction::Unpacked]));
            item
        };

        // Removed item can be re-added.
        assert!(b.manager.add_item(&box_code, &before, None).is_ok());
    }

    #[test]
    fn remove_rejects_items_not_in_the_box() {
        let b = bench();
        let (kit_id, types) = define_kit(&b, &[1]);
        let box_code = issue_box(&b, kit_id);
        b.manager.start(Some(kit_id), &box_code, None).unwrap();

        let loose = collected_item(&b, types[0]);
        let err = b.manager.remove_item(&box_code, &loose, None).unwrap_err();
        assert_eq!(err.code(), "ITEM_NOT_IN_THIS_BOX");
    }

    // ── complete ────────────────────────────────────────────────────

    #[test]
    fn full_assembly_scenario() {
        // Kit K requires 2 x ComponentA, 1 x ComponentB.
        let b = bench();
        let (kit_id, types) = define_kit(&b, &[2, 1]);
        let box_code = issue_box(&b, kit_id);

        let a1 = collected_item(&b, types[0]);
        let a2 = collected_item(&b, types[0]);
        let b1 = collected_item(&b, types[1]);

        let started = b.manager.start(Some(kit_id), &box_code, Some(ActorId(1))).unwrap();
        assert_eq!(started.session.status, SessionStatus::InProgress);

        assert!(!b.manager.add_item(&box_code, &a1, None).unwrap().progress.all_complete);
        assert!(!b.manager.add_item(&box_code, &a2, None).unwrap().progress.all_complete);
        // Third add reports completion readiness.
        assert!(b.manager.add_item(&box_code, &b1, None).unwrap().progress.all_complete);

        let completed = b.manager.complete(&box_code, Some(ActorId(1))).unwrap();
        assert_eq!(completed.status, SessionStatus::Completed);
        assert!(completed.completed_at.is_some());

        // Box label and all member labels are packed.
        assert_eq!(b.registry.find(&box_code).unwrap().status, LabelStatus::Packed);
        for code in [&a1, &a2, &b1] {
            assert_eq!(b.registry.find(code).unwrap().status, LabelStatus::Packed);
        }

        // The box's completion event carries the member manifest.
        let box_history = b.registry.history_for_code(&box_code).unwrap();
        let note = box_history.last().unwrap().note.clone().unwrap();
        for code in [&a1, &a2, &b1] {
            assert!(note.contains(code.as_str()), "manifest missing {code}");
        }

        // A later status call still reports 2/2 and 1/1, all complete.
        let report = b.manager.status(&box_code).unwrap();
        assert!(report.all_complete);
        assert_eq!(report.status, SessionStatus::Completed);
        assert_eq!(report.requirements[0].scanned, 2);
        assert_eq!(report.requirements[1].scanned, 1);
    }

    #[test]
    fn incomplete_box_reports_the_shortfall() {
        // Same kit, only 1 x ComponentA packed.
        let b = bench();
        let (kit_id, types) = define_kit(&b, &[2, 1]);
        let box_code = issue_box(&b, kit_id);
        b.manager.start(Some(kit_id), &box_code, None).unwrap();

        let a1 = collected_item(&b, types[0]);
        b.manager.add_item(&box_code, &a1, None).unwrap();

        let err = b.manager.complete(&box_code, None).unwrap_err();
        match &err {
            PackingError::MissingComponents { missing } => {
                assert_eq!(missing.len(), 2);
                assert_eq!(missing[0].component_type_id, types[0]);
                assert_eq!((missing[0].scanned, missing[0].required), (1, 2));
                assert_eq!(missing[1].component_type_id, types[1]);
                assert_eq!((missing[1].scanned, missing[1].required), (0, 1));
            }
            other => panic!("expected MissingComponents, got {other:?}"),
        }
        assert_eq!(err.code(), "MISSING_COMPONENTS");

        // Nothing was sealed by the failed attempt.
        assert_eq!(b.registry.find(&box_code).unwrap().status, LabelStatus::Created);
        assert_eq!(
            b.manager.session_for(b.registry.find(&box_code).unwrap().id).unwrap().status,
            SessionStatus::InProgress
        );
    }

    #[test]
    fn completion_happens_exactly_once() {
        let b = bench();
        let (kit_id, types) = define_kit(&b, &[1]);
        let box_code = issue_box(&b, kit_id);
        b.manager.start(Some(kit_id), &box_code, None).unwrap();
        let item = collected_item(&b, types[0]);
        b.manager.add_item(&box_code, &item, None).unwrap();
        b.manager.complete(&box_code, None).unwrap();

        assert_eq!(
            b.manager.complete(&box_code, None).unwrap_err().code(),
            "BOX_ALREADY_COMPLETED"
        );
        assert_eq!(
            b.manager.start(Some(kit_id), &box_code, None).unwrap_err().code(),
            "BOX_ALREADY_COMPLETED"
        );
        assert_eq!(
            b.manager.remove_item(&box_code, &item, None).unwrap_err().code(),
            "CANNOT_REMOVE_FROM_COMPLETED_BOX"
        );
        assert_eq!(
            b.manager.add_item(&box_code, &item, None).unwrap_err().code(),
            "ITEM_ALREADY_BOXED"
        );
    }

    #[test]
    fn status_without_session_is_not_started() {
        let b = bench();
        let (kit_id, _) = define_kit(&b, &[1]);
        let box_code = issue_box(&b, kit_id);
        let err = b.manager.status(&box_code).unwrap_err();
        assert_eq!(err.code(), "PACKING_NOT_STARTED");
    }
}


#[cfg(test)]
pub(crate) mod tests_support {
    //! Shared scaffolding for the property tests.

    use super::*;
    use packhouse_kit::KitRequirement;
    use packhouse_label::{CodePrefix, ScanValidator};

    pub struct World {
        pub registry: Arc<LabelRegistry>,
        pub validator: ScanValidator,
        pub manager: PackingManager,
        pub box_code: LabelCode,
        pub types: Vec<ComponentTypeId>,
    }

    impl World {
        /// A started session against a kit requiring `quantities[i]` of
        /// component type `i`.
        pub fn with_kit(quantities: &[u32]) -> Self {
            let registry = Arc::new(LabelRegistry::new());
            let catalog = Arc::new(KitCatalog::new());
            let validator = ScanValidator::new(Arc::clone(&registry));
            let manager = PackingManager::new(Arc::clone(&registry), Arc::clone(&catalog));

            let kit = catalog.define("Prop Kit", None).unwrap();
            let types: Vec<ComponentTypeId> = quantities
                .iter()
                .map(|&required_quantity| {
                    let component_type_id = ComponentTypeId::new();
                    catalog
                        .add_requirement(
                            kit.id,
                            KitRequirement {
                                component_type_id,
                                required_quantity,
                                label_prefix: None,
                            },
                        )
                        .unwrap();
                    component_type_id
                })
                .collect();

            let box_code = registry
                .issue(
                    ObjectType::Box,
                    *kit.id.as_uuid(),
                    1,
                    &CodePrefix::for_box("Prop Kit"),
                    None,
                )
                .code;
            manager.start(Some(kit.id), &box_code, None).unwrap();

            Self {
                registry,
                validator,
                manager,
                box_code,
                types,
            }
        }

        /// Issue, collect, and pack one fresh item of type index `idx`.
        pub fn add_fresh_item(&self, idx: usize) -> Result<AddOutcome, PackingError> {
            let label = self.registry.issue(
                ObjectType::Component,
                *self.types[idx].as_uuid(),
                1,
                &CodePrefix::new("PRP").unwrap(),
                None,
            );
            self.validator.collect(&label.code, None).unwrap();
            self.manager.add_item(&self.box_code, &label.code, None)
        }

        pub fn complete(&self) -> Result<PackingSession, PackingError> {
            self.manager.complete(&self.box_code, None)
        }
    }

    pub fn err_code(err: &PackingError) -> &'static str {
        err.code()
    }
}
