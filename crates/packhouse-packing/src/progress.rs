//! # Progress & Shortfall Computation
//!
//! Pure functions diffing a session's membership set against the kit's
//! requirements. Counts are recomputed from membership on every call
//! (see the crate-level policy note); nothing here mutates anything.

use packhouse_core::{ComponentTypeId, KitId, SessionId};
use packhouse_kit::KitRequirement;
use packhouse_label::LabelCode;
use serde::{Deserialize, Serialize};

use crate::session::{PackingSession, SessionStatus};

/// Per-requirement progress within a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementProgress {
    /// The required component type.
    pub component_type_id: ComponentTypeId,
    /// Required quantity.
    pub required: u32,
    /// Currently packed quantity.
    pub scanned: u32,
    /// The codes currently packed for this requirement.
    pub scanned_codes: Vec<LabelCode>,
    /// Whether this requirement is satisfied.
    pub complete: bool,
}

/// A progress report for one box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackingProgress {
    /// The box label's code.
    pub box_code: LabelCode,
    /// The kit being assembled.
    pub kit_id: KitId,
    /// The session.
    pub session_id: SessionId,
    /// Session status at the time of the report.
    pub status: SessionStatus,
    /// Per-requirement progress, in requirement order.
    pub requirements: Vec<RequirementProgress>,
    /// Total packed items.
    pub total_scanned: u32,
    /// Total required items across all requirements.
    pub total_required: u32,
    /// Whether every requirement is satisfied.
    pub all_complete: bool,
}

/// One unmet requirement, carried by the completion rejection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortfall {
    /// The under-packed component type.
    pub component_type_id: ComponentTypeId,
    /// Required quantity.
    pub required: u32,
    /// Currently packed quantity.
    pub scanned: u32,
}

/// Build a progress report by recounting membership against requirements.
pub fn compute_progress(
    box_code: LabelCode,
    session: &PackingSession,
    requirements: &[KitRequirement],
) -> PackingProgress {
    let per_requirement: Vec<RequirementProgress> = requirements
        .iter()
        .map(|req| {
            let scanned_codes: Vec<LabelCode> = session
                .items
                .iter()
                .filter(|i| i.component_type_id == req.component_type_id)
                .map(|i| i.code.clone())
                .collect();
            let scanned = scanned_codes.len() as u32;
            RequirementProgress {
                component_type_id: req.component_type_id,
                required: req.required_quantity,
                scanned,
                scanned_codes,
                complete: scanned >= req.required_quantity,
            }
        })
        .collect();

    let all_complete = per_requirement.iter().all(|r| r.complete);
    PackingProgress {
        box_code,
        kit_id: session.kit_id,
        session_id: session.id,
        status: session.status,
        total_scanned: session.items.len() as u32,
        total_required: requirements.iter().map(|r| r.required_quantity).sum(),
        requirements: per_requirement,
        all_complete,
    }
}

/// The unmet requirements of a session, in requirement order.
///
/// Empty iff every requirement quantity is met by membership count.
pub fn shortfall(session: &PackingSession, requirements: &[KitRequirement]) -> Vec<Shortfall> {
    requirements
        .iter()
        .filter_map(|req| {
            let scanned = session.count_of(req.component_type_id);
            (scanned < req.required_quantity).then(|| Shortfall {
                component_type_id: req.component_type_id,
                required: req.required_quantity,
                scanned,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use packhouse_core::{KitId, LabelId, Timestamp};
    use crate::session::PackedItem;

    fn req(component_type_id: ComponentTypeId, quantity: u32) -> KitRequirement {
        KitRequirement {
            component_type_id,
            required_quantity: quantity,
            label_prefix: None,
        }
    }

    fn pack(session: &mut PackingSession, component_type_id: ComponentTypeId, code: &str) {
        session.items.push(PackedItem {
            label_id: LabelId::new(),
            component_type_id,
            code: LabelCode::new(code).unwrap(),
            packed_at: Timestamp::now(),
        });
    }

    #[test]
    fn progress_counts_by_requirement() {
        let type_a = ComponentTypeId::new();
        let type_b = ComponentTypeId::new();
        let requirements = [req(type_a, 2), req(type_b, 1)];
        let mut session = PackingSession::start(KitId::new(), LabelId::new(), None);
        pack(&mut session, type_a, "PWR0000001");

        let progress = compute_progress(
            LabelCode::new("POWBOX0000001").unwrap(),
            &session,
            &requirements,
        );
        assert_eq!(progress.total_scanned, 1);
        assert_eq!(progress.total_required, 3);
        assert!(!progress.all_complete);
        assert_eq!(progress.requirements[0].scanned, 1);
        assert!(!progress.requirements[0].complete);
        assert_eq!(progress.requirements[1].scanned, 0);
    }

    #[test]
    fn all_complete_requires_every_requirement() {
        let type_a = ComponentTypeId::new();
        let type_b = ComponentTypeId::new();
        let requirements = [req(type_a, 2), req(type_b, 1)];
        let mut session = PackingSession::start(KitId::new(), LabelId::new(), None);
        pack(&mut session, type_a, "PWR0000001");
        pack(&mut session, type_a, "PWR0000002");
        pack(&mut session, type_b, "CBL0000001");

        let progress = compute_progress(
            LabelCode::new("POWBOX0000001").unwrap(),
            &session,
            &requirements,
        );
        assert!(progress.all_complete);
        assert!(progress.requirements.iter().all(|r| r.complete));
    }

    #[test]
    fn shortfall_lists_unmet_requirements_in_order() {
        let type_a = ComponentTypeId::new();
        let type_b = ComponentTypeId::new();
        let requirements = [req(type_a, 2), req(type_b, 1)];
        let mut session = PackingSession::start(KitId::new(), LabelId::new(), None);
        pack(&mut session, type_a, "PWR0000001");

        let missing = shortfall(&session, &requirements);
        assert_eq!(missing.len(), 2);
        assert_eq!(missing[0].component_type_id, type_a);
        assert_eq!((missing[0].scanned, missing[0].required), (1, 2));
        assert_eq!((missing[1].scanned, missing[1].required), (0, 1));
    }

    #[test]
    fn empty_kit_is_trivially_complete() {
        let session = PackingSession::start(KitId::new(), LabelId::new(), None);
        assert!(shortfall(&session, &[]).is_empty());
        let progress = compute_progress(LabelCode::new("BOX0000001").unwrap(), &session, &[]);
        assert!(progress.all_complete);
    }
}
