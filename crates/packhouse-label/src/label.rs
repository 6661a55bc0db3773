//! # Label Record
//!
//! One printed, scannable code affixed to a component unit or a box.

use packhouse_core::{ActorId, LabelId, Timestamp};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::code::LabelCode;
use crate::status::{LabelStatus, ObjectType};

/// A label record.
///
/// `code` is immutable once issued. `status` is written only through
/// [`crate::registry::LabelRegistry::transition`]. For component labels,
/// `parent_label` is non-null iff the label is `Packed`; box labels seal
/// with no parent (a box is not contained in another box).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Label {
    /// Internal identifier.
    pub id: LabelId,
    /// The unique scannable code value.
    pub code: LabelCode,
    /// What this label is affixed to.
    pub object_type: ObjectType,
    /// The component type (for component labels) or kit (for box labels)
    /// this label denotes.
    pub object_id: Uuid,
    /// Informational multiplier ("this one packet contains N units").
    pub quantity: u32,
    /// Current lifecycle status.
    pub status: LabelStatus,
    /// The box label containing this item, while packed.
    pub parent_label: Option<LabelId>,
    /// Whether a label image has been rendered for this code.
    pub rendered: bool,
    /// Actor of the last collect.
    pub last_collected_by: Option<ActorId>,
    /// Time of the last collect.
    pub last_collected_at: Option<Timestamp>,
    /// When the label was issued.
    pub created_at: Timestamp,
}

impl Label {
    /// Whether this is a component label.
    pub fn is_component(&self) -> bool {
        self.object_type == ObjectType::Component
    }

    /// Whether this is a box label.
    pub fn is_box(&self) -> bool {
        self.object_type == ObjectType::Box
    }

    /// Whether the packed state requires a parent box for this label.
    pub fn parent_required(&self) -> bool {
        self.is_component()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn sample(object_type: ObjectType) -> Label {
        Label {
            id: LabelId::new(),
            code: LabelCode::new("PWR0000001").unwrap(),
            object_type,
            object_id: Uuid::new_v4(),
            quantity: 1,
            status: LabelStatus::Created,
            parent_label: None,
            rendered: false,
            last_collected_by: None,
            last_collected_at: None,
            created_at: Timestamp::now(),
        }
    }

    #[test]
    fn parent_required_only_for_components() {
        assert!(sample(ObjectType::Component).parent_required());
        assert!(!sample(ObjectType::Box).parent_required());
    }

    #[test]
    fn serde_roundtrip() {
        let label = sample(ObjectType::Component);
        let json = serde_json::to_string(&label).unwrap();
        let parsed: Label = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id, label.id);
        assert_eq!(parsed.status, label.status);
        assert_eq!(parsed.code, label.code);
    }
}
