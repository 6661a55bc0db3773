//! # Packing Session Record
//!
//! One box's assembly, from start to completion, with its membership
//! set of packed items.

use packhouse_core::{ActorId, ComponentTypeId, KitId, LabelId, SessionId, Timestamp};
use packhouse_label::LabelCode;
use serde::{Deserialize, Serialize};

/// The lifecycle status of a packing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    /// Items are being added and removed.
    InProgress,
    /// All requirements met and the box sealed. Terminal.
    Completed,
}

impl SessionStatus {
    /// The string representation of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
        }
    }

    /// Whether this status permits no further mutation.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SessionStatus {
    type Err = packhouse_label::ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IN_PROGRESS" => Ok(Self::InProgress),
            "COMPLETED" => Ok(Self::Completed),
            other => Err(packhouse_label::ParseEnumError {
                kind: "session status",
                value: other.to_string(),
            }),
        }
    }
}

/// One membership row: a component label packed into the box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackedItem {
    /// The packed component label.
    pub label_id: LabelId,
    /// The label's component type, denormalized for counting.
    pub component_type_id: ComponentTypeId,
    /// The label's code, for manifests and progress payloads.
    pub code: LabelCode,
    /// When the item entered the box.
    pub packed_at: Timestamp,
}

/// A box-assembly session and its membership set.
///
/// Exactly one session ever exists per box label. The membership set is
/// mutated only while the session is `InProgress`; completion is
/// irreversible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackingSession {
    /// Unique session identifier.
    pub id: SessionId,
    /// The kit this box is being assembled against.
    pub kit_id: KitId,
    /// The box label this session assembles.
    pub box_label: LabelId,
    /// Current status.
    pub status: SessionStatus,
    /// The last actor to start or complete the session.
    pub actor: Option<ActorId>,
    /// When packing started.
    pub started_at: Timestamp,
    /// When the session completed.
    pub completed_at: Option<Timestamp>,
    /// Membership set: items currently packed into the box.
    pub items: Vec<PackedItem>,
}

impl PackingSession {
    /// Create a fresh in-progress session.
    pub fn start(kit_id: KitId, box_label: LabelId, actor: Option<ActorId>) -> Self {
        Self {
            id: SessionId::new(),
            kit_id,
            box_label,
            status: SessionStatus::InProgress,
            actor,
            started_at: Timestamp::now(),
            completed_at: None,
            items: Vec::new(),
        }
    }

    /// Count of packed items of one component type.
    pub fn count_of(&self, component_type_id: ComponentTypeId) -> u32 {
        self.items
            .iter()
            .filter(|i| i.component_type_id == component_type_id)
            .count() as u32
    }

    /// Whether a label is currently in the membership set.
    pub fn contains(&self, label_id: LabelId) -> bool {
        self.items.iter().any(|i| i.label_id == label_id)
    }
}
