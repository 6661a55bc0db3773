//! # Label Status State Machine
//!
//! The legality table for label status transitions, the object-type
//! discriminator, and the audit actions recorded for each edge.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An unrecognized enum value, typically read back from the store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unrecognized {kind} value {value:?}")]
pub struct ParseEnumError {
    /// Which enum rejected the value.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

/// What a label is affixed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObjectType {
    /// A single component unit (or packet of units).
    Component,
    /// A box assembled from component units against a kit definition.
    Box,
}

impl ObjectType {
    /// The string representation of this object type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Component => "COMPONENT",
            Self::Box => "BOX",
        }
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ObjectType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "COMPONENT" => Ok(Self::Component),
            "BOX" => Ok(Self::Box),
            other => Err(ParseEnumError {
                kind: "object type",
                value: other.to_string(),
            }),
        }
    }
}

/// The lifecycle status of a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LabelStatus {
    /// Issued but not yet gathered.
    Created,
    /// Scanned and ready for packing.
    Collected,
    /// Sealed into (or, for a box label, sealed as) a box.
    Packed,
    /// Administratively voided. Terminal.
    Void,
}

impl LabelStatus {
    /// The string representation of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::Collected => "COLLECTED",
            Self::Packed => "PACKED",
            Self::Void => "VOID",
        }
    }

    /// Whether this status permits no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Void)
    }
}

impl std::fmt::Display for LabelStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LabelStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREATED" => Ok(Self::Created),
            "COLLECTED" => Ok(Self::Collected),
            "PACKED" => Ok(Self::Packed),
            "VOID" => Ok(Self::Void),
            other => Err(ParseEnumError {
                kind: "label status",
                value: other.to_string(),
            }),
        }
    }
}

/// Whether `from -> to` is a legal edge for a label of `object_type`.
///
/// Component labels walk `Created -> Collected -> Packed` with both
/// inverses. Box labels additionally seal straight from `Created` when
/// their session completes — a box is never collected on the way.
/// Administrative voiding is not an edge here; a `Void` target is
/// rejected along with everything else not in the table.
pub fn can_transition(object_type: ObjectType, from: LabelStatus, to: LabelStatus) -> bool {
    use LabelStatus::*;
    match (from, to) {
        (Created, Collected) | (Collected, Created) | (Collected, Packed) | (Packed, Collected) => {
            true
        }
        (Created, Packed) => object_type == ObjectType::Box,
        _ => false,
    }
}

/// Audit actions recorded in the scan-event history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScanAction {
    /// Label was issued with a fresh code.
    Issued,
    /// Label was collected by a scan.
    Collected,
    /// A collect was reverted; label returned to `Created`.
    Uncollected,
    /// Label was packed into a box (or a box label was sealed).
    Packed,
    /// A packed item was taken back out of its box.
    Unpacked,
    /// A label image was rendered/downloaded for this label.
    Rendered,
}

impl ScanAction {
    /// The string representation of this action.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Issued => "ISSUED",
            Self::Collected => "COLLECTED",
            Self::Uncollected => "UNCOLLECTED",
            Self::Packed => "PACKED",
            Self::Unpacked => "UNPACKED",
            Self::Rendered => "RENDERED",
        }
    }

    /// The audit action recorded for a legal `from -> to` edge.
    pub fn for_edge(from: LabelStatus, to: LabelStatus) -> Option<ScanAction> {
        use LabelStatus::*;
        match (from, to) {
            (Created, Collected) => Some(Self::Collected),
            (Collected, Created) => Some(Self::Uncollected),
            (Collected | Created, Packed) => Some(Self::Packed),
            (Packed, Collected) => Some(Self::Unpacked),
            _ => None,
        }
    }
}

impl std::fmt::Display for ScanAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ScanAction {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ISSUED" => Ok(Self::Issued),
            "COLLECTED" => Ok(Self::Collected),
            "UNCOLLECTED" => Ok(Self::Uncollected),
            "PACKED" => Ok(Self::Packed),
            "UNPACKED" => Ok(Self::Unpacked),
            "RENDERED" => Ok(Self::Rendered),
            other => Err(ParseEnumError {
                kind: "scan action",
                value: other.to_string(),
            }),
        }
    }
}
