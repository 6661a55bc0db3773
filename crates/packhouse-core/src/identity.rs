//! # Domain Identity Newtypes
//!
//! Newtype wrappers for all identifiers in Packhouse. These prevent
//! accidental identifier confusion — you cannot pass a `KitId` where a
//! `LabelId` is expected, even though both wrap a UUID.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a label record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LabelId(pub Uuid);

/// Unique identifier for a kit definition (bill-of-materials).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KitId(pub Uuid);

/// Unique identifier for a component type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentTypeId(pub Uuid);

/// Unique identifier for a packing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

/// Externally-resolved actor identifier.
///
/// Passed into every mutating call; Packhouse records it in the audit
/// trail but does not authenticate it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(pub i64);

macro_rules! uuid_id {
    ($name:ident, $prefix:literal) => {
        impl $name {
            /// Generate a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Access the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($prefix, ":{}"), self.0)
            }
        }
    };
}

uuid_id!(LabelId, "label");
uuid_id!(KitId, "kit");
uuid_id!(ComponentTypeId, "component-type");
uuid_id!(SessionId, "session");

impl ActorId {
    /// Access the inner integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "actor:{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_types() {
        // Compile-time property; runtime just checks fresh ids differ.
        assert_ne!(LabelId::new(), LabelId::new());
        assert_ne!(KitId::new().0, SessionId::new().0);
    }

    #[test]
    fn display_carries_namespace() {
        let id = LabelId::new();
        assert!(id.to_string().starts_with("label:"));
        assert_eq!(ActorId(7).to_string(), "actor:7");
    }

    #[test]
    fn serde_roundtrip() {
        let id = ComponentTypeId::new();
        let json = serde_json::to_string(&id).unwrap();
        let parsed: ComponentTypeId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }
}
