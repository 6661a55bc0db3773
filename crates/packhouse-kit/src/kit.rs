//! # Kit Definition
//!
//! The bill-of-materials record: an ordered set of component-type
//! requirements with exact quantities and optional label-prefix hints.

use packhouse_core::{ComponentTypeId, KitId, Timestamp};
use packhouse_label::CodePrefix;
use serde::{Deserialize, Serialize};

/// One required component type within a kit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KitRequirement {
    /// The required component type.
    pub component_type_id: ComponentTypeId,
    /// Exact quantity of that type one box must contain.
    pub required_quantity: u32,
    /// Prefix hint for issuing labels of this component for this kit.
    pub label_prefix: Option<CodePrefix>,
}

/// A kit definition.
///
/// Requirements keep insertion order; at most one requirement exists
/// per component type (enforced by [`KitDefinition::add_requirement`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KitDefinition {
    /// Unique kit identifier.
    pub id: KitId,
    /// Human-readable kit name (unique across the catalog).
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Ordered component requirements.
    pub requirements: Vec<KitRequirement>,
    /// When the definition was created.
    pub created_at: Timestamp,
}

impl KitDefinition {
    /// Create an empty kit definition.
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            id: KitId::new(),
            name: name.into(),
            description,
            requirements: Vec::new(),
            created_at: Timestamp::now(),
        }
    }

    /// Append a requirement, rejecting a second row for the same
    /// component type.
    pub fn add_requirement(&mut self, requirement: KitRequirement) -> Result<(), DuplicateRequirement> {
        if self
            .requirements
            .iter()
            .any(|r| r.component_type_id == requirement.component_type_id)
        {
            return Err(DuplicateRequirement {
                kit: self.name.clone(),
                component_type_id: requirement.component_type_id,
            });
        }
        self.requirements.push(requirement);
        Ok(())
    }

    /// The requirement for a component type, if the kit contains one.
    pub fn requirement_for(&self, component_type_id: ComponentTypeId) -> Option<&KitRequirement> {
        self.requirements
            .iter()
            .find(|r| r.component_type_id == component_type_id)
    }

    /// Total units a complete box of this kit contains.
    pub fn total_required(&self) -> u32 {
        self.requirements.iter().map(|r| r.required_quantity).sum()
    }
}

/// A second requirement row for the same component type was rejected.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("kit {kit} already requires component type {component_type_id}")]
pub struct DuplicateRequirement {
    /// The kit name.
    pub kit: String,
    /// The duplicated component type.
    pub component_type_id: ComponentTypeId,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn requirement(quantity: u32) -> KitRequirement {
        KitRequirement {
            component_type_id: ComponentTypeId::new(),
            required_quantity: quantity,
            label_prefix: None,
        }
    }

    #[test]
    fn requirements_keep_insertion_order() {
        let mut kit = KitDefinition::new("Power Kit", None);
        let first = requirement(2);
        let second = requirement(1);
        kit.add_requirement(first.clone()).unwrap();
        kit.add_requirement(second.clone()).unwrap();

        assert_eq!(kit.requirements, vec![first, second]);
        assert_eq!(kit.total_required(), 3);
    }

    #[test]
    fn duplicate_component_type_is_rejected() {
        let mut kit = KitDefinition::new("Power Kit", None);
        let req = requirement(2);
        kit.add_requirement(req.clone()).unwrap();

        let dup = KitRequirement {
            required_quantity: 5,
            ..req.clone()
        };
        let err = kit.add_requirement(dup).unwrap_err();
        assert_eq!(err.component_type_id, req.component_type_id);
        assert_eq!(kit.requirements.len(), 1);
    }

    #[test]
    fn requirement_lookup_by_component_type() {
        let mut kit = KitDefinition::new("Power Kit", None);
        let req = requirement(4);
        kit.add_requirement(req.clone()).unwrap();

        assert_eq!(kit.requirement_for(req.component_type_id), Some(&req));
        assert_eq!(kit.requirement_for(ComponentTypeId::new()), None);
    }
}
