//! # Kit Catalog
//!
//! Store-backed catalog of kit definitions and the requirement
//! resolver. Resolution is read-only and deterministic: requirements
//! come back in stored order, every call, until kit metadata is
//! explicitly edited.

use packhouse_core::{Classified, ComponentTypeId, ErrorClass, KitId, Store};
use packhouse_label::CodePrefix;
use thiserror::Error;

use crate::kit::{DuplicateRequirement, KitDefinition, KitRequirement};

/// Errors from catalog operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KitError {
    /// No kit exists with the given id.
    #[error("no kit with id {kit_id}")]
    KitNotFound {
        /// The unknown kit id.
        kit_id: KitId,
    },

    /// A kit with the same name already exists.
    #[error("a kit named {name:?} already exists")]
    DuplicateName {
        /// The duplicated name.
        name: String,
    },

    /// A second requirement row for one component type was rejected.
    #[error(transparent)]
    DuplicateRequirement(#[from] DuplicateRequirement),
}

impl Classified for KitError {
    fn class(&self) -> ErrorClass {
        match self {
            Self::KitNotFound { .. } => ErrorClass::NotFound,
            Self::DuplicateName { .. } | Self::DuplicateRequirement(_) => ErrorClass::IllegalState,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::KitNotFound { .. } => "KIT_NOT_FOUND",
            Self::DuplicateName { .. } => "DUPLICATE_KIT_NAME",
            Self::DuplicateRequirement(_) => "DUPLICATE_REQUIREMENT",
        }
    }
}

/// The kit catalog service.
#[derive(Debug, Clone, Default)]
pub struct KitCatalog {
    kits: Store<KitId, KitDefinition>,
}

impl KitCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a new kit with no requirements yet.
    pub fn define(
        &self,
        name: impl Into<String>,
        description: Option<String>,
    ) -> Result<KitDefinition, KitError> {
        let name = name.into();
        if self.kits.list().iter().any(|k| k.name == name) {
            return Err(KitError::DuplicateName { name });
        }
        let kit = KitDefinition::new(name, description);
        self.kits.insert(kit.id, kit.clone());
        tracing::debug!(kit = %kit.id, name = %kit.name, "kit defined");
        Ok(kit)
    }

    /// Append a requirement to an existing kit.
    pub fn add_requirement(
        &self,
        kit_id: KitId,
        requirement: KitRequirement,
    ) -> Result<KitDefinition, KitError> {
        match self
            .kits
            .try_update(&kit_id, |kit| kit.add_requirement(requirement).map(|()| kit.clone()))
        {
            None => Err(KitError::KitNotFound { kit_id }),
            Some(Err(dup)) => Err(dup.into()),
            Some(Ok(kit)) => Ok(kit),
        }
    }

    /// Fetch a kit definition.
    pub fn get(&self, kit_id: KitId) -> Result<KitDefinition, KitError> {
        self.kits
            .get(&kit_id)
            .ok_or(KitError::KitNotFound { kit_id })
    }

    /// Resolve the ordered requirement list for a kit.
    ///
    /// Side-effect free; callers read it repeatedly during one packing
    /// session to diff against live membership counts.
    pub fn requirements_for(&self, kit_id: KitId) -> Result<Vec<KitRequirement>, KitError> {
        Ok(self.get(kit_id)?.requirements)
    }

    /// The label-prefix hint for one component type within a kit.
    pub fn prefix_for(
        &self,
        kit_id: KitId,
        component_type_id: ComponentTypeId,
    ) -> Result<Option<CodePrefix>, KitError> {
        Ok(self
            .get(kit_id)?
            .requirement_for(component_type_id)
            .and_then(|r| r.label_prefix.clone()))
    }

    /// All kit definitions (unordered).
    pub fn list(&self) -> Vec<KitDefinition> {
        self.kits.list()
    }

    /// Restore a kit definition from the persistent store. Startup
    /// hydration only.
    pub fn restore(&self, kit: KitDefinition) {
        self.kits.insert(kit.id, kit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn requirement(quantity: u32, prefix: Option<&str>) -> KitRequirement {
        KitRequirement {
            component_type_id: ComponentTypeId::new(),
            required_quantity: quantity,
            label_prefix: prefix.map(|p| CodePrefix::new(p).unwrap()),
        }
    }

    #[test]
    fn define_and_resolve() {
        let catalog = KitCatalog::new();
        let kit = catalog.define("Power Kit", None).unwrap();
        let a = requirement(2, Some("PWR"));
        let b = requirement(1, None);
        catalog.add_requirement(kit.id, a.clone()).unwrap();
        catalog.add_requirement(kit.id, b.clone()).unwrap();

        let resolved = catalog.requirements_for(kit.id).unwrap();
        assert_eq!(resolved, vec![a, b]);
    }

    #[test]
    fn resolution_is_stable_across_calls() {
        let catalog = KitCatalog::new();
        let kit = catalog.define("Power Kit", None).unwrap();
        for quantity in 1..=4 {
            catalog.add_requirement(kit.id, requirement(quantity, None)).unwrap();
        }
        let first = catalog.requirements_for(kit.id).unwrap();
        let second = catalog.requirements_for(kit.id).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn unknown_kit_is_not_found() {
        let catalog = KitCatalog::new();
        let err = catalog.requirements_for(KitId::new()).unwrap_err();
        assert_eq!(err.code(), "KIT_NOT_FOUND");
        assert_eq!(err.class(), ErrorClass::NotFound);
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let catalog = KitCatalog::new();
        catalog.define("Power Kit", None).unwrap();
        let err = catalog.define("Power Kit", None).unwrap_err();
        assert!(matches!(err, KitError::DuplicateName { .. }));
    }

    #[test]
    fn duplicate_requirement_is_rejected_via_catalog() {
        let catalog = KitCatalog::new();
        let kit = catalog.define("Power Kit", None).unwrap();
        let req = requirement(2, None);
        catalog.add_requirement(kit.id, req.clone()).unwrap();
        let err = catalog.add_requirement(kit.id, req).unwrap_err();
        assert_eq!(err.code(), "DUPLICATE_REQUIREMENT");
    }

    #[test]
    fn prefix_hint_lookup() {
        let catalog = KitCatalog::new();
        let kit = catalog.define("Power Kit", None).unwrap();
        let req = requirement(2, Some("PWR"));
        catalog.add_requirement(kit.id, req.clone()).unwrap();

        let prefix = catalog.prefix_for(kit.id, req.component_type_id).unwrap();
        assert_eq!(prefix.unwrap().as_str(), "PWR");
        assert_eq!(catalog.prefix_for(kit.id, ComponentTypeId::new()).unwrap(), None);
    }
}
