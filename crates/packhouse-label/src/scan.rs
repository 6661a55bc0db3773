//! # Scan Operations
//!
//! `collect` and `uncollect` — the station-facing scan surface. Both
//! delegate the actual status write to [`LabelRegistry::transition`],
//! which re-validates the edge under the label's guard; this module
//! translates current-state observations into the scan error kinds
//! callers branch on (a re-scan of a collected code is a caller error,
//! not a no-op).

use std::sync::Arc;

use packhouse_core::{ActorId, Classified, ErrorClass};
use thiserror::Error;

use crate::code::LabelCode;
use crate::label::Label;
use crate::registry::{LabelError, LabelRegistry, Transition};
use crate::status::LabelStatus;

/// Errors from the scan surface.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// No label exists with the given code.
    #[error("no label with code {code}")]
    InvalidCode {
        /// The unknown code.
        code: String,
    },

    /// The label is void and cannot be scanned.
    #[error("label {code} is void")]
    VoidItem {
        /// The label's code.
        code: String,
    },

    /// The label was already collected (or packed); double scans are
    /// rejected, not absorbed.
    #[error("label {code} has already been collected (status {status})")]
    AlreadyCollected {
        /// The label's code.
        code: String,
        /// The status that blocked the scan.
        status: LabelStatus,
    },

    /// The label sits inside a box; remove it from the box first.
    #[error("label {code} is packed into a box and cannot be uncollected")]
    CannotUncollectPacked {
        /// The label's code.
        code: String,
    },

    /// Any other registry rejection (illegal edge, contention).
    #[error(transparent)]
    Registry(#[from] LabelError),
}

impl Classified for ScanError {
    fn class(&self) -> ErrorClass {
        match self {
            Self::InvalidCode { .. } => ErrorClass::NotFound,
            Self::VoidItem { .. }
            | Self::AlreadyCollected { .. }
            | Self::CannotUncollectPacked { .. } => ErrorClass::IllegalState,
            Self::Registry(e) => e.class(),
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::InvalidCode { .. } => "INVALID_CODE",
            Self::VoidItem { .. } => "VOID_ITEM",
            Self::AlreadyCollected { .. } => "ALREADY_COLLECTED",
            Self::CannotUncollectPacked { .. } => "CANNOT_UNCOLLECT_PACKED",
            Self::Registry(e) => e.code(),
        }
    }
}

/// The scan validator service.
#[derive(Debug, Clone)]
pub struct ScanValidator {
    registry: Arc<LabelRegistry>,
}

impl ScanValidator {
    /// Create a validator over the shared registry.
    pub fn new(registry: Arc<LabelRegistry>) -> Self {
        Self { registry }
    }

    /// Collect a label: `Created -> Collected`.
    ///
    /// Rejects unknown codes, void labels, and — explicitly — labels
    /// that are already `Collected` or `Packed`.
    pub fn collect(&self, code: &LabelCode, actor: Option<ActorId>) -> Result<Label, ScanError> {
        let label = self.lookup(code)?;
        match label.status {
            LabelStatus::Void => Err(ScanError::VoidItem {
                code: code.to_string(),
            }),
            LabelStatus::Collected | LabelStatus::Packed => Err(ScanError::AlreadyCollected {
                code: code.to_string(),
                status: label.status,
            }),
            LabelStatus::Created => self
                .registry
                .transition(label.id, Transition::to(LabelStatus::Collected, actor))
                .map_err(|e| Self::remap_collect(code, e)),
        }
    }

    /// Uncollect a label: `Collected -> Created`.
    ///
    /// Fails unless the current status is exactly `Collected`; a set
    /// `parent_label` is rejected before the transition is attempted
    /// (it should be impossible for a collected label, by invariant).
    pub fn uncollect(&self, code: &LabelCode, actor: Option<ActorId>) -> Result<Label, ScanError> {
        let label = self.lookup(code)?;
        if label.status == LabelStatus::Packed || label.parent_label.is_some() {
            return Err(ScanError::CannotUncollectPacked {
                code: code.to_string(),
            });
        }
        if label.status == LabelStatus::Void {
            return Err(ScanError::VoidItem {
                code: code.to_string(),
            });
        }
        self.registry
            .transition(label.id, Transition::to(LabelStatus::Created, actor))
            .map_err(|e| Self::remap_uncollect(code, e))
    }

    /// Read-only lookup for station preview; never mutates, never logs.
    pub fn preview(&self, code: &LabelCode) -> Result<Label, ScanError> {
        let label = self.lookup(code)?;
        if label.status == LabelStatus::Void {
            return Err(ScanError::VoidItem {
                code: code.to_string(),
            });
        }
        Ok(label)
    }

    fn lookup(&self, code: &LabelCode) -> Result<Label, ScanError> {
        self.registry.find(code).map_err(|_| ScanError::InvalidCode {
            code: code.to_string(),
        })
    }

    /// A registry rejection after our precondition read means a
    /// concurrent operation won the race; translate by what the state
    /// became so the caller still sees the right kind.
    fn remap_collect(code: &LabelCode, err: LabelError) -> ScanError {
        match err {
            LabelError::VoidItem { .. } => ScanError::VoidItem {
                code: code.to_string(),
            },
            LabelError::IllegalTransition {
                from: LabelStatus::Collected | LabelStatus::Packed,
                ..
            } => ScanError::AlreadyCollected {
                code: code.to_string(),
                status: LabelStatus::Collected,
            },
            other => ScanError::Registry(other),
        }
    }

    fn remap_uncollect(code: &LabelCode, err: LabelError) -> ScanError {
        match err {
            LabelError::VoidItem { .. } => ScanError::VoidItem {
                code: code.to_string(),
            },
            LabelError::IllegalTransition {
                from: LabelStatus::Packed,
                ..
            } => ScanError::CannotUncollectPacked {
                code: code.to_string(),
            },
            other => ScanError::Registry(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::CodePrefix;
    use crate::status::ObjectType;
    use uuid::Uuid;

    fn setup() -> (Arc<LabelRegistry>, ScanValidator) {
        let registry = Arc::new(LabelRegistry::new());
        let validator = ScanValidator::new(Arc::clone(&registry));
        (registry, validator)
    }

    fn issue(registry: &LabelRegistry) -> Label {
        registry.issue(
            ObjectType::Component,
            Uuid::new_v4(),
            1,
            &CodePrefix::new("SNS").unwrap(),
            None,
        )
    }

    #[test]
    fn collect_succeeds_only_from_created() {
        let (registry, validator) = setup();
        let label = issue(&registry);

        let collected = validator.collect(&label.code, Some(ActorId(4))).unwrap();
        assert_eq!(collected.status, LabelStatus::Collected);
        assert_eq!(collected.last_collected_by, Some(ActorId(4)));
    }

    #[test]
    fn double_collect_is_rejected() {
        let (registry, validator) = setup();
        let label = issue(&registry);
        validator.collect(&label.code, None).unwrap();

        let err = validator.collect(&label.code, None).unwrap_err();
        assert!(matches!(
            err,
            ScanError::AlreadyCollected { status: LabelStatus::Collected, .. }
        ));
        assert_eq!(err.code(), "ALREADY_COLLECTED");
    }

    #[test]
    fn collect_of_packed_label_is_rejected() {
        let (registry, validator) = setup();
        let label = issue(&registry);
        validator.collect(&label.code, None).unwrap();
        registry
            .transition(
                label.id,
                Transition {
                    to: LabelStatus::Packed,
                    parent: Some(packhouse_core::LabelId::new()),
                    actor: None,
                    note: None,
                },
            )
            .unwrap();

        let err = validator.collect(&label.code, None).unwrap_err();
        assert!(matches!(
            err,
            ScanError::AlreadyCollected { status: LabelStatus::Packed, .. }
        ));
    }

    #[test]
    fn unknown_code_is_invalid() {
        let (_registry, validator) = setup();
        let code = LabelCode::new("GHOST0000001").unwrap();
        let err = validator.collect(&code, None).unwrap_err();
        assert_eq!(err.code(), "INVALID_CODE");
        assert_eq!(err.class(), ErrorClass::NotFound);
    }

    #[test]
    fn void_label_is_rejected() {
        let (registry, validator) = setup();
        let mut label = issue(&registry);
        label.status = LabelStatus::Void;
        registry.restore(label.clone());

        let err = validator.collect(&label.code, None).unwrap_err();
        assert_eq!(err.code(), "VOID_ITEM");
    }

    #[test]
    fn uncollect_restores_created() {
        let (registry, validator) = setup();
        let label = issue(&registry);
        validator.collect(&label.code, None).unwrap();

        let restored = validator.uncollect(&label.code, None).unwrap();
        assert_eq!(restored.status, LabelStatus::Created);
        assert_eq!(restored.parent_label, None);
        // Collectable again after uncollect.
        assert!(validator.collect(&label.code, None).is_ok());
    }

    #[test]
    fn uncollect_of_created_label_fails() {
        let (registry, validator) = setup();
        let label = issue(&registry);
        let err = validator.uncollect(&label.code, None).unwrap_err();
        assert!(matches!(err, ScanError::Registry(LabelError::IllegalTransition { .. })));
    }

    #[test]
    fn uncollect_of_packed_label_fails() {
        let (registry, validator) = setup();
        let label = issue(&registry);
        validator.collect(&label.code, None).unwrap();
        registry
            .transition(
                label.id,
                Transition {
                    to: LabelStatus::Packed,
                    parent: Some(packhouse_core::LabelId::new()),
                    actor: None,
                    note: None,
                },
            )
            .unwrap();

        let err = validator.uncollect(&label.code, None).unwrap_err();
        assert_eq!(err.code(), "CANNOT_UNCOLLECT_PACKED");
    }

    #[test]
    fn failed_scans_append_no_events() {
        let (registry, validator) = setup();
        let label = issue(&registry);
        validator.collect(&label.code, None).unwrap();
        let before = registry.history(label.id).len();

        let _ = validator.collect(&label.code, None).unwrap_err();
        let _ = validator.uncollect(&LabelCode::new("GHOST1").unwrap(), None).unwrap_err();
        assert_eq!(registry.history(label.id).len(), before);
    }

    #[test]
    fn preview_reads_without_logging() {
        let (registry, validator) = setup();
        let label = issue(&registry);
        let before = registry.history(label.id).len();

        let seen = validator.preview(&label.code).unwrap();
        assert_eq!(seen.status, LabelStatus::Created);
        assert_eq!(registry.history(label.id).len(), before);
    }
}
