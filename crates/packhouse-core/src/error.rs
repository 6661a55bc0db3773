//! # Error Taxonomy
//!
//! Every domain error in Packhouse maps onto one of four classes. The
//! HTTP layer uses the class to pick a status code; callers use it to
//! decide whether an operation is retryable. Domain crates keep their
//! own `thiserror` enums and implement [`Classified`] to declare the
//! class and a stable machine-readable code per variant.

use serde::{Deserialize, Serialize};

/// The four error classes of the Packhouse operation surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorClass {
    /// The referenced entity does not exist (code, kit, box, item).
    NotFound,
    /// The entity exists but its current state forbids the operation.
    IllegalState,
    /// The operation is well-formed but violates a packing policy
    /// (wrong component for the kit, quantity exceeded, shortfall).
    PolicyViolation,
    /// A per-entity lock could not be acquired in time. Retryable.
    Contention,
}

impl ErrorClass {
    /// The string representation of this class.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::IllegalState => "ILLEGAL_STATE",
            Self::PolicyViolation => "POLICY_VIOLATION",
            Self::Contention => "CONTENTION",
        }
    }

    /// Whether callers should retry the operation unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Contention)
    }
}

impl std::fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trait implemented by every domain error type.
///
/// `class` drives HTTP status mapping and retry decisions; `code` is the
/// stable SCREAMING_SNAKE identifier callers branch on (never the
/// human-readable message).
pub trait Classified {
    /// The error class of this error.
    fn class(&self) -> ErrorClass;

    /// Stable machine-readable code for this error.
    fn code(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_contention_is_retryable() {
        assert!(ErrorClass::Contention.is_retryable());
        assert!(!ErrorClass::NotFound.is_retryable());
        assert!(!ErrorClass::IllegalState.is_retryable());
        assert!(!ErrorClass::PolicyViolation.is_retryable());
    }

    #[test]
    fn display_is_screaming_snake() {
        assert_eq!(ErrorClass::PolicyViolation.to_string(), "POLICY_VIOLATION");
    }
}
