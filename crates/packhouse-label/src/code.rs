//! # Code Numbering Scheme
//!
//! Label codes are `PREFIX` + a 7-digit zero-padded counter, monotonic
//! per prefix (`PWR0000001`, `PWR0000002`, ...). Prefixes are 2–10
//! uppercase alphanumerics; box prefixes are derived from the kit name
//! (first three alphanumerics + `BOX`).

use std::collections::HashMap;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Width of the numeric part of a generated code.
pub const CODE_PAD_WIDTH: usize = 7;

/// Prefix length bounds.
pub const PREFIX_MIN: usize = 2;
pub const PREFIX_MAX: usize = 10;

/// Error constructing a code or prefix.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodeError {
    /// Prefix is empty, too long, or contains non-alphanumerics.
    #[error("invalid code prefix {prefix:?}: must be {PREFIX_MIN}-{PREFIX_MAX} alphanumeric characters")]
    InvalidPrefix {
        /// The rejected input.
        prefix: String,
    },

    /// Code value is empty or contains whitespace.
    #[error("invalid label code {code:?}")]
    InvalidCode {
        /// The rejected input.
        code: String,
    },
}

/// A validated code prefix (2–10 characters, normalized to uppercase).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CodePrefix(String);

impl CodePrefix {
    /// Create a validated prefix, trimming and uppercasing the input.
    pub fn new(s: impl Into<String>) -> Result<Self, CodeError> {
        let normalized = s.into().trim().to_uppercase();
        let ok = (PREFIX_MIN..=PREFIX_MAX).contains(&normalized.len())
            && normalized.chars().all(|c| c.is_ascii_alphanumeric());
        if ok {
            Ok(Self(normalized))
        } else {
            Err(CodeError::InvalidPrefix { prefix: normalized })
        }
    }

    /// Derive the box-label prefix for a kit: the first three
    /// alphanumeric characters of the kit name, uppercased, plus `BOX`.
    pub fn for_box(kit_name: &str) -> Self {
        let head: String = kit_name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .take(3)
            .collect::<String>()
            .to_uppercase();
        // head may be empty for exotic names; "BOX" alone is still a valid prefix.
        Self(format!("{head}BOX"))
    }

    /// The prefix as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CodePrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A unique, immutable label code value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelCode(String);

impl LabelCode {
    /// Create a validated code, trimming and uppercasing the input.
    ///
    /// Codes are barcode values: printable ASCII, no whitespace.
    pub fn new(s: impl Into<String>) -> Result<Self, CodeError> {
        let normalized = s.into().trim().to_uppercase();
        if normalized.is_empty()
            || !normalized.chars().all(|c| c.is_ascii_graphic())
        {
            return Err(CodeError::InvalidCode { code: normalized });
        }
        Ok(Self(normalized))
    }

    /// The code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split into `(prefix, sequence number)` when the code follows the
    /// numbering scheme: a leading alphanumeric prefix ending before the
    /// trailing digit run.
    fn split_sequence(&self) -> Option<(&str, u64)> {
        let digits_at = self.0.rfind(|c: char| !c.is_ascii_digit())? + 1;
        if digits_at >= self.0.len() {
            return None;
        }
        let number: u64 = self.0[digits_at..].parse().ok()?;
        Some((&self.0[..digits_at], number))
    }
}

impl std::fmt::Display for LabelCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-prefix monotonic counters backing code generation.
///
/// Counters are seeded from existing codes on startup (the highest
/// sequence number seen per prefix) so restarts continue the sequence
/// instead of colliding with issued codes.
#[derive(Debug, Default)]
pub struct CodeSequence {
    counters: Mutex<HashMap<String, u64>>,
}

impl CodeSequence {
    /// Create an empty sequence (all prefixes start at 1).
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next code for `prefix`.
    pub fn next(&self, prefix: &CodePrefix) -> LabelCode {
        let mut counters = self.counters.lock();
        let counter = counters.entry(prefix.as_str().to_string()).or_insert(0);
        *counter += 1;
        LabelCode(format!("{}{:0width$}", prefix, counter, width = CODE_PAD_WIDTH))
    }

    /// Fold an existing code into the counters, so generation continues
    /// past it. Codes that do not follow the scheme are ignored.
    pub fn observe(&self, code: &LabelCode) {
        if let Some((prefix, number)) = code.split_sequence() {
            let mut counters = self.counters.lock();
            let counter = counters.entry(prefix.to_string()).or_insert(0);
            *counter = (*counter).max(number);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_normalizes_and_validates() {
        assert_eq!(CodePrefix::new(" pwr ").unwrap().as_str(), "PWR");
        assert_eq!(CodePrefix::new("cp").unwrap().as_str(), "CP");
        assert!(CodePrefix::new("a").is_err());
        assert!(CodePrefix::new("TOOLONGPREFIX").is_err());
        assert!(CodePrefix::new("BAD-1").is_err());
    }

    #[test]
    fn box_prefix_from_kit_name() {
        assert_eq!(CodePrefix::for_box("Power Kit v2").as_str(), "POWBOX");
        assert_eq!(CodePrefix::for_box("IO Hub").as_str(), "IOHBOX");
        assert_eq!(CodePrefix::for_box("x").as_str(), "XBOX");
    }

    #[test]
    fn codes_are_monotonic_per_prefix() {
        let seq = CodeSequence::new();
        let pwr = CodePrefix::new("PWR").unwrap();
        let cbl = CodePrefix::new("CBL").unwrap();

        assert_eq!(seq.next(&pwr).as_str(), "PWR0000001");
        assert_eq!(seq.next(&pwr).as_str(), "PWR0000002");
        // Independent counter per prefix.
        assert_eq!(seq.next(&cbl).as_str(), "CBL0000001");
        assert_eq!(seq.next(&pwr).as_str(), "PWR0000003");
    }

    #[test]
    fn observe_continues_past_existing_codes() {
        let seq = CodeSequence::new();
        let pwr = CodePrefix::new("PWR").unwrap();
        seq.observe(&LabelCode::new("PWR0000041").unwrap());
        seq.observe(&LabelCode::new("PWR0000007").unwrap());
        assert_eq!(seq.next(&pwr).as_str(), "PWR0000042");
    }

    #[test]
    fn observe_ignores_schemeless_codes() {
        let seq = CodeSequence::new();
        seq.observe(&LabelCode::new("LEGACY-CODE").unwrap());
        let pwr = CodePrefix::new("PWR").unwrap();
        assert_eq!(seq.next(&pwr).as_str(), "PWR0000001");
    }

    #[test]
    fn code_rejects_empty_and_whitespace() {
        assert!(LabelCode::new("  ").is_err());
        assert!(LabelCode::new("A B").is_err());
        assert_eq!(LabelCode::new(" abc1 ").unwrap().as_str(), "ABC1");
    }
}
