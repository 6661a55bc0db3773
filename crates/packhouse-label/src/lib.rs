//! # packhouse-label — Label Lifecycle & Registry
//!
//! Owns everything about a label: its record, its status state machine,
//! the append-only scan-event history, the code numbering scheme, and
//! the registry that is the **single write path** for label status.
//!
//! ## States
//!
//! ```text
//! Created ──collect──▶ Collected ──pack──▶ Packed
//!    ▲                    │  ▲                │
//!    └────uncollect───────┘  └────unpack──────┘
//!
//! Void (terminal, administrative; never produced by scan operations)
//! ```
//!
//! ## Design Decision
//!
//! Status legality lives in one table ([`status::can_transition`]) and is
//! enforced in one place ([`registry::LabelRegistry::transition`]), which
//! also appends the audit event under the same per-label guard. Other
//! components request transitions; none of them write status directly.

pub mod code;
pub mod event;
pub mod label;
pub mod registry;
pub mod scan;
pub mod status;

pub use code::{CodeError, CodePrefix, CodeSequence, LabelCode};
pub use event::{EventLog, ScanEvent};
pub use label::Label;
pub use registry::{LabelError, LabelRegistry, Transition};
pub use scan::{ScanError, ScanValidator};
pub use status::{LabelStatus, ObjectType, ParseEnumError, ScanAction};
