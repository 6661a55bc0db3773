//! # packhouse-core — Foundational Types for Packhouse
//!
//! The bedrock of the Packhouse workspace. Every other crate depends on
//! `packhouse-core`; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain identifiers.** `LabelId`, `KitId`,
//!    `ComponentTypeId`, `SessionId`, `ActorId` — you cannot pass a kit
//!    identifier where a label identifier is expected.
//!
//! 2. **UTC-only timestamps.** The `Timestamp` type enforces UTC with
//!    seconds precision; local offsets are converted at the boundary.
//!
//! 3. **Classified errors.** Every domain error maps onto one of four
//!    [`ErrorClass`]es (not-found, illegal-state, policy-violation,
//!    contention), so callers branch on kind rather than message text.
//!
//! 4. **Per-entity mutual exclusion.** [`EntityLocks`] hands out timed
//!    guards keyed by entity id — unrelated labels and unrelated boxes
//!    never contend on a shared lock.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `packhouse-*` crates (leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod identity;
pub mod locks;
pub mod store;
pub mod temporal;

pub use error::{Classified, ErrorClass};
pub use identity::{ActorId, ComponentTypeId, KitId, LabelId, SessionId};
pub use locks::{EntityGuard, EntityLocks, LockContention};
pub use store::Store;
pub use temporal::Timestamp;
