//! # packhouse-kit — Kit Definitions & Requirement Resolution
//!
//! A kit is a bill-of-materials: the component types and exact
//! quantities one assembled box must contain. The resolver is read-only
//! and deterministic — the packing manager diffs its output against
//! live membership counts repeatedly during one session, so results
//! must be stable unless kit metadata is explicitly edited.
//!
//! Kit metadata management is an external concern; definitions arrive
//! through the persistent store and are hydrated into the catalog.

pub mod catalog;
pub mod kit;

pub use catalog::{KitCatalog, KitError};
pub use kit::{KitDefinition, KitRequirement};
