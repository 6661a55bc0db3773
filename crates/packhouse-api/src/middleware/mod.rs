//! # Tower middleware for the Packhouse API.

pub mod metrics;
