//! Crate-level tests for the match engine.
//!
//! - `determinism.rs`: same seed or draw sequence gives the same match
//! - `integration.rs`: full matches through the scheduler and virtual clock
//! - `helpers.rs`: player/team factories shared with the unit tests

pub mod helpers;
mod integration;

pub use helpers::*;
