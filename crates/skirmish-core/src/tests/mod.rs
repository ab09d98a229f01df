//! Crate-level tests that drive the whole simulation.
//!
//! - `determinism.rs`: identical seeds and inputs give identical matches
//! - `integration.rs`: end-to-end scenarios through [`World`](crate::world::World)
//! - `helpers.rs`: context, world and actor setup shared with unit tests

pub mod helpers;
