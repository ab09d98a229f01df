//! Actor spawning.
//!
//! - [`powerup`]: per-kind power-up pacing under a global budget
//! - [`asteroid`]: asteroid population, big asteroids and splitting
//! - [`placement`]: rejection-sampled spawn positions

pub mod asteroid;
pub mod placement;
pub mod powerup;

pub use asteroid::{AsteroidSpawner, SplitSeed};
pub use powerup::{PowerUpSlot, PowerUpSpawner};
