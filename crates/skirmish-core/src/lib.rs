//! # Skirmish Core
//!
//! Authoritative simulation of a small multiplayer arena shooter.
//!
//! Up to five players fly ships around a wrap-around arena, shoot at each
//! other, dodge and break asteroids and pick up power-ups during timed
//! rounds. This crate owns every rule; a transport layer feeds it player
//! intents and ships the resulting snapshots to clients.
//!
//! ## Architecture
//!
//! - **Actors**: ships, asteroids, bullets, missiles, bombs, drones and
//!   power-ups, stored in a deterministic [`Registry`](registry::Registry)
//! - **Spawners**: power-up slots and asteroid timers, plus asteroid
//!   splitting
//! - **Resolvers**: per-kind collision rules run in a fixed order
//! - **World**: the tick driver that ties movement, timers, spawning and
//!   resolution together
//!
//! ## Usage
//!
//! ```rust
//! use skirmish_core::{GameConfig, InputFlags, World};
//!
//! let mut world = World::new(GameConfig::default(), 1).unwrap();
//! let player = world.join("ann").unwrap();
//! world.set_input(player, InputFlags::FORWARD);
//! world.tick(0);
//! world.tick(50);
//!
//! let snapshot = world.snapshot();
//! assert_eq!(snapshot.round_id, 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod actor;
pub mod collision;
pub mod config;
pub mod context;
pub mod error;
pub mod geometry;
pub mod hooks;
pub mod movement;
pub mod registry;
pub mod resolver;
pub mod roster;
pub mod round;
pub mod schedule;
pub mod snapshot;
pub mod spawner;
pub mod world;

#[cfg(test)]
mod tests;

pub use actor::{ActorId, ActorTag, PowerUpKind};
pub use config::GameConfig;
pub use error::{ConfigError, JoinError};
pub use hooks::{ClientHooks, NoopHooks, Weapon};
pub use movement::InputFlags;
pub use roster::PlayerId;
pub use schedule::Millis;
pub use snapshot::{ServerMessage, WorldSnapshot};
pub use world::World;
