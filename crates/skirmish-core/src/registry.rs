//! Actor registry.
//!
//! The registry owns every [`Actor`] in the arena. It provides:
//! - Storage with deterministic iteration order (`BTreeMap` keyed by a
//!   monotonically increasing [`ActorId`], so iteration is oldest first)
//! - Soft deletion: [`Registry::destroy`] only clears the liveness flag, the
//!   actor stays addressable until [`Registry::purge`] runs at the end of
//!   the tick
//! - Snapshots of the live ids of one kind, so a collision pass can destroy
//!   actors of the kind it is iterating without invalidating the loop
//!
//! # Example
//!
//! ```
//! use skirmish_core::actor::{ActorInner, ActorTag, Motion, PowerUpKind};
//! use skirmish_core::actor::components::PowerUpState;
//! use skirmish_core::registry::Registry;
//! use glam::Vec2;
//!
//! let mut registry = Registry::new();
//! let id = registry.spawn(
//!     Motion::at(Vec2::new(40.0, 40.0)),
//!     0,
//!     ActorInner::PowerUp(PowerUpState { kind: PowerUpKind::Life }),
//! );
//!
//! assert!(registry.destroy(id));
//! assert!(!registry.is_alive(id));
//! // Still addressable until the end of the tick.
//! assert!(registry.get(id).is_some());
//!
//! registry.purge();
//! assert!(registry.get(id).is_none());
//! assert_eq!(registry.count(ActorTag::PowerUp), 0);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::actor::{Actor, ActorId, ActorInner, ActorTag, AsteroidState, Motion, ShipState};
use crate::schedule::Millis;

/// Container for every actor in the arena.
///
/// # Determinism
///
/// Ids are assigned monotonically and storage is a `BTreeMap`, so every
/// iteration yields actors in creation order on every platform.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Registry {
    /// Monotonically increasing id counter.
    next_id: u64,
    /// Actor storage, live and destroyed-this-tick.
    actors: BTreeMap<ActorId, Actor>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: 0,
            actors: BTreeMap::new(),
        }
    }

    /// Adds a live actor and returns its id.
    ///
    /// # Arguments
    ///
    /// * `motion` - Initial position and velocity
    /// * `now` - Simulation time, recorded as the actor's spawn time
    /// * `inner` - Kind-specific state
    pub fn spawn(&mut self, motion: Motion, now: Millis, inner: ActorInner) -> ActorId {
        let id = ActorId::new(self.next_id);
        self.next_id += 1;
        trace!(%id, kind = %inner.tag(), "spawn");
        self.actors.insert(id, Actor::new(id, motion, now, inner));
        id
    }

    /// Marks an actor as destroyed.
    ///
    /// Returns `true` only for the call that actually flipped the flag, so
    /// callers can hang exactly-once side effects off the result. Unknown and
    /// already destroyed ids are a no-op.
    pub fn destroy(&mut self, id: ActorId) -> bool {
        self.actors.get_mut(&id).is_some_and(Actor::kill)
    }

    /// Whether `id` names a live actor.
    #[must_use]
    pub fn is_alive(&self, id: ActorId) -> bool {
        self.actors.get(&id).is_some_and(Actor::is_alive)
    }

    /// Any actor by id, live or destroyed this tick.
    #[must_use]
    pub fn get(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(&id)
    }

    /// Mutable access to any actor by id, live or destroyed this tick.
    #[must_use]
    pub fn get_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.get_mut(&id)
    }

    /// A live actor by id.
    #[must_use]
    pub fn live(&self, id: ActorId) -> Option<&Actor> {
        self.get(id).filter(|actor| actor.is_alive())
    }

    /// Mutable access to a live actor by id.
    #[must_use]
    pub fn live_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.get_mut(id).filter(|actor| actor.is_alive())
    }

    /// The state of a live ship.
    #[must_use]
    pub fn ship(&self, id: ActorId) -> Option<&ShipState> {
        self.live(id).and_then(Actor::as_ship)
    }

    /// Mutable state of a live ship.
    #[must_use]
    pub fn ship_mut(&mut self, id: ActorId) -> Option<&mut ShipState> {
        self.live_mut(id).and_then(Actor::as_ship_mut)
    }

    /// The state of a live asteroid.
    #[must_use]
    pub fn asteroid(&self, id: ActorId) -> Option<&AsteroidState> {
        self.live(id).and_then(Actor::as_asteroid)
    }

    /// Mutable state of a live asteroid.
    #[must_use]
    pub fn asteroid_mut(&mut self, id: ActorId) -> Option<&mut AsteroidState> {
        self.live_mut(id).and_then(Actor::as_asteroid_mut)
    }

    /// Snapshot of the live ids of one kind, oldest first.
    ///
    /// Collision passes iterate over this snapshot and re-check liveness per
    /// element, so destroying actors mid-pass is safe.
    #[must_use]
    pub fn ids(&self, tag: ActorTag) -> Vec<ActorId> {
        self.iter(tag).map(Actor::id).collect()
    }

    /// Live actors of one kind, oldest first.
    pub fn iter(&self, tag: ActorTag) -> impl Iterator<Item = &Actor> + '_ {
        self.actors
            .values()
            .filter(move |actor| actor.is_alive() && actor.tag() == tag)
    }

    /// Every stored actor, including those destroyed this tick.
    pub fn all(&self) -> impl Iterator<Item = &Actor> + '_ {
        self.actors.values()
    }

    /// Every live actor.
    pub fn live_actors(&self) -> impl Iterator<Item = &Actor> + '_ {
        self.actors.values().filter(|actor| actor.is_alive())
    }

    /// Number of live actors of one kind.
    #[must_use]
    pub fn count(&self, tag: ActorTag) -> usize {
        self.iter(tag).count()
    }

    /// Destroys every live actor that is not a ship. Returns how many were
    /// destroyed.
    pub fn destroy_all_but_ships(&mut self) -> usize {
        let mut destroyed = 0;
        for actor in self.actors.values_mut() {
            if actor.tag() != ActorTag::Ship && actor.kill() {
                destroyed += 1;
            }
        }
        destroyed
    }

    /// Removes destroyed actors. Returns how many were removed.
    pub fn purge(&mut self) -> usize {
        let before = self.actors.len();
        self.actors.retain(|_, actor| actor.is_alive());
        before - self.actors.len()
    }

    /// Number of stored actors, including those destroyed this tick.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actors.len()
    }

    /// Whether nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================
