//! Actor model for the arena.
//!
//! Every simulated object is an [`Actor`]: a registry id, a liveness flag, a
//! [`Motion`] and a closed [`ActorInner`] sum type holding the kind-specific
//! state. The interaction rules in [`crate::resolver`] dispatch on
//! [`ActorTag`] so every pairing is checked for exhaustiveness by the
//! compiler instead of by string comparison.
//!
//! # Example
//!
//! ```
//! use skirmish_core::actor::{Actor, ActorId, ActorInner, ActorTag, Motion, PowerUpKind};
//! use skirmish_core::actor::components::PowerUpState;
//!
//! let actor = Actor::new(
//!     ActorId::new(7),
//!     Motion::at(glam::Vec2::new(10.0, 20.0)),
//!     0,
//!     ActorInner::PowerUp(PowerUpState { kind: PowerUpKind::Shield }),
//! );
//!
//! assert_eq!(actor.tag(), ActorTag::PowerUp);
//! assert!(actor.is_alive());
//! ```

pub mod components;

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::schedule::Millis;

pub use components::{
    AsteroidState, BombState, DroneState, PowerUpState, ProjectileState, ShipState,
};

/// Unique identifier for an actor.
///
/// Ids are handed out by the [`Registry`](crate::registry::Registry) in
/// strictly increasing order and never reused, so ordering by id is ordering
/// by age.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActorId(u64);

impl ActorId {
    /// Creates an `ActorId` from a raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActorId({})", self.0)
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ActorId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

/// Kind of an actor.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorTag {
    /// A player's ship.
    Ship,
    /// An asteroid of type 1..=5.
    Asteroid,
    /// A cheap fast projectile.
    Bullet,
    /// A heavier projectile drawn from the ship's missile stock.
    Missile,
    /// A launched bomb waiting for its trigger.
    Bomb,
    /// A defense drone orbiting its owner.
    Drone,
    /// A collectible power-up.
    PowerUp,
}

impl ActorTag {
    /// Every tag, in dispatch order.
    pub const ALL: [Self; 7] = [
        Self::Ship,
        Self::Asteroid,
        Self::Bullet,
        Self::Missile,
        Self::Bomb,
        Self::Drone,
        Self::PowerUp,
    ];
}

impl fmt::Display for ActorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ship => "ship",
            Self::Asteroid => "asteroid",
            Self::Bullet => "bullet",
            Self::Missile => "missile",
            Self::Bomb => "bomb",
            Self::Drone => "drone",
            Self::PowerUp => "powerup",
        };
        f.write_str(name)
    }
}

/// Power-up kinds.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerUpKind {
    /// Recharges the shield ring.
    Shield,
    /// Plates the hull.
    Armor,
    /// Adds missiles to the stock.
    Missile,
    /// Restores hull points. Does not count against the global budget.
    Life,
    /// Raises the speed cap for a while.
    Boost,
    /// Spawns or upgrades a defense drone.
    Defense,
    /// Arms a bomb.
    Bomb,
    /// Starts camouflage.
    Camu,
}

impl PowerUpKind {
    /// Whether the kind counts towards the global concurrent power-up budget.
    #[must_use]
    pub const fn counts_towards_budget(self) -> bool {
        !matches!(self, Self::Life)
    }
}

/// Position and velocity of an actor, in arena units and units per second.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Motion {
    /// Center position.
    pub position: Vec2,
    /// Velocity.
    pub velocity: Vec2,
}

impl Motion {
    /// A resting actor at `position`.
    #[must_use]
    pub const fn at(position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
        }
    }

    /// An actor at `position` moving with `velocity`.
    #[must_use]
    pub const fn moving(position: Vec2, velocity: Vec2) -> Self {
        Self { position, velocity }
    }
}

/// Kind-specific state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActorInner {
    /// Ship state.
    Ship(ShipState),
    /// Asteroid state.
    Asteroid(AsteroidState),
    /// Bullet state.
    Bullet(ProjectileState),
    /// Missile state.
    Missile(ProjectileState),
    /// Bomb state.
    Bomb(BombState),
    /// Drone state.
    Drone(DroneState),
    /// Power-up state.
    PowerUp(PowerUpState),
}

impl ActorInner {
    /// The tag for this variant.
    #[must_use]
    pub const fn tag(&self) -> ActorTag {
        match self {
            Self::Ship(_) => ActorTag::Ship,
            Self::Asteroid(_) => ActorTag::Asteroid,
            Self::Bullet(_) => ActorTag::Bullet,
            Self::Missile(_) => ActorTag::Missile,
            Self::Bomb(_) => ActorTag::Bomb,
            Self::Drone(_) => ActorTag::Drone,
            Self::PowerUp(_) => ActorTag::PowerUp,
        }
    }

    /// Ship state, if this is a ship.
    #[must_use]
    pub const fn as_ship(&self) -> Option<&ShipState> {
        match self {
            Self::Ship(state) => Some(state),
            _ => None,
        }
    }

    /// Mutable ship state, if this is a ship.
    #[must_use]
    pub fn as_ship_mut(&mut self) -> Option<&mut ShipState> {
        match self {
            Self::Ship(state) => Some(state),
            _ => None,
        }
    }

    /// Asteroid state, if this is an asteroid.
    #[must_use]
    pub const fn as_asteroid(&self) -> Option<&AsteroidState> {
        match self {
            Self::Asteroid(state) => Some(state),
            _ => None,
        }
    }

    /// Mutable asteroid state, if this is an asteroid.
    #[must_use]
    pub fn as_asteroid_mut(&mut self) -> Option<&mut AsteroidState> {
        match self {
            Self::Asteroid(state) => Some(state),
            _ => None,
        }
    }

    /// Projectile state, if this is a bullet or a missile.
    #[must_use]
    pub const fn as_projectile(&self) -> Option<&ProjectileState> {
        match self {
            Self::Bullet(state) | Self::Missile(state) => Some(state),
            _ => None,
        }
    }

    /// Bomb state, if this is a bomb.
    #[must_use]
    pub const fn as_bomb(&self) -> Option<&BombState> {
        match self {
            Self::Bomb(state) => Some(state),
            _ => None,
        }
    }

    /// Drone state, if this is a drone.
    #[must_use]
    pub const fn as_drone(&self) -> Option<&DroneState> {
        match self {
            Self::Drone(state) => Some(state),
            _ => None,
        }
    }

    /// Mutable drone state, if this is a drone.
    #[must_use]
    pub fn as_drone_mut(&mut self) -> Option<&mut DroneState> {
        match self {
            Self::Drone(state) => Some(state),
            _ => None,
        }
    }

    /// Power-up state, if this is a power-up.
    #[must_use]
    pub const fn as_power_up(&self) -> Option<&PowerUpState> {
        match self {
            Self::PowerUp(state) => Some(state),
            _ => None,
        }
    }
}

/// A simulated object.
///
/// # Invariants
///
/// - The id is unique within a registry.
/// - Once `alive` is cleared it is never set again; the actor is skipped by
///   every later check and removed at the end of the tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    id: ActorId,
    alive: bool,
    spawned_at: Millis,
    /// Position and velocity.
    pub motion: Motion,
    /// Kind-specific state.
    pub inner: ActorInner,
}

impl Actor {
    /// Creates a live actor.
    #[must_use]
    pub const fn new(id: ActorId, motion: Motion, spawned_at: Millis, inner: ActorInner) -> Self {
        Self {
            id,
            alive: true,
            spawned_at,
            motion,
            inner,
        }
    }

    /// The actor's id.
    #[must_use]
    pub const fn id(&self) -> ActorId {
        self.id
    }

    /// The actor's kind.
    #[must_use]
    pub const fn tag(&self) -> ActorTag {
        self.inner.tag()
    }

    /// Whether the actor is still part of the simulation.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.alive
    }

    /// Clears the liveness flag. Returns `true` if the actor was alive.
    pub(crate) fn kill(&mut self) -> bool {
        std::mem::replace(&mut self.alive, false)
    }

    /// Simulation time at which the actor was created.
    #[must_use]
    pub const fn spawned_at(&self) -> Millis {
        self.spawned_at
    }

    /// Milliseconds since the actor was created.
    #[must_use]
    pub const fn age(&self, now: Millis) -> Millis {
        now.saturating_sub(self.spawned_at)
    }

    /// Current position.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.motion.position
    }

    /// Current velocity.
    #[must_use]
    pub const fn velocity(&self) -> Vec2 {
        self.motion.velocity
    }

    /// Ship state, if this is a ship.
    #[must_use]
    pub const fn as_ship(&self) -> Option<&ShipState> {
        self.inner.as_ship()
    }

    /// Mutable ship state, if this is a ship.
    #[must_use]
    pub fn as_ship_mut(&mut self) -> Option<&mut ShipState> {
        self.inner.as_ship_mut()
    }

    /// Asteroid state, if this is an asteroid.
    #[must_use]
    pub const fn as_asteroid(&self) -> Option<&AsteroidState> {
        self.inner.as_asteroid()
    }

    /// Mutable asteroid state, if this is an asteroid.
    #[must_use]
    pub fn as_asteroid_mut(&mut self) -> Option<&mut AsteroidState> {
        self.inner.as_asteroid_mut()
    }

    /// Projectile state, if this is a bullet or a missile.
    #[must_use]
    pub const fn as_projectile(&self) -> Option<&ProjectileState> {
        self.inner.as_projectile()
    }

    /// Bomb state, if this is a bomb.
    #[must_use]
    pub const fn as_bomb(&self) -> Option<&BombState> {
        self.inner.as_bomb()
    }

    /// Drone state, if this is a drone.
    #[must_use]
    pub const fn as_drone(&self) -> Option<&DroneState> {
        self.inner.as_drone()
    }

    /// Mutable drone state, if this is a drone.
    #[must_use]
    pub fn as_drone_mut(&mut self) -> Option<&mut DroneState> {
        self.inner.as_drone_mut()
    }

    /// Power-up state, if this is a power-up.
    #[must_use]
    pub const fn as_power_up(&self) -> Option<&PowerUpState> {
        self.inner.as_power_up()
    }
}
