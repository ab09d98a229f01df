//! Kind-specific actor state.
//!
//! Each struct here is the payload of one [`ActorInner`](super::ActorInner)
//! variant. Position and velocity live on the actor itself.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::{ActorId, PowerUpKind};
use crate::geometry::Hull;
use crate::roster::PlayerId;
use crate::schedule::{EventId, Millis};

/// Hull plating. While on, strong hits strip it instead of killing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Armor {
    /// Whether the plating is mounted.
    pub on: bool,
    /// Remaining plating points.
    pub hp: f32,
}

/// Shield ring. Absorbs projectiles at a larger radius than the hull.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Shield {
    /// Whether the ring is up.
    pub on: bool,
    /// Remaining ring points.
    pub hp: f32,
    /// When the ring was raised.
    pub since: Millis,
}

/// Speed boost.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Boost {
    /// Whether the boost is running.
    pub on: bool,
    /// When the boost started.
    pub since: Millis,
}

/// Camouflage. Level 1 fades the ship out, level 2 is fully hidden.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Camouflage {
    /// 0 = visible, 1 = fading, 2 = hidden.
    pub level: u8,
    /// Remaining opacity, 100 down to 0.
    pub fade: f32,
    /// When the current level was entered.
    pub since: Millis,
}

/// Ship state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipState {
    /// Owning player.
    pub player: PlayerId,
    /// Facing, radians, see [`crate::geometry::heading_vector`].
    pub heading: f32,
    /// Hull points.
    pub hp: f32,
    /// Armor plating.
    pub armor: Armor,
    /// Shield ring.
    pub shield: Shield,
    /// Speed boost.
    pub boost: Boost,
    /// Remaining ticks of spawn protection. Guarded ships are skipped by
    /// every collision rule.
    pub guard: u32,
    /// Camouflage.
    pub camu: Camouflage,
    /// Missile stock.
    pub missiles: u32,
    /// Whether a bomb is armed and waiting to be launched.
    pub bomb_held: bool,
    /// The bomb currently in flight, if any.
    pub launched_bomb: Option<ActorId>,
    /// The escorting drone, if any.
    pub drone: Option<ActorId>,
    /// Triangle hull oriented by `heading`.
    pub hull: Hull,
    /// Earliest time the next bullet may leave.
    pub next_bullet_at: Millis,
    /// Earliest time the next missile may leave.
    pub next_missile_at: Millis,
}

impl ShipState {
    /// A fresh ship for `player`.
    #[must_use]
    pub fn new(player: PlayerId, heading: f32, hp: f32, guard: u32, radius: f32) -> Self {
        Self {
            player,
            heading,
            hp,
            armor: Armor::default(),
            shield: Shield::default(),
            boost: Boost::default(),
            guard,
            camu: Camouflage::default(),
            missiles: 0,
            bomb_held: false,
            launched_bomb: None,
            drone: None,
            hull: Hull::ship(heading, radius),
            next_bullet_at: 0,
            next_missile_at: 0,
        }
    }

    /// Whether spawn protection is still running.
    #[must_use]
    pub const fn is_guarded(&self) -> bool {
        self.guard > 0
    }

    /// Mounts armor with `hp` plating points.
    pub fn enable_armor(&mut self, hp: f32) {
        self.armor = Armor { on: true, hp };
    }

    /// Removes any armor.
    pub fn disable_armor(&mut self) {
        self.armor = Armor::default();
    }

    /// Drops the shield ring.
    pub fn drop_shield(&mut self) {
        self.shield.on = false;
        self.shield.hp = 0.0;
    }
}

/// Asteroid state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AsteroidState {
    /// 1..=3 are regular sizes, 4 and 5 are big.
    pub tier: u8,
    /// Remaining hit points.
    pub hp: f32,
    /// Velocity of whatever last smashed into it; children fly along it.
    pub broken: Option<Vec2>,
    /// Destroyed by a bomb. Bombed asteroids do not split.
    pub bombed: bool,
    /// The asteroid this one split from.
    pub parent: Option<ActorId>,
    /// Convex outline.
    pub hull: Hull,
}

impl AsteroidState {
    /// Whether this is one of the big, slow asteroids.
    #[must_use]
    pub const fn is_big(&self) -> bool {
        self.tier >= 4
    }

    /// Whether destruction produces two smaller children.
    #[must_use]
    pub const fn splits(&self) -> bool {
        !self.bombed && matches!(self.tier, 2 | 3)
    }

    /// Whether both asteroids came out of the same split.
    #[must_use]
    pub fn is_sibling_of(&self, other: &Self) -> bool {
        self.parent.is_some() && self.parent == other.parent
    }
}

/// Bullet or missile state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectileState {
    /// The player that fired it.
    pub owner: PlayerId,
}

/// Bomb state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BombState {
    /// The player that launched it.
    pub owner: PlayerId,
    /// Blast radius.
    pub range: f32,
}

/// Defense drone state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DroneState {
    /// Owning player.
    pub owner: PlayerId,
    /// The ship the drone orbits.
    pub ship: ActorId,
    /// Upgrade level, starting at 1.
    pub level: u32,
    /// Last (re)initialisation; the lifetime counts from here.
    pub init_time: Millis,
    /// Current orbit angle around the owner.
    pub orbit: f32,
    /// Pending expiry event.
    pub expiry: Option<EventId>,
}

/// Power-up state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerUpState {
    /// What collecting it grants.
    pub kind: PowerUpKind,
}
