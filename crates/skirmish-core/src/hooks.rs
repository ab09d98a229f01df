//! Notifications for the per-connection client layer.
//!
//! The core keeps its own score bookkeeping in the
//! [`Roster`](crate::roster::Roster). Implementations of [`ClientHooks`] are
//! told about the outcome afterwards, exactly once per event, and cannot
//! influence the simulation.

use serde::{Deserialize, Serialize};

use crate::roster::PlayerId;

/// Weapon that landed a killing projectile hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weapon {
    /// A bullet.
    Bullet,
    /// A missile.
    Missile,
    /// A defense drone rammed the victim.
    Drone,
}

/// Receives scoring and kill notifications.
///
/// Every method defaults to doing nothing.
pub trait ClientHooks {
    /// `points` were added to (or, when negative, removed from) `player`.
    fn add_score(&mut self, player: PlayerId, points: i64) {
        let _ = (player, points);
    }

    /// `victim` flew into an asteroid.
    fn kill_by_asteroid(&mut self, victim: PlayerId) {
        let _ = victim;
    }

    /// `victim` collided with `killer`'s ship.
    fn kill_by_player(&mut self, victim: PlayerId, killer: PlayerId) {
        let _ = (victim, killer);
    }

    /// `victim` was hit by something `shooter` fired.
    fn kill_by_projectile(&mut self, victim: PlayerId, shooter: PlayerId, weapon: Weapon) {
        let _ = (victim, shooter, weapon);
    }

    /// `victim` was caught in `bomber`'s blast.
    fn kill_by_bomb(&mut self, victim: PlayerId, bomber: PlayerId) {
        let _ = (victim, bomber);
    }
}

/// Hooks that ignore everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl ClientHooks for NoopHooks {}
