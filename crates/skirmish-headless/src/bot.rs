//! A crude autopilot: turn toward the nearest rival, shoot when lined up.

use glam::Vec2;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use skirmish_core::geometry::{wrap_angle, Torus};
use skirmish_core::snapshot::{ActorDetail, WorldSnapshot};
use skirmish_core::{InputFlags, PlayerId};

/// Radians off target below which the bot stops turning.
const AIM_TOLERANCE: f32 = 0.12;
/// Radians off target below which the bot opens fire.
const FIRE_CONE: f32 = 0.35;

/// One simulated player.
#[derive(Debug)]
pub struct Bot {
    player: PlayerId,
    cruising: bool,
}

impl Bot {
    pub fn new(player: PlayerId) -> Self {
        Self {
            player,
            cruising: true,
        }
    }

    pub const fn player(&self) -> PlayerId {
        self.player
    }

    /// Picks this tick's intent from the latest snapshot.
    pub fn think(&mut self, snapshot: &WorldSnapshot, torus: &Torus, rng: &mut ChaCha8Rng) -> InputFlags {
        let Some((position, heading)) = self.own_ship(snapshot) else {
            return InputFlags::empty();
        };
        if rng.gen_bool(0.05) {
            self.cruising = !self.cruising;
        }

        let mut input = InputFlags::empty();
        if self.cruising {
            input |= InputFlags::FORWARD;
        }
        if rng.gen_bool(0.02) {
            input |= InputFlags::ACTION;
        }

        let Some(target) = self.nearest_rival(snapshot, torus, position) else {
            return input | InputFlags::RIGHT;
        };
        let off = wrap_angle(torus.angle(position, target) - heading);
        if off > AIM_TOLERANCE {
            input |= InputFlags::RIGHT;
        } else if off < -AIM_TOLERANCE {
            input |= InputFlags::LEFT;
        }
        if off.abs() < FIRE_CONE {
            input |= InputFlags::FIRE;
        }
        input
    }

    fn own_ship(&self, snapshot: &WorldSnapshot) -> Option<(Vec2, f32)> {
        snapshot.actors.iter().find_map(|view| match view.detail {
            ActorDetail::Ship {
                player, heading, ..
            } if player == self.player => Some((view.position, heading)),
            _ => None,
        })
    }

    fn nearest_rival(&self, snapshot: &WorldSnapshot, torus: &Torus, from: Vec2) -> Option<Vec2> {
        snapshot
            .actors
            .iter()
            .filter(|view| {
                matches!(view.detail, ActorDetail::Ship { player, guarded: false, .. } if player != self.player)
            })
            .map(|view| view.position)
            .min_by(|a, b| torus.distance(from, *a).total_cmp(&torus.distance(from, *b)))
    }
}
