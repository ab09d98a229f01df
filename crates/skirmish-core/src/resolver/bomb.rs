//! Bomb detonation.
//!
//! A detonating bomb leaves a fixed blast circle behind that is evaluated
//! `bomb_pulses` times, `bomb_pulse_interval_ms` apart. The first pulse runs
//! immediately; the rest are [`TimedEvent::BombPulse`] entries in the event
//! queue, so a blast keeps hurting whatever drifts into it for a short while.
//!
//! Bombs caught in a blast detonate in turn.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::actor::{ActorId, ActorTag};
use crate::context::SimContext;
use crate::roster::{KillCause, PlayerId};
use crate::schedule::{Millis, TimedEvent};
use crate::snapshot::ServerMessage;

/// Damage a blast pulse deals to a big asteroid.
pub const BIG_ASTEROID_BLAST_DAMAGE: f32 = 200.0;

/// A blast circle with the number of pulses it still has to run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Blast {
    /// Where the bomb went off.
    pub center: Vec2,
    /// Blast radius.
    pub range: f32,
    /// Who launched the bomb.
    pub owner: PlayerId,
    /// Pulses left, this one included.
    pub remaining: u32,
}

/// Detonates a live bomb. Does nothing if the bomb is already gone.
pub fn detonate(ctx: &mut SimContext, bomb: ActorId) {
    let Some((center, owner, range)) = ctx
        .registry
        .live(bomb)
        .and_then(|actor| actor.as_bomb().map(|b| (actor.position(), b.owner, b.range)))
    else {
        return;
    };
    ctx.registry.destroy(bomb);
    ctx.schedule
        .cancel_where(|event| *event == TimedEvent::Expire(bomb));

    let ship = ctx.roster.get(owner).and_then(|record| record.ship);
    if let Some(state) = ship.and_then(|id| ctx.registry.ship_mut(id)) {
        if state.launched_bomb == Some(bomb) {
            state.launched_bomb = None;
        }
    }
    debug!(%bomb, %owner, x = center.x, y = center.y, "bomb detonated");

    let blast = Blast {
        center,
        range,
        owner,
        remaining: ctx.config.combat.bomb_pulses,
    };
    let now = ctx.now;
    run_pulse(ctx, blast, now);
}

/// Evaluates one pulse and queues the next one, if any.
pub fn run_pulse(ctx: &mut SimContext, blast: Blast, due: Millis) {
    if blast.remaining == 0 {
        return;
    }
    let remaining = blast.remaining - 1;
    ctx.emit(ServerMessage::BlastPulse {
        center: blast.center,
        range: blast.range,
        remaining,
    });
    explode(ctx, &blast);
    if remaining > 0 {
        let next = due + ctx.config.combat.bomb_pulse_interval_ms;
        ctx.schedule.schedule(
            next,
            TimedEvent::BombPulse(Blast {
                remaining,
                ..blast
            }),
        );
    }
}

/// Applies one blast pulse to everything inside the circle.
pub fn explode(ctx: &mut SimContext, blast: &Blast) {
    let Blast { center, range, owner, .. } = *blast;
    let caught = |ctx: &SimContext, tag: ActorTag| -> Vec<ActorId> {
        ctx.registry
            .ids(tag)
            .into_iter()
            .filter(|&id| ctx.in_blast(center, range, id))
            .collect()
    };

    for bomb in caught(ctx, ActorTag::Bomb) {
        detonate(ctx, bomb);
    }
    for drone in caught(ctx, ActorTag::Drone) {
        ctx.destroy_drone(drone);
    }
    for ship in caught(ctx, ActorTag::Ship) {
        if ctx.registry.ship(ship).is_some_and(|s| !s.is_guarded()) {
            ctx.kill_ship(ship, KillCause::Bomb(owner));
        }
    }
    for power_up in caught(ctx, ActorTag::PowerUp) {
        ctx.remove_power_up(power_up);
    }
    for shot in caught(ctx, ActorTag::Bullet)
        .into_iter()
        .chain(caught(ctx, ActorTag::Missile))
    {
        ctx.registry.destroy(shot);
    }
    for asteroid in caught(ctx, ActorTag::Asteroid) {
        let Some(state) = ctx.registry.asteroid_mut(asteroid) else {
            continue;
        };
        if state.is_big() {
            ctx.damage_asteroid(asteroid, BIG_ASTEROID_BLAST_DAMAGE);
        } else {
            state.bombed = true;
            ctx.destroy_asteroid(asteroid);
        }
    }
}
