//! Player intents and kinematics.
//!
//! Each tick every ship is steered from its owner's latest [`InputFlags`],
//! its timed statuses (boost, shield, camouflage, spawn guard) are aged, and
//! while the round is in play FIRE and ACTION are turned into projectiles and
//! bombs. Drones then orbit their ship, and everything else drifts along its
//! velocity. All positions wrap at the arena margin.

use bitflags::bitflags;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::actor::components::{BombState, ProjectileState};
use crate::actor::{Actor, ActorId, ActorInner, ActorTag, Motion};
use crate::config::LaunchTuning;
use crate::context::SimContext;
use crate::geometry::{heading_vector, wrap_angle, Hull};
use crate::resolver::bomb;
use crate::roster::PlayerId;
use crate::schedule::{Millis, TimedEvent};

bitflags! {
    /// What a player is pressing.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct InputFlags: u8 {
        /// Thrust along the heading.
        const FORWARD = 1 << 0;
        /// Reverse thrust at half strength.
        const BACKWARD = 1 << 1;
        /// Turn counter-clockwise.
        const LEFT = 1 << 2;
        /// Turn clockwise.
        const RIGHT = 1 << 3;
        /// Fire a missile if any are held, a bullet otherwise.
        const FIRE = 1 << 4;
        /// Launch or detonate the bomb. Edge-triggered.
        const ACTION = 1 << 5;
    }
}

#[allow(clippy::cast_precision_loss)]
fn secs(ms: Millis) -> f32 {
    ms as f32 / 1000.0
}

/// Initial motion of something launched from `origin` along `heading`.
///
/// The launcher's velocity plus an impulse along the heading, with the
/// resulting speed clamped to the tuning's range.
#[must_use]
pub fn launch_at(origin: Motion, heading: f32, offset: f32, tuning: &LaunchTuning) -> Motion {
    let direction = heading_vector(heading);
    let velocity = origin.velocity + direction * tuning.impulse;
    let speed = velocity.length();
    let clamped = if speed <= f32::EPSILON {
        direction * tuning.min_speed
    } else {
        velocity * (speed.clamp(tuning.min_speed, tuning.max_speed) / speed)
    };
    Motion::moving(origin.position + direction * offset, clamped)
}

/// Runs one tick of motion. `weapons` is off during the intermission.
pub fn advance(ctx: &mut SimContext, dt_ms: Millis, weapons: bool) {
    let dt = secs(dt_ms);
    for ship in ctx.registry.ids(ActorTag::Ship) {
        steer(ctx, ship, dt);
        age_statuses(ctx, ship, dt);
        if weapons {
            fire(ctx, ship);
            act(ctx, ship);
        }
    }
    for player in ctx.roster.ids() {
        if let Some(record) = ctx.roster.get_mut(player) {
            record.previous_input = record.input;
        }
    }
    if weapons {
        orbit_drones(ctx, dt);
        drift(ctx, dt);
    }
}

fn input_of(ctx: &SimContext, player: PlayerId) -> (InputFlags, InputFlags) {
    ctx.roster
        .get(player)
        .map_or((InputFlags::empty(), InputFlags::empty()), |r| {
            (r.input, r.previous_input)
        })
}

fn steer(ctx: &mut SimContext, ship: ActorId, dt: f32) {
    let Some(player) = ctx.registry.ship(ship).map(|s| s.player) else {
        return;
    };
    let (input, _) = input_of(ctx, player);
    let config = &ctx.config.ship;
    let radius = ctx.config.combat.ship_radius;
    let Some(actor) = ctx.registry.live_mut(ship) else {
        return;
    };
    let Actor { motion, inner, .. } = actor;
    let Some(state) = inner.as_ship_mut() else {
        return;
    };

    let mut turn = 0.0;
    if input.contains(InputFlags::RIGHT) {
        turn += 1.0;
    }
    if input.contains(InputFlags::LEFT) {
        turn -= 1.0;
    }
    if turn != 0.0 {
        state.heading = wrap_angle(state.heading + turn * config.turn_rate * dt);
        state.hull = Hull::ship(state.heading, radius);
    }

    let thrust = if input.contains(InputFlags::FORWARD) {
        config.thrust
    } else if input.contains(InputFlags::BACKWARD) {
        -config.thrust / 2.0
    } else {
        0.0
    };
    motion.velocity += heading_vector(state.heading) * thrust * dt;
    motion.velocity *= config.drag.powf(dt);
    let cap = if state.boost.on {
        config.max_speed * config.boost_multiplier
    } else {
        config.max_speed
    };
    motion.velocity = motion.velocity.clamp_length_max(cap);
    let (position, _) = ctx.torus.wrap_position(motion.position + motion.velocity * dt);
    motion.position = position;
}

fn age_statuses(ctx: &mut SimContext, ship: ActorId, dt: f32) {
    let now = ctx.now;
    let config = &ctx.config.ship;
    let Some(state) = ctx.registry.ship_mut(ship) else {
        return;
    };
    if state.boost.on && now.saturating_sub(state.boost.since) >= config.boost_duration_ms {
        state.boost.on = false;
    }
    if state.shield.on && now.saturating_sub(state.shield.since) >= config.shield_duration_ms {
        state.drop_shield();
    }
    if state.camu.level == 1 {
        state.camu.fade -= config.camu_fade_per_sec * dt;
        if state.camu.fade <= 0.0 {
            state.camu.fade = 0.0;
            state.camu.level = 2;
        }
    }
    if state.camu.level > 0 && now.saturating_sub(state.camu.since) >= config.camu_duration_ms {
        state.camu.level = 0;
        state.camu.fade = 0.0;
    }
    state.guard = state.guard.saturating_sub(1);
}

fn fire(ctx: &mut SimContext, ship: ActorId) {
    let now = ctx.now;
    let Some(actor) = ctx.registry.live(ship) else {
        return;
    };
    let Some(state) = actor.as_ship() else {
        return;
    };
    let player = state.player;
    if !input_of(ctx, player).0.contains(InputFlags::FIRE) {
        return;
    }
    let (origin, heading) = (actor.motion, state.heading);
    let config = &ctx.config.ship;
    let missile = state.missiles > 0;
    let ready = if missile {
        now >= state.next_missile_at
    } else {
        now >= state.next_bullet_at
    };
    if !ready {
        return;
    }
    let (tuning, cooldown) = if missile {
        (config.missile, config.missile_cooldown_ms)
    } else {
        (config.bullet, config.bullet_cooldown_ms)
    };
    let offset = ctx.config.combat.ship_radius;

    if let Some(state) = ctx.registry.ship_mut(ship) {
        if missile {
            state.missiles -= 1;
            state.next_missile_at = now + cooldown;
        } else {
            state.next_bullet_at = now + cooldown;
        }
    }
    let projectile = ProjectileState { owner: player };
    let inner = if missile {
        ActorInner::Missile(projectile)
    } else {
        ActorInner::Bullet(projectile)
    };
    let id = ctx
        .registry
        .spawn(launch_at(origin, heading, offset, &tuning), now, inner);
    ctx.schedule
        .schedule(now + tuning.lifetime_ms, TimedEvent::Expire(id));
    ctx.roster.record_shot(player);
    trace!(%player, shot = %id, missile, "fired");
}

/// ACTION detonates the bomb in flight, or launches the one held.
fn act(ctx: &mut SimContext, ship: ActorId) {
    let Some(actor) = ctx.registry.live(ship) else {
        return;
    };
    let Some(state) = actor.as_ship() else {
        return;
    };
    let player = state.player;
    let (input, previous) = input_of(ctx, player);
    if !input.contains(InputFlags::ACTION) || previous.contains(InputFlags::ACTION) {
        return;
    }

    if let Some(launched) = state.launched_bomb.filter(|&id| ctx.registry.is_alive(id)) {
        bomb::detonate(ctx, launched);
        return;
    }
    if !state.bomb_held {
        return;
    }
    let (origin, heading) = (actor.motion, state.heading);
    let now = ctx.now;
    let combat = &ctx.config.combat;
    let (range, fuse, offset) = (combat.bomb_range, combat.bomb_fuse_ms, combat.ship_radius);
    let motion = launch_at(origin, heading, offset, &ctx.config.ship.bomb);
    let id = ctx.registry.spawn(
        motion,
        now,
        ActorInner::Bomb(BombState {
            owner: player,
            range,
        }),
    );
    ctx.schedule.schedule(now + fuse, TimedEvent::Expire(id));
    if let Some(state) = ctx.registry.ship_mut(ship) {
        state.bomb_held = false;
        state.launched_bomb = Some(id);
    }
    trace!(%player, bomb = %id, "bomb launched");
}

fn orbit_drones(ctx: &mut SimContext, dt: f32) {
    let combat = &ctx.config.combat;
    let (radius, speed) = (combat.drone_orbit_radius, combat.drone_orbit_speed);
    for drone in ctx.registry.ids(ActorTag::Drone) {
        let Some(state) = ctx.registry.live(drone).and_then(Actor::as_drone).copied() else {
            continue;
        };
        let Some(center) = ctx.registry.live(state.ship).map(Actor::position) else {
            ctx.destroy_drone(drone);
            continue;
        };
        #[allow(clippy::cast_precision_loss)]
        let orbit = wrap_angle(state.orbit + speed * state.level as f32 * dt);
        let (target, _) = ctx
            .torus
            .wrap_position(center + heading_vector(orbit) * radius);
        let torus = ctx.torus;
        let Some(actor) = ctx.registry.live_mut(drone) else {
            continue;
        };
        if dt > 0.0 {
            actor.motion.velocity = torus.delta(actor.motion.position, target) / dt;
        }
        actor.motion.position = target;
        if let Some(state) = actor.as_drone_mut() {
            state.orbit = orbit;
        }
    }
}

/// Straight-line motion for everything that is neither a ship nor a drone.
fn drift(ctx: &mut SimContext, dt: f32) {
    let torus = ctx.torus;
    for tag in [
        ActorTag::Asteroid,
        ActorTag::Bullet,
        ActorTag::Missile,
        ActorTag::Bomb,
        ActorTag::PowerUp,
    ] {
        for id in ctx.registry.ids(tag) {
            if let Some(actor) = ctx.registry.live_mut(id) {
                let moved = actor.motion.position + actor.motion.velocity * dt;
                actor.motion.position = torus.wrap_position(moved).0;
            }
        }
    }
}
