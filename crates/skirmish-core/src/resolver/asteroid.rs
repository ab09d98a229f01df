//! Asteroid collision rules.
//!
//! Runs once per tick after the ships: spawn new asteroids, resolve every
//! asteroid alive at the start of the pass (oldest first), then split the
//! ones that were destroyed. Children therefore never take part in the pass
//! that created them, and they ignore each other until the split grace runs
//! out.

use glam::Vec2;
use tracing::trace;

use crate::actor::{ActorId, ActorTag};
use crate::context::SimContext;
use crate::resolver::{bomb, Resolver};
use crate::roster::KillCause;
use crate::spawner::asteroid as spawner;

/// Damage a drone deals to an asteroid it touches.
pub const DRONE_DAMAGE: f32 = 15.0;
/// Damage a tier-1 asteroid deals to an unarmored ship.
pub const PEBBLE_DAMAGE: f32 = 5.0;
/// Damage a tier-1 asteroid deals to an armored ship.
pub const PEBBLE_ARMORED_DAMAGE: f32 = 2.0;
/// Damage a ship deals to a big asteroid.
pub const RAM_DAMAGE: f32 = 20.0;
/// Damage an armored ship deals to a big asteroid.
pub const RAM_ARMORED_DAMAGE: f32 = 30.0;
/// Bullet damage.
pub const BULLET_DAMAGE: f32 = 5.0;
/// Missile damage.
pub const MISSILE_DAMAGE: f32 = 10.0;

/// Spawns, resolves and splits asteroids.
#[derive(Debug, Clone, Copy, Default)]
pub struct AsteroidResolver;

impl Resolver for AsteroidResolver {
    fn name(&self) -> &'static str {
        "asteroids"
    }

    fn resolve(&self, ctx: &mut SimContext) {
        spawner::update(ctx);

        let asteroids = ctx.registry.ids(ActorTag::Asteroid);
        for (index, &asteroid) in asteroids.iter().enumerate() {
            if !ctx.registry.asteroid(asteroid).is_some_and(|a| a.hp > 0.0) {
                continue;
            }
            sweep_power_ups(ctx, asteroid);
            let _ = hit_drones(ctx, asteroid)
                || hit_bombs(ctx, asteroid)
                || hit_ships(ctx, asteroid)
                || hit_asteroids(ctx, asteroid, &asteroids[index + 1..])
                || hit_by_shots(ctx, asteroid, ActorTag::Bullet, BULLET_DAMAGE)
                || hit_by_shots(ctx, asteroid, ActorTag::Missile, MISSILE_DAMAGE);
        }

        let children = spawner::split_destroyed(ctx);
        if !children.is_empty() {
            trace!(children = children.len(), "asteroids split");
        }
    }
}

fn gone(ctx: &SimContext, asteroid: ActorId) -> bool {
    !ctx.registry.is_alive(asteroid)
}

fn is_big(ctx: &SimContext, asteroid: ActorId) -> bool {
    ctx.registry.asteroid(asteroid).is_some_and(|a| a.is_big())
}

fn mark_broken(ctx: &mut SimContext, asteroid: ActorId, by: Vec2) {
    if let Some(state) = ctx.registry.asteroid_mut(asteroid) {
        state.broken = Some(by);
    }
}

/// Big asteroids plough through power-ups, which are lost without effect.
fn sweep_power_ups(ctx: &mut SimContext, asteroid: ActorId) {
    if !is_big(ctx, asteroid) {
        return;
    }
    for power_up in ctx.registry.ids(ActorTag::PowerUp) {
        if ctx.touching(asteroid, power_up) {
            ctx.remove_power_up(power_up);
        }
    }
}

fn hit_drones(ctx: &mut SimContext, asteroid: ActorId) -> bool {
    for drone in ctx.registry.ids(ActorTag::Drone) {
        if !ctx.touching(asteroid, drone) {
            continue;
        }
        let Some((owner, velocity)) = ctx
            .registry
            .live(drone)
            .and_then(|a| a.as_drone().map(|d| (d.owner, a.velocity())))
        else {
            continue;
        };
        let tier = ctx.registry.asteroid(asteroid).map_or(0, |a| a.tier);
        if tier > 1 {
            ctx.destroy_drone(drone);
        }
        mark_broken(ctx, asteroid, velocity);
        if ctx.damage_asteroid(asteroid, DRONE_DAMAGE) {
            let points = ctx.config.scoring.drone_asteroid_points;
            ctx.award(owner, points);
            return true;
        }
    }
    false
}

fn hit_bombs(ctx: &mut SimContext, asteroid: ActorId) -> bool {
    for id in ctx.registry.ids(ActorTag::Bomb) {
        if ctx.touching(asteroid, id) {
            bomb::detonate(ctx, id);
            if gone(ctx, asteroid) {
                return true;
            }
        }
    }
    false
}

fn hit_ships(ctx: &mut SimContext, asteroid: ActorId) -> bool {
    for ship in ctx.registry.ids(ActorTag::Ship) {
        let guarded = ctx.registry.ship(ship).map_or(true, |s| s.is_guarded());
        if guarded || !ctx.touching(asteroid, ship) {
            continue;
        }
        let Some(tier) = ctx.registry.asteroid(asteroid).map(|a| a.tier) else {
            return true;
        };
        let velocity = ctx.registry.get(ship).map_or(Vec2::ZERO, |a| a.velocity());
        let Some(state) = ctx.registry.ship_mut(ship) else {
            continue;
        };
        let armored = state.armor.on;
        match tier {
            1 => {
                state.hp -= if armored {
                    PEBBLE_ARMORED_DAMAGE
                } else {
                    PEBBLE_DAMAGE
                };
            }
            2 | 3 if armored => state.disable_armor(),
            _ => {
                state.hp = 0.0;
                state.disable_armor();
            }
        }
        if state.hp <= 0.0 {
            ctx.kill_ship(ship, KillCause::Asteroid);
        }

        if tier < 4 {
            mark_broken(ctx, asteroid, velocity);
            ctx.destroy_asteroid(asteroid);
            return true;
        }
        let damage = if armored {
            RAM_ARMORED_DAMAGE
        } else {
            RAM_DAMAGE
        };
        if ctx.damage_asteroid(asteroid, damage) {
            return true;
        }
    }
    false
}

/// Fresh children of one split drift apart before they can collide.
fn separating(ctx: &SimContext, asteroid: ActorId, other: ActorId) -> bool {
    let (Some(a), Some(b)) = (ctx.registry.get(asteroid), ctx.registry.get(other)) else {
        return false;
    };
    let (Some(a_state), Some(b_state)) = (a.as_asteroid(), b.as_asteroid()) else {
        return false;
    };
    let grace = ctx.config.asteroids.split_grace_ms;
    a_state.is_sibling_of(b_state) && a.age(ctx.now).min(b.age(ctx.now)) < grace
}

/// Equal tiers destroy each other; otherwise the smaller one breaks.
fn hit_asteroids(ctx: &mut SimContext, asteroid: ActorId, later: &[ActorId]) -> bool {
    for &other in later {
        if separating(ctx, asteroid, other) || !ctx.touching(asteroid, other) {
            continue;
        }
        let (Some(a), Some(b)) = (ctx.registry.asteroid(asteroid), ctx.registry.asteroid(other))
        else {
            continue;
        };
        let (a_tier, b_tier) = (a.tier, b.tier);
        if a_tier == b_tier {
            ctx.destroy_asteroid(asteroid);
            ctx.destroy_asteroid(other);
            return true;
        } else if a_tier < b_tier {
            ctx.destroy_asteroid(asteroid);
            return true;
        }
        ctx.destroy_asteroid(other);
    }
    false
}

fn hit_by_shots(ctx: &mut SimContext, asteroid: ActorId, tag: ActorTag, damage: f32) -> bool {
    for shot in ctx.registry.ids(tag) {
        if !ctx.touching(asteroid, shot) {
            continue;
        }
        let Some(owner) = ctx
            .registry
            .live(shot)
            .and_then(|a| a.as_projectile())
            .map(|p| p.owner)
        else {
            continue;
        };
        ctx.roster.record_hit(owner);
        ctx.registry.destroy(shot);
        if ctx.damage_asteroid(asteroid, damage) {
            return true;
        }
    }
    false
}
