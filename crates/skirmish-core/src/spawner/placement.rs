//! Rejection-sampled spawn positions.
//!
//! Both samplers try a fixed number of candidates and return the first one
//! that keeps clear of the actors that matter. When every try is blocked the
//! last candidate is used anyway: a crowded arena still gets its spawn.
//! Overlap checks here ignore the wrap.

use glam::Vec2;
use rand::Rng;

use crate::actor::{Actor, ActorTag};
use crate::collision::overlaps_any;
use crate::config::GameConfig;
use crate::registry::Registry;

/// Inset from each edge for interior placement.
const INTERIOR_INSET: f32 = 25.0;

fn ship_clearance<'a>(
    registry: &'a Registry,
    config: &'a GameConfig,
) -> impl Iterator<Item = (Vec2, f32)> + 'a {
    let r = config.combat.ship_radius * 2.0;
    registry
        .iter(ActorTag::Ship)
        .map(move |a| (a.position(), r))
}

fn power_up_clearance<'a>(
    registry: &'a Registry,
    config: &'a GameConfig,
) -> impl Iterator<Item = (Vec2, f32)> + 'a {
    let r = config.combat.power_up_radius * 2.0;
    registry
        .iter(ActorTag::PowerUp)
        .map(move |a| (a.position(), r))
}

fn asteroid_clearance<'a>(
    registry: &'a Registry,
    config: &'a GameConfig,
) -> impl Iterator<Item = (Vec2, f32)> + 'a {
    let asteroids = &config.asteroids;
    registry.iter(ActorTag::Asteroid).filter_map(move |a: &Actor| {
        let state = a.as_asteroid()?;
        let radius = asteroids.radius_of(state.tier);
        let r = if state.is_big() {
            radius * 1.1
        } else {
            radius * 2.0
        };
        Some((a.position(), r))
    })
}

/// A position inside the arena, clear of ships, power-ups and asteroids.
///
/// `radius` is the radius of the actor being placed; the clearance used is
/// twice that.
pub fn interior<R: Rng + ?Sized>(
    registry: &Registry,
    config: &GameConfig,
    rng: &mut R,
    radius: f32,
    tries: u32,
) -> Vec2 {
    let (w, h) = (config.arena.width, config.arena.height);
    let span = |extent: f32| (extent - 2.0 * INTERIOR_INSET).max(0.0);
    let clearance = radius * 2.0;
    let mut candidate = Vec2::new(w / 2.0, h / 2.0);
    for _ in 0..tries.max(1) {
        candidate = Vec2::new(
            rng.gen::<f32>() * span(w) + INTERIOR_INSET,
            rng.gen::<f32>() * span(h) + INTERIOR_INSET,
        );
        let blocked = overlaps_any(candidate, clearance, ship_clearance(registry, config))
            || overlaps_any(candidate, clearance, power_up_clearance(registry, config))
            || overlaps_any(candidate, clearance, asteroid_clearance(registry, config));
        if !blocked {
            break;
        }
    }
    candidate
}

/// A position on the wrap margin, clear of ships and asteroids.
///
/// Picks a random edge and a random point along it, pinned to the margin so
/// the actor drifts in from outside the visible area.
pub fn edge<R: Rng + ?Sized>(
    registry: &Registry,
    config: &GameConfig,
    rng: &mut R,
    radius: f32,
    tries: u32,
) -> Vec2 {
    let arena = &config.arena;
    let m = arena.wrap_margin;
    let mut candidate = Vec2::new(-m, -m);
    for _ in 0..tries.max(1) {
        let along_x = rng.gen::<f32>() * (arena.width + 2.0 * m) - m;
        let along_y = rng.gen::<f32>() * (arena.height + 2.0 * m) - m;
        let near = rng.gen_bool(0.5);
        candidate = if rng.gen_bool(0.5) {
            Vec2::new(along_x, if near { -m } else { arena.height + m })
        } else {
            Vec2::new(if near { -m } else { arena.width + m }, along_y)
        };
        let blocked = overlaps_any(candidate, radius, ship_clearance(registry, config))
            || overlaps_any(candidate, radius, asteroid_clearance(registry, config));
        if !blocked {
            break;
        }
    }
    candidate
}
