//! Asteroid population and splitting.
//!
//! Regular asteroids (type 2 or 3) appear inside the arena whenever the
//! population is below the ceiling for the current player count and the
//! regular timer has passed. Big asteroids (type 4 or 5) drift in from the
//! edge on a much slower timer, at most one at a time.
//!
//! A destroyed type 2 or 3 asteroid that was not bombed breaks into two
//! children one type smaller. Without a breaker the children fan out around
//! the parent's own heading; with one they fan out more narrowly around the
//! breaker's heading and a little faster. Both children start on the
//! parent's position and ignore each other for a short grace period so they
//! can drift apart.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_3, FRAC_PI_4, TAU};

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::actor::{ActorId, ActorInner, ActorTag, AsteroidState, Motion};
use crate::config::{by_player_count, AsteroidConfig};
use crate::context::SimContext;
use crate::geometry::{heading_of, heading_vector, Hull};
use crate::schedule::Millis;
use crate::spawner::placement;

/// Spawn timers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsteroidSpawner {
    next_regular: Millis,
    next_big: Millis,
}

impl AsteroidSpawner {
    /// Timers that fire immediately; call [`AsteroidSpawner::reset`] at
    /// round start.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next_regular: 0,
            next_big: 0,
        }
    }

    /// Arms both timers for a fresh round.
    pub fn reset<R: Rng + ?Sized>(&mut self, now: Millis, config: &AsteroidConfig, rng: &mut R) {
        self.next_regular = now + jitter(rng, config.first_delay_ms);
        self.next_big =
            now + config.big_first_delay_ms + jitter(rng, config.big_first_jitter_ms);
    }

    /// When the next regular asteroid may appear.
    #[must_use]
    pub const fn next_regular(&self) -> Millis {
        self.next_regular
    }

    /// When the next big asteroid may appear.
    #[must_use]
    pub const fn next_big(&self) -> Millis {
        self.next_big
    }
}

fn jitter<R: Rng + ?Sized>(rng: &mut R, max: Millis) -> Millis {
    if max == 0 {
        0
    } else {
        rng.gen_range(0..max)
    }
}

/// What is left of a destroyed asteroid when it comes to splitting it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitSeed {
    /// The destroyed asteroid.
    pub parent: ActorId,
    /// Parent type.
    pub tier: u8,
    /// Parent's last position.
    pub position: Vec2,
    /// Parent's last velocity.
    pub velocity: Vec2,
    /// Velocity of whatever broke the parent.
    pub broken: Option<Vec2>,
}

/// A convex outline: `vertices` points on a circle of `radius` at jittered,
/// still strictly increasing, angles.
pub fn asteroid_hull<R: Rng + ?Sized>(rng: &mut R, radius: f32, vertices: usize) -> Hull {
    let n = vertices.max(3);
    #[allow(clippy::cast_precision_loss)]
    let step = TAU / n as f32;
    let points = (0..n)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let base = i as f32 * step;
            let angle = base + rng.gen_range(-0.3..0.3) * step;
            heading_vector(angle) * radius
        })
        .collect();
    Hull::new(points)
}

/// Creates an asteroid of `tier` with the given motion.
pub fn spawn_asteroid(ctx: &mut SimContext, tier: u8, motion: Motion, broken: Option<Vec2>) -> ActorId {
    let radius = ctx.config.asteroids.radius_of(tier);
    let hp = ctx
        .config
        .asteroids
        .hp
        .get(usize::from(tier))
        .copied()
        .unwrap_or(1.0);
    let hull = asteroid_hull(&mut ctx.rng, radius, ctx.config.asteroids.hull_vertices);
    let id = ctx.registry.spawn(
        motion,
        ctx.now,
        ActorInner::Asteroid(AsteroidState {
            tier,
            hp,
            broken,
            bombed: false,
            parent: None,
            hull,
        }),
    );
    debug!(asteroid = %id, tier, "asteroid spawned");
    id
}

fn drift(ctx: &mut SimContext, tier: u8, heading: f32) -> Vec2 {
    let speed = ctx
        .config
        .asteroids
        .drift_speed
        .get(usize::from(tier))
        .copied()
        .unwrap_or(0.0);
    heading_vector(heading) * speed
}

/// Runs both spawn timers.
pub fn update(ctx: &mut SimContext) {
    let now = ctx.now;
    let config = &ctx.config.asteroids;
    let ceiling = by_player_count(&config.max_population, ctx.roster.len(), 0);
    let population = ctx.registry.count(ActorTag::Asteroid);

    if population < ceiling && now > ctx.asteroids.next_regular {
        let spawn_jitter = config.spawn_jitter_ms;
        let tier = ctx.rng.gen_range(2..=3);
        let position = placement::interior(
            &ctx.registry,
            &ctx.config,
            &mut ctx.rng,
            config.radius_of(tier),
            config.placement_tries,
        );
        let heading = ctx.rng.gen::<f32>() * TAU;
        let velocity = drift(ctx, tier, heading);
        spawn_asteroid(ctx, tier, Motion::moving(position, velocity), None);
        ctx.asteroids.next_regular = now + jitter(&mut ctx.rng, spawn_jitter);
    }

    if now > ctx.asteroids.next_big {
        let big_present = ctx
            .registry
            .iter(ActorTag::Asteroid)
            .any(|a| a.as_asteroid().is_some_and(AsteroidState::is_big));
        if !big_present {
            let tier = if ctx.rng.gen_bool(0.5) { 4 } else { 5 };
            let position = placement::edge(
                &ctx.registry,
                &ctx.config,
                &mut ctx.rng,
                ctx.config.asteroids.radius_of(tier),
                ctx.config.asteroids.edge_placement_tries,
            );
            let center = Vec2::new(ctx.torus.width(), ctx.torus.height()) / 2.0;
            let heading = ctx.torus.angle(position, center) + ctx.rng.gen_range(-0.5..0.5);
            let velocity = drift(ctx, tier, heading);
            spawn_asteroid(ctx, tier, Motion::moving(position, velocity), None);
        }
        let config = &ctx.config.asteroids;
        let (interval, spread) = (config.big_interval_ms, config.big_jitter_ms);
        ctx.asteroids.next_big = now + interval + jitter(&mut ctx.rng, spread);
    }
}

/// Turns every queued destroyed asteroid into its two children.
pub fn split_destroyed(ctx: &mut SimContext) -> Vec<ActorId> {
    let seeds = std::mem::take(&mut ctx.pending_splits);
    let mut children = Vec::with_capacity(seeds.len() * 2);
    for seed in seeds {
        children.extend(split(ctx, &seed));
    }
    children
}

/// Spawns the two children of one destroyed asteroid.
pub fn split(ctx: &mut SimContext, seed: &SplitSeed) -> [ActorId; 2] {
    let config = &ctx.config.asteroids;
    let base_speed = config
        .split_speed
        .get(usize::from(seed.tier))
        .copied()
        .unwrap_or(0.0);
    let factor = config.broken_speed_factor;

    let (heading, spread, speed) = match seed.broken {
        None => (
            heading_of(seed.velocity),
            FRAC_PI_4 + ctx.rng.gen::<f32>() * FRAC_PI_2,
            base_speed,
        ),
        Some(breaker) => (
            heading_of(breaker),
            FRAC_PI_3 + ctx.rng.gen::<f32>() * FRAC_PI_3,
            base_speed * factor,
        ),
    };
    let other_spread = match seed.broken {
        None => FRAC_PI_4 + ctx.rng.gen::<f32>() * FRAC_PI_2,
        Some(_) => FRAC_PI_3 + ctx.rng.gen::<f32>() * FRAC_PI_3,
    };

    let tier = seed.tier - 1;
    let right = Motion::moving(seed.position, heading_vector(heading - spread) * speed);
    let left = Motion::moving(seed.position, heading_vector(heading + other_spread) * speed);
    debug!(parent = %seed.parent, tier = seed.tier, "asteroid split");
    let children = [
        spawn_asteroid(ctx, tier, right, seed.broken),
        spawn_asteroid(ctx, tier, left, seed.broken),
    ];
    for child in children {
        if let Some(state) = ctx.registry.asteroid_mut(child) {
            state.parent = Some(seed.parent);
        }
    }
    children
}
