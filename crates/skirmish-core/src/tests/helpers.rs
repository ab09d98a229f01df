//! Test helper functions for setting up contexts, worlds and actors.
//!
//! Actors placed by these helpers bypass random placement and spawn
//! protection so a test can put things exactly where it wants them.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;

use crate::actor::components::ShipState;
use crate::actor::{ActorId, ActorInner, Motion};
use crate::config::GameConfig;
use crate::context::SimContext;
use crate::hooks::{ClientHooks, Weapon};
use crate::movement::InputFlags;
use crate::roster::PlayerId;
use crate::schedule::Millis;
use crate::spawner::asteroid::spawn_asteroid;
use crate::world::World;

/// Seed used by every helper.
pub const TEST_SEED: u64 = 0x5eed;

/// Tick interval of the default configuration.
pub const TICK_MS: Millis = 50;

// =============================================================================
// Context Setup
// =============================================================================

/// A context with the default configuration.
pub fn context(hooks: Box<dyn ClientHooks>) -> SimContext {
    SimContext::new(GameConfig::default(), TEST_SEED, hooks)
}

/// Places an unguarded ship facing up at `position` and hands it to `player`.
pub fn place_ship(ctx: &mut SimContext, player: PlayerId, position: Vec2) -> ActorId {
    let state = ShipState::new(
        player,
        0.0,
        ctx.config.ship.max_hp,
        0,
        ctx.config.combat.ship_radius,
    );
    let id = ctx
        .registry
        .spawn(Motion::at(position), ctx.now, ActorInner::Ship(state));
    if let Some(record) = ctx.roster.get_mut(player) {
        record.ship = Some(id);
    }
    id
}

/// Places an asteroid of `tier` with the configured hit points.
pub fn place_asteroid(ctx: &mut SimContext, tier: u8, position: Vec2, velocity: Vec2) -> ActorId {
    spawn_asteroid(ctx, tier, Motion::moving(position, velocity), None)
}

// =============================================================================
// World Setup
// =============================================================================

/// A world with the default configuration.
pub fn world() -> World {
    World::new(GameConfig::default(), TEST_SEED).unwrap()
}

/// A world with `names` joined and the first round started.
pub fn world_with(names: &[&str]) -> (World, Vec<PlayerId>) {
    let mut world = world();
    let players = names.iter().map(|name| world.join(name).unwrap()).collect();
    world.tick(0);
    (world, players)
}

/// Ticks `world` at the default rate until `until`. Returns the time of the
/// next tick.
pub fn run_until(world: &mut World, from: Millis, until: Millis) -> Millis {
    let mut now = from;
    while now <= until {
        world.tick(now);
        now += TICK_MS;
    }
    now
}

/// A repeating input script: player `i` uses `pattern[(tick + i) % len]`.
pub fn scripted_input(tick: u64, player: usize, pattern: &[InputFlags]) -> InputFlags {
    let len = pattern.len() as u64;
    #[allow(clippy::cast_possible_truncation)]
    let index = ((tick + player as u64) % len) as usize;
    pattern[index]
}

// =============================================================================
// Hook Recording
// =============================================================================

/// One notification received by [`RecordingHooks`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookCall {
    AddScore { player: PlayerId, points: i64 },
    KillByAsteroid { victim: PlayerId },
    KillByPlayer { victim: PlayerId, killer: PlayerId },
    KillByProjectile { victim: PlayerId, shooter: PlayerId, weapon: Weapon },
    KillByBomb { victim: PlayerId, bomber: PlayerId },
}

/// Hooks that log every call into a shared list.
#[derive(Debug, Clone)]
pub struct RecordingHooks {
    calls: Rc<RefCell<Vec<HookCall>>>,
}

impl RecordingHooks {
    /// The hooks and a handle on their call log.
    pub fn new() -> (Self, Rc<RefCell<Vec<HookCall>>>) {
        let calls = Rc::new(RefCell::new(Vec::new()));
        (
            Self {
                calls: Rc::clone(&calls),
            },
            calls,
        )
    }

    fn push(&self, call: HookCall) {
        self.calls.borrow_mut().push(call);
    }
}

impl ClientHooks for RecordingHooks {
    fn add_score(&mut self, player: PlayerId, points: i64) {
        self.push(HookCall::AddScore { player, points });
    }

    fn kill_by_asteroid(&mut self, victim: PlayerId) {
        self.push(HookCall::KillByAsteroid { victim });
    }

    fn kill_by_player(&mut self, victim: PlayerId, killer: PlayerId) {
        self.push(HookCall::KillByPlayer { victim, killer });
    }

    fn kill_by_projectile(&mut self, victim: PlayerId, shooter: PlayerId, weapon: Weapon) {
        self.push(HookCall::KillByProjectile {
            victim,
            shooter,
            weapon,
        });
    }

    fn kill_by_bomb(&mut self, victim: PlayerId, bomber: PlayerId) {
        self.push(HookCall::KillByBomb { victim, bomber });
    }
}
