//! The authoritative tick driver.
//!
//! [`World`] owns the [`SimContext`], the [`RoundManager`] and the
//! [`CombatResolver`], and is the only thing that advances the simulation.
//! The transport layer feeds it player intents, calls [`World::tick`] on a
//! fixed interval and reads back [`WorldSnapshot`]s and [`ServerMessage`]s.
//!
//! # Tick order
//!
//! 1. Clamp the clock delta and start the first round if needed.
//! 2. Run every due timed event (round timers, bomb pulses, expiries,
//!    respawns). Events scheduled while draining that are already due run in
//!    the same drain.
//! 3. Publish the remaining round time if the broadcast period has passed.
//! 4. During the intermission: move ships, purge and stop here.
//! 5. Move everything, spawn power-ups, resolve ships, asteroids and drones.
//! 6. Floor scores at zero and purge destroyed actors.
//!
//! # Determinism
//!
//! Given the same configuration, seed, joins, intents and tick times, two
//! worlds produce identical snapshots: actors live in a `BTreeMap`, every
//! pass iterates ids in spawn order and all randomness comes from one seeded
//! `ChaCha8Rng`.
//!
//! # Example
//!
//! ```
//! use skirmish_core::config::GameConfig;
//! use skirmish_core::movement::InputFlags;
//! use skirmish_core::world::World;
//!
//! let mut world = World::new(GameConfig::default(), 42).unwrap();
//! let ann = world.join("ann").unwrap();
//! world.set_input(ann, InputFlags::FORWARD | InputFlags::FIRE);
//!
//! for step in 0..20 {
//!     world.tick(step * 50);
//! }
//!
//! let snapshot = world.snapshot();
//! assert!(snapshot.round_go);
//! assert_eq!(snapshot.players.len(), 1);
//! ```

use std::fmt;

use tracing::{info, trace, warn};

use crate::actor::ActorTag;
use crate::config::GameConfig;
use crate::context::SimContext;
use crate::error::{ConfigError, JoinError};
use crate::hooks::{ClientHooks, NoopHooks};
use crate::movement::{self, InputFlags};
use crate::registry::Registry;
use crate::resolver::{bomb, CombatResolver, Resolver};
use crate::roster::{PlayerId, Roster};
use crate::round::RoundManager;
use crate::schedule::{Millis, TimedEvent};
use crate::snapshot::{ActorView, PlayerView, ServerMessage, WorldSnapshot};
use crate::spawner::powerup;

/// The simulation.
pub struct World {
    ctx: SimContext,
    round: RoundManager,
    combat: CombatResolver,
    last_tick: Option<Millis>,
    ticks: u64,
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("ctx", &self.ctx)
            .field("round", &self.round.round_id())
            .field("phase", &self.round.phase())
            .field("combat", &self.combat)
            .field("ticks", &self.ticks)
            .finish()
    }
}

impl World {
    /// Creates a world whose collaborator ignores every notification.
    ///
    /// # Errors
    ///
    /// Returns the first configuration constraint `config` violates.
    pub fn new(config: GameConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_hooks(config, seed, Box::new(NoopHooks))
    }

    /// Creates a world that reports scores and kills to `hooks`.
    ///
    /// # Errors
    ///
    /// Returns the first configuration constraint `config` violates.
    pub fn with_hooks(
        config: GameConfig,
        seed: u64,
        hooks: Box<dyn ClientHooks>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            ctx: SimContext::new(config, seed, hooks),
            round: RoundManager::new(),
            combat: CombatResolver::new(),
            last_tick: None,
            ticks: 0,
        })
    }

    // =========================================================================
    // Players
    // =========================================================================

    /// Adds a player and gives them a ship.
    ///
    /// # Errors
    ///
    /// [`JoinError::ArenaFull`] when `max_players` are connected,
    /// [`JoinError::EmptyName`] for a blank name.
    pub fn join(&mut self, name: &str) -> Result<PlayerId, JoinError> {
        let max_players = self.ctx.config.arena.max_players;
        let player = self.ctx.roster.join(name, max_players)?;
        self.ctx.spawn_ship(player);
        info!(%player, name = name.trim(), "player joined");
        Ok(player)
    }

    /// Removes a player together with their ship and drone. Nobody is
    /// credited for the ship.
    pub fn leave(&mut self, player: PlayerId) -> bool {
        let Some(record) = self.ctx.roster.leave(player) else {
            return false;
        };
        if let Some(ship) = record.ship {
            let drone = self.ctx.registry.ship(ship).and_then(|s| s.drone);
            if let Some(drone) = drone {
                self.ctx.destroy_drone(drone);
            }
            self.ctx.registry.destroy(ship);
        }
        self.ctx
            .schedule
            .cancel_where(|event| *event == TimedEvent::Respawn(player));
        info!(%player, "player left");
        true
    }

    /// Replaces a player's intent. Returns `false` for unknown players.
    pub fn set_input(&mut self, player: PlayerId, input: InputFlags) -> bool {
        match self.ctx.roster.get_mut(player) {
            Some(record) => {
                record.input = input;
                true
            }
            None => false,
        }
    }

    // =========================================================================
    // Tick
    // =========================================================================

    /// Advances the simulation to `now`.
    ///
    /// The clock never runs backwards; an earlier `now` is treated as a
    /// zero-length tick.
    pub fn tick(&mut self, now: Millis) {
        let now = now.max(self.ctx.now);
        let delta = self.last_tick.map_or(0, |last| now - last);
        let max_delta = self.ctx.config.arena.max_delta_ms;
        let dt = if delta > max_delta {
            warn!(delta, max_delta, "tick delta capped");
            max_delta
        } else {
            delta
        };
        self.ctx.now = now;
        self.last_tick = Some(now);
        self.ticks += 1;

        if self.round.round_id() == 0 {
            self.round.start(&mut self.ctx);
        }
        self.run_due_events();
        self.round.broadcast_time(&mut self.ctx);

        if !self.round.is_active() {
            movement::advance(&mut self.ctx, dt, false);
            self.ctx.registry.purge();
            return;
        }

        movement::advance(&mut self.ctx, dt, true);
        powerup::update(&mut self.ctx);
        self.combat.resolve(&mut self.ctx);
        self.ctx.roster.floor_scores();
        let purged = self.ctx.registry.purge();
        trace!(tick = self.ticks, now, purged, "tick");
    }

    fn run_due_events(&mut self) {
        while let Some(due) = self.ctx.schedule.pop_due(self.ctx.now) {
            match due.event {
                TimedEvent::EndRound => self.round.end(&mut self.ctx),
                TimedEvent::StartRound => self.round.start(&mut self.ctx),
                TimedEvent::BombPulse(blast) => bomb::run_pulse(&mut self.ctx, blast, due.due),
                TimedEvent::Expire(actor) => self.ctx.expire(actor),
                TimedEvent::Respawn(player) => self.ctx.respawn(player),
            }
        }
    }

    // =========================================================================
    // Output
    // =========================================================================

    /// The current outward state.
    #[must_use]
    pub fn snapshot(&self) -> WorldSnapshot {
        let ctx = &self.ctx;
        let arena = &ctx.config.arena;
        let active = self.round.is_active();
        WorldSnapshot {
            now: ctx.now,
            size: (arena.width, arena.height),
            max_players: arena.max_players,
            players: ctx
                .roster
                .iter()
                .map(|record| {
                    let view = PlayerView {
                        name: record.name.clone(),
                        score: record.stats.score,
                        color: record.color,
                    };
                    (record.id, view)
                })
                .collect(),
            round_id: self.round.round_id(),
            round_go: active,
            time_left_ms: self.round.time_left(ctx.now),
            round_stats: if active {
                None
            } else {
                self.round.stats().map(<[_]>::to_vec)
            },
            actors: ctx.registry.live_actors().map(ActorView::of).collect(),
        }
    }

    /// Takes every message published since the last call.
    pub fn drain_messages(&mut self) -> Vec<ServerMessage> {
        std::mem::take(&mut self.ctx.outbox)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Simulation time of the last tick.
    #[must_use]
    pub const fn now(&self) -> Millis {
        self.ctx.now
    }

    /// Ticks run so far.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.ctx.config
    }

    /// The round state machine.
    #[must_use]
    pub const fn round(&self) -> &RoundManager {
        &self.round
    }

    /// Every actor.
    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.ctx.registry
    }

    /// Every player.
    #[must_use]
    pub const fn roster(&self) -> &Roster {
        &self.ctx.roster
    }

    /// The full simulation context.
    #[must_use]
    pub const fn context(&self) -> &SimContext {
        &self.ctx
    }

    /// Mutable access to the context, for scripted scenarios.
    pub fn context_mut(&mut self) -> &mut SimContext {
        &mut self.ctx
    }

    /// Live actors of one kind.
    #[must_use]
    pub fn count(&self, tag: ActorTag) -> usize {
        self.ctx.registry.count(tag)
    }
}
