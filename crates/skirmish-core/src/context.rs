//! Explicit simulation context.
//!
//! [`SimContext`] bundles everything a rule may touch: configuration, the
//! registry, the roster, the spawners, the event queue, the random source
//! and the client hooks. It is passed by `&mut` to every phase of the tick;
//! nothing in the crate reaches for global state.
//!
//! The helpers here are the lifecycle funnels shared by all rule modules.
//! [`SimContext::kill_ship`] in particular is the only way a ship dies, so
//! scoring and client notification happen exactly once per death.

use std::fmt;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::actor::components::DroneState;
use crate::actor::{Actor, ActorId, ActorInner, ActorTag, Motion, ShipState};
use crate::collision::{self, Body, Precision, Wrap};
use crate::config::GameConfig;
use crate::geometry::{self, Torus};
use crate::hooks::ClientHooks;
use crate::registry::Registry;
use crate::resolver::bomb;
use crate::roster::{KillCause, PlayerId, Roster};
use crate::schedule::{EventQueue, Millis, TimedEvent};
use crate::snapshot::ServerMessage;
use crate::spawner::asteroid::{AsteroidSpawner, SplitSeed};
use crate::spawner::placement;
use crate::spawner::powerup::PowerUpSpawner;

/// Everything the rules operate on.
pub struct SimContext {
    pub(crate) config: GameConfig,
    pub(crate) torus: Torus,
    pub(crate) now: Millis,
    pub(crate) registry: Registry,
    pub(crate) roster: Roster,
    pub(crate) schedule: EventQueue,
    pub(crate) power_ups: PowerUpSpawner,
    pub(crate) asteroids: AsteroidSpawner,
    pub(crate) pending_splits: Vec<SplitSeed>,
    pub(crate) rng: ChaCha8Rng,
    pub(crate) hooks: Box<dyn ClientHooks>,
    pub(crate) outbox: Vec<ServerMessage>,
}

impl fmt::Debug for SimContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimContext")
            .field("now", &self.now)
            .field("actors", &self.registry.len())
            .field("players", &self.roster.len())
            .field("pending_events", &self.schedule.len())
            .finish_non_exhaustive()
    }
}

impl SimContext {
    /// Creates a context. The configuration is assumed to be validated.
    #[must_use]
    pub fn new(config: GameConfig, seed: u64, hooks: Box<dyn ClientHooks>) -> Self {
        Self {
            torus: Torus::from_config(&config.arena),
            power_ups: PowerUpSpawner::new(&config.power_ups),
            asteroids: AsteroidSpawner::new(),
            config,
            now: 0,
            registry: Registry::new(),
            roster: Roster::new(),
            schedule: EventQueue::new(),
            pending_splits: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            hooks,
            outbox: Vec::new(),
        }
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Arena geometry.
    #[must_use]
    pub const fn torus(&self) -> &Torus {
        &self.torus
    }

    /// Current simulation time.
    #[must_use]
    pub const fn now(&self) -> Millis {
        self.now
    }

    /// Every actor.
    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Every player.
    #[must_use]
    pub const fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Pending deferred work.
    #[must_use]
    pub const fn schedule(&self) -> &EventQueue {
        &self.schedule
    }

    /// Power-up pacing state.
    #[must_use]
    pub const fn power_ups(&self) -> &PowerUpSpawner {
        &self.power_ups
    }

    /// Number of connected players.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.roster.len()
    }

    pub(crate) fn emit(&mut self, message: ServerMessage) {
        self.outbox.push(message);
    }

    // =========================================================================
    // Collision queries
    // =========================================================================

    /// Whether an actor takes part in collisions. Drones additionally need
    /// their owner's ship to be alive.
    #[must_use]
    pub fn is_active(&self, id: ActorId) -> bool {
        match self.registry.live(id) {
            Some(actor) => actor
                .as_drone()
                .map_or(true, |drone| self.registry.is_alive(drone.ship)),
            None => false,
        }
    }

    fn radius_of(&self, actor: &Actor) -> f32 {
        let combat = &self.config.combat;
        match &actor.inner {
            ActorInner::Ship(_) => combat.ship_radius,
            ActorInner::Asteroid(a) => self.config.asteroids.radius_of(a.tier),
            ActorInner::Bullet(_) => combat.bullet_radius,
            ActorInner::Missile(_) => combat.missile_radius,
            ActorInner::Bomb(_) => combat.bomb_radius,
            ActorInner::Drone(_) => combat.drone_radius,
            ActorInner::PowerUp(_) => combat.power_up_radius,
        }
    }

    fn body_of<'a>(&self, actor: &'a Actor) -> Body<'a> {
        let radius = self.radius_of(actor);
        let hull = match &actor.inner {
            ActorInner::Ship(ship) => Some(&ship.hull),
            ActorInner::Asteroid(asteroid) => Some(&asteroid.hull),
            _ => None,
        };
        Body {
            center: actor.position(),
            radius,
            hull,
        }
    }

    /// Whether two active actors touch. The first is the probing side: it is
    /// followed across the wrap unless it is a big asteroid.
    #[must_use]
    pub fn touching(&self, probe: ActorId, target: ActorId) -> bool {
        if probe == target || !self.is_active(probe) || !self.is_active(target) {
            return false;
        }
        let (Some(a), Some(b)) = (self.registry.get(probe), self.registry.get(target)) else {
            return false;
        };
        let wrap = if a.as_asteroid().is_some_and(|s| s.is_big()) {
            Wrap::None
        } else {
            Wrap::Toroidal
        };
        collision::collides(
            &self.torus,
            &self.body_of(a),
            &self.body_of(b),
            wrap,
            Precision::Exact,
        )
    }

    /// Whether a projectile touches a ship's shield ring. Circle-only and
    /// without wrap.
    #[must_use]
    pub fn touching_shield(&self, ship: ActorId, projectile: ActorId) -> bool {
        if !self.is_active(ship) || !self.is_active(projectile) {
            return false;
        }
        let (Some(s), Some(p)) = (self.registry.get(ship), self.registry.get(projectile)) else {
            return false;
        };
        let ring = Body::circle(s.position(), self.config.combat.shield_radius);
        let shot = Body::circle(p.position(), self.radius_of(p));
        collision::collides(&self.torus, &ring, &shot, Wrap::None, Precision::CircleOnly)
    }

    /// Whether a live actor lies within a blast circle.
    #[must_use]
    pub fn in_blast(&self, center: Vec2, range: f32, target: ActorId) -> bool {
        let Some(actor) = self.registry.live(target) else {
            return false;
        };
        collision::collides(
            &self.torus,
            &Body::circle(center, range),
            &self.body_of(actor),
            Wrap::Toroidal,
            Precision::Exact,
        )
    }

    // =========================================================================
    // Lifecycle funnels
    // =========================================================================

    /// Kills a ship. Returns `false` if it was already dead.
    ///
    /// Books the death in the roster, removes the escort drone, schedules the
    /// respawn and then notifies the hooks.
    pub fn kill_ship(&mut self, ship: ActorId, cause: KillCause) -> bool {
        let Some(state) = self.registry.ship_mut(ship) else {
            return false;
        };
        state.hp = 0.0;
        let victim = state.player;
        let drone = state.drone.take();
        self.registry.destroy(ship);
        if let Some(drone) = drone {
            self.destroy_drone(drone);
        }
        if let Some(record) = self.roster.get_mut(victim) {
            if record.ship == Some(ship) {
                record.ship = None;
            }
        }
        let delta = self
            .roster
            .record_death(victim, &cause, &self.config.scoring);
        self.schedule.schedule(
            self.now + self.config.ship.respawn_delay_ms,
            TimedEvent::Respawn(victim),
        );
        debug!(%victim, ?cause, "ship destroyed");

        match cause {
            KillCause::Asteroid => self.hooks.kill_by_asteroid(victim),
            KillCause::Player(killer) => self.hooks.kill_by_player(victim, killer),
            KillCause::Projectile { shooter, weapon } => {
                self.hooks.kill_by_projectile(victim, shooter, weapon);
            }
            KillCause::Bomb(bomber) => self.hooks.kill_by_bomb(victim, bomber),
        }
        if let Some((player, points)) = delta {
            self.hooks.add_score(player, points);
        }
        true
    }

    /// Awards points outside of a kill, e.g. for a drone finishing an
    /// asteroid.
    pub fn award(&mut self, player: PlayerId, points: i64) {
        if self.roster.add_score(player, points) {
            self.hooks.add_score(player, points);
        }
    }

    /// Destroys an asteroid, zeroing its hp and queueing its split.
    pub fn destroy_asteroid(&mut self, id: ActorId) -> bool {
        let Some(actor) = self.registry.live_mut(id) else {
            return false;
        };
        let (position, velocity) = (actor.position(), actor.velocity());
        let Some(state) = actor.as_asteroid_mut() else {
            return false;
        };
        state.hp = 0.0;
        if state.splits() {
            self.pending_splits.push(SplitSeed {
                parent: id,
                tier: state.tier,
                position,
                velocity,
                broken: state.broken,
            });
        }
        self.registry.destroy(id)
    }

    /// Removes hp from an asteroid. Returns `true` if that destroyed it.
    pub fn damage_asteroid(&mut self, id: ActorId, amount: f32) -> bool {
        let Some(state) = self.registry.asteroid_mut(id) else {
            return false;
        };
        state.hp -= amount;
        if state.hp <= 0.0 {
            self.destroy_asteroid(id)
        } else {
            false
        }
    }

    /// Destroys a drone and unhooks it from its ship.
    pub fn destroy_drone(&mut self, id: ActorId) -> bool {
        if !self.registry.destroy(id) {
            return false;
        }
        let Some(drone) = self.registry.get(id).and_then(Actor::as_drone).copied() else {
            return true;
        };
        if let Some(expiry) = drone.expiry {
            self.schedule.cancel(expiry);
        }
        if let Some(ship) = self.registry.get_mut(drone.ship).and_then(Actor::as_ship_mut) {
            if ship.drone == Some(id) {
                ship.drone = None;
            }
        }
        true
    }

    /// Destroys a power-up without applying it, freeing its spawner slot.
    pub fn remove_power_up(&mut self, id: ActorId) -> bool {
        let Some(kind) = self.registry.live(id).and_then(Actor::as_power_up).map(|p| p.kind)
        else {
            return false;
        };
        self.registry.destroy(id);
        self.power_ups.release(kind);
        true
    }

    /// Handles the end of an actor's lifetime.
    pub fn expire(&mut self, id: ActorId) {
        match self.registry.live(id).map(Actor::tag) {
            Some(ActorTag::Bomb) => bomb::detonate(self, id),
            Some(ActorTag::Drone) => {
                self.destroy_drone(id);
            }
            Some(ActorTag::PowerUp) => {
                self.remove_power_up(id);
            }
            Some(_) => {
                self.registry.destroy(id);
            }
            None => {}
        }
    }

    // =========================================================================
    // Spawning
    // =========================================================================

    /// Places a fresh ship for `player`. Returns `None` if the player is gone
    /// or already flying.
    pub fn spawn_ship(&mut self, player: PlayerId) -> Option<ActorId> {
        let current = self.roster.get(player)?.ship;
        if current.is_some_and(|id| self.registry.is_alive(id)) {
            return None;
        }
        let radius = self.config.combat.ship_radius;
        let position = placement::interior(
            &self.registry,
            &self.config,
            &mut self.rng,
            radius,
            self.config.power_ups.placement_tries,
        );
        let heading = geometry::wrap_angle(self.rng.gen::<f32>() * std::f32::consts::TAU);
        let state = ShipState::new(
            player,
            heading,
            self.config.ship.max_hp,
            self.config.ship.spawn_guard_ticks,
            radius,
        );
        let id = self
            .registry
            .spawn(Motion::at(position), self.now, ActorInner::Ship(state));
        if let Some(record) = self.roster.get_mut(player) {
            record.ship = Some(id);
        }
        debug!(%player, ship = %id, "ship spawned");
        Some(id)
    }

    /// Brings a dead player's ship back.
    pub fn respawn(&mut self, player: PlayerId) {
        self.spawn_ship(player);
    }

    /// Gives a ship a fresh level-1 drone.
    pub fn spawn_drone(&mut self, ship: ActorId) -> Option<ActorId> {
        let (owner, position) = {
            let actor = self.registry.live(ship)?;
            (actor.as_ship()?.player, actor.position())
        };
        let orbit = self.rng.gen::<f32>() * std::f32::consts::TAU;
        let offset = geometry::heading_vector(orbit) * self.config.combat.drone_orbit_radius;
        let id = self.registry.spawn(
            Motion::at(position + offset),
            self.now,
            ActorInner::Drone(DroneState {
                owner,
                ship,
                level: 1,
                init_time: self.now,
                orbit,
                expiry: None,
            }),
        );
        self.arm_drone_expiry(id);
        if let Some(state) = self.registry.ship_mut(ship) {
            state.drone = Some(id);
        }
        debug!(%owner, drone = %id, "drone launched");
        Some(id)
    }

    /// (Re)schedules a drone's expiry from `now`, cancelling the previous one.
    pub(crate) fn arm_drone_expiry(&mut self, id: ActorId) {
        let due = self.now + self.config.combat.drone_lifetime_ms;
        let Some(previous) = self
            .registry
            .live(id)
            .and_then(Actor::as_drone)
            .map(|d| d.expiry)
        else {
            return;
        };
        if let Some(previous) = previous {
            self.schedule.cancel(previous);
        }
        let event = self.schedule.schedule(due, TimedEvent::Expire(id));
        if let Some(drone) = self.registry.live_mut(id).and_then(Actor::as_drone_mut) {
            drone.init_time = self.now;
            drone.expiry = Some(event);
        }
    }

    /// Wipes every non-ship actor and all deferred actor work.
    pub(crate) fn clear_arena(&mut self) -> usize {
        let destroyed = self.registry.destroy_all_but_ships();
        for actor in self.registry.ids(ActorTag::Ship) {
            if let Some(ship) = self.registry.ship_mut(actor) {
                ship.drone = None;
                ship.launched_bomb = None;
            }
        }
        self.schedule.cancel_where(|event| {
            matches!(event, TimedEvent::BombPulse(_) | TimedEvent::Expire(_))
        });
        self.pending_splits.clear();
        destroyed
    }
}
