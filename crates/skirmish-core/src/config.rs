//! Game tunables.
//!
//! [`GameConfig::default()`] reproduces the classic arena: a 480×480 field,
//! five players, three-minute rounds with a fifteen second intermission and
//! the power-up pacing table below. Every table indexed by player count is
//! clamped to its last entry, so short tables are legal.
//!
//! Rule-table numbers (damage per hit, heal amounts) live next to the rules
//! in [`crate::resolver`]; this module only carries pacing, sizes, motion and
//! scoring, which operators are expected to tweak.
//!
//! # Example
//!
//! ```
//! use skirmish_core::config::GameConfig;
//!
//! let config = GameConfig::from_json_str(r#"{ "arena": { "width": 640.0 } }"#).unwrap();
//! assert_eq!(config.arena.width, 640.0);
//! assert_eq!(config.arena.height, 480.0);
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::actor::PowerUpKind;
use crate::error::ConfigError;
use crate::roster::PALETTE_SIZE;
use crate::schedule::Millis;

/// Full set of simulation tunables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Arena geometry and tick pacing.
    pub arena: ArenaConfig,
    /// Round lifecycle timings.
    pub round: RoundConfig,
    /// Power-up slots and pacing.
    pub power_ups: PowerUpConfig,
    /// Asteroid population, pacing and splitting.
    pub asteroids: AsteroidConfig,
    /// Collision radii, bombs and drones.
    pub combat: CombatConfig,
    /// Ship handling and projectile launch parameters.
    pub ship: ShipConfig,
    /// Points awarded and deducted on kills.
    pub scoring: ScoringConfig,
}

impl GameConfig {
    /// Parses a (possibly partial) JSON document and validates the result.
    ///
    /// Missing sections and fields fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and any validation
    /// error from [`GameConfig::validate`].
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the configuration can drive a simulation.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let arena = &self.arena;
        let valid_extent = |v: f32| v.is_finite() && v > 0.0;
        if !valid_extent(arena.width) || !valid_extent(arena.height) {
            return Err(ConfigError::ArenaSize {
                width: arena.width,
                height: arena.height,
            });
        }
        if arena.tick_rate_hz == 0 {
            return Err(ConfigError::TickRate);
        }
        if arena.max_players == 0 || arena.max_players > PALETTE_SIZE {
            return Err(ConfigError::MaxPlayers {
                max_players: arena.max_players,
                palette: PALETTE_SIZE,
            });
        }
        if self.power_ups.time_multipliers.is_empty() {
            return Err(ConfigError::EmptyTable("power_ups.time_multipliers"));
        }
        if self.power_ups.slots.is_empty() {
            return Err(ConfigError::EmptyTable("power_ups.slots"));
        }
        let mut seen = BTreeSet::new();
        for slot in &self.power_ups.slots {
            if !seen.insert(slot.kind) {
                return Err(ConfigError::DuplicateSlot(slot.kind));
            }
        }
        if self.asteroids.max_population.is_empty() {
            return Err(ConfigError::EmptyTable("asteroids.max_population"));
        }
        for (name, table, required) in [
            ("hp", &self.asteroids.hp, 6),
            ("drift_speed", &self.asteroids.drift_speed, 6),
            ("split_speed", &self.asteroids.split_speed, 4),
            ("radius", &self.asteroids.radius, 6),
        ] {
            if table.len() < required {
                return Err(ConfigError::AsteroidTable {
                    name,
                    required,
                    got: table.len(),
                });
            }
        }
        if self.combat.bomb_pulses == 0 {
            return Err(ConfigError::BombPulses);
        }
        Ok(())
    }

    /// Milliseconds between two simulation ticks.
    #[must_use]
    pub fn tick_interval_ms(&self) -> Millis {
        (1000 / u64::from(self.arena.tick_rate_hz.max(1))).max(1)
    }
}

/// Looks up a player-count-indexed table, clamping to the last entry.
pub(crate) fn by_player_count<T: Copy>(table: &[T], player_count: usize, fallback: T) -> T {
    table
        .get(player_count)
        .or_else(|| table.last())
        .copied()
        .unwrap_or(fallback)
}

/// Arena geometry and tick pacing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Visible arena width.
    pub width: f32,
    /// Visible arena height.
    pub height: f32,
    /// Distance past each edge before an actor is physically wrapped.
    pub wrap_margin: f32,
    /// Concurrent player cap.
    pub max_players: usize,
    /// Simulation ticks per second.
    pub tick_rate_hz: u32,
    /// Largest clock delta fed into kinematics in one tick.
    pub max_delta_ms: Millis,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: 480.0,
            height: 480.0,
            wrap_margin: 16.0,
            max_players: 5,
            tick_rate_hz: 20,
            max_delta_ms: 100,
        }
    }
}

/// Round lifecycle timings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundConfig {
    /// Length of the active phase.
    pub duration_ms: Millis,
    /// Length of the intermission.
    pub wait_ms: Millis,
    /// Period of the remaining-time broadcast while active.
    pub time_broadcast_ms: Millis,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            duration_ms: 180_000,
            wait_ms: 15_000,
            time_broadcast_ms: 15_000,
        }
    }
}

/// Pacing of a single power-up kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlotTuning {
    /// The kind this slot spawns.
    pub kind: PowerUpKind,
    /// Per-kind cap on concurrently live instances.
    pub max: u32,
    /// Base wait between spawns, in seconds.
    pub wait_secs: f32,
    /// Uniform jitter added to the wait, in seconds.
    pub jitter_secs: f32,
}

impl SlotTuning {
    const fn new(kind: PowerUpKind, max: u32, wait_secs: f32, jitter_secs: f32) -> Self {
        Self {
            kind,
            max,
            wait_secs,
            jitter_secs,
        }
    }
}

/// Power-up slots and pacing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerUpConfig {
    /// Global cap on concurrently live power-ups (life excluded).
    pub max_concurrent: u32,
    /// Spawn order and pacing per kind.
    pub slots: Vec<SlotTuning>,
    /// Wait multiplier indexed by player count.
    pub time_multipliers: Vec<f32>,
    /// Rejection-sampling attempts when placing a power-up.
    pub placement_tries: u32,
}

impl Default for PowerUpConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 3,
            slots: vec![
                SlotTuning::new(PowerUpKind::Shield, 2, 23.0, 10.0),
                SlotTuning::new(PowerUpKind::Armor, 1, 30.0, 20.0),
                SlotTuning::new(PowerUpKind::Missile, 2, 16.0, 15.0),
                SlotTuning::new(PowerUpKind::Life, 2, 8.0, 8.0),
                SlotTuning::new(PowerUpKind::Boost, 1, 26.0, 15.0),
                SlotTuning::new(PowerUpKind::Defense, 2, 30.0, 30.0),
                SlotTuning::new(PowerUpKind::Bomb, 1, 65.0, 35.0),
                SlotTuning::new(PowerUpKind::Camu, 1, 40.0, 20.0),
            ],
            time_multipliers: vec![2.0, 1.35, 1.12, 1.0, 1.0, 0.9, 0.8],
            placement_tries: 25,
        }
    }
}

/// Asteroid population, pacing and splitting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AsteroidConfig {
    /// Population ceiling indexed by player count.
    pub max_population: Vec<usize>,
    /// Upper bound of the delay before the first regular asteroid.
    pub first_delay_ms: Millis,
    /// Upper bound of the delay between regular asteroids.
    pub spawn_jitter_ms: Millis,
    /// Fixed part of the delay before the first big asteroid.
    pub big_first_delay_ms: Millis,
    /// Random part of the delay before the first big asteroid.
    pub big_first_jitter_ms: Millis,
    /// Fixed part of the delay between big asteroid attempts.
    pub big_interval_ms: Millis,
    /// Random part of the delay between big asteroid attempts.
    pub big_jitter_ms: Millis,
    /// Hit points indexed by asteroid type (index 0 unused).
    pub hp: Vec<f32>,
    /// Initial drift speed indexed by asteroid type, units per second.
    pub drift_speed: Vec<f32>,
    /// Child speed indexed by parent type, units per second.
    pub split_speed: Vec<f32>,
    /// Speed factor applied to children of an asteroid broken by an actor.
    pub broken_speed_factor: f32,
    /// Body radius indexed by asteroid type.
    pub radius: Vec<f32>,
    /// Two children of the same split pass through each other this long.
    pub split_grace_ms: Millis,
    /// Rejection-sampling attempts for interior placement of regular asteroids.
    pub placement_tries: u32,
    /// Rejection-sampling attempts for edge placement of big asteroids.
    pub edge_placement_tries: u32,
    /// Vertex count of generated asteroid hulls.
    pub hull_vertices: usize,
}

impl Default for AsteroidConfig {
    fn default() -> Self {
        Self {
            max_population: vec![8, 7, 7, 6, 6, 5, 4],
            first_delay_ms: 5_000,
            spawn_jitter_ms: 10_000,
            big_first_delay_ms: 40_000,
            big_first_jitter_ms: 60_000,
            big_interval_ms: 70_000,
            big_jitter_ms: 70_000,
            hp: vec![0.0, 5.0, 10.0, 15.0, 250.0, 400.0],
            drift_speed: vec![0.0, 36.0, 28.0, 22.0, 12.0, 9.0],
            split_speed: vec![0.0, 0.0, 33.0, 51.0],
            broken_speed_factor: 1.125,
            radius: vec![0.0, 10.0, 16.0, 22.0, 165.0, 165.0],
            split_grace_ms: 750,
            placement_tries: 25,
            edge_placement_tries: 15,
            hull_vertices: 9,
        }
    }
}

impl AsteroidConfig {
    /// Body radius of an asteroid of `tier`. Unknown tiers get the largest
    /// radius in the table.
    #[must_use]
    pub fn radius_of(&self, tier: u8) -> f32 {
        self.radius
            .get(usize::from(tier))
            .or_else(|| self.radius.last())
            .copied()
            .unwrap_or(0.0)
    }
}

/// Collision radii, bombs and drones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Ship body radius.
    pub ship_radius: f32,
    /// Shield ring radius.
    pub shield_radius: f32,
    /// Power-up radius.
    pub power_up_radius: f32,
    /// Bullet radius.
    pub bullet_radius: f32,
    /// Missile radius.
    pub missile_radius: f32,
    /// Drone radius.
    pub drone_radius: f32,
    /// Bomb body radius.
    pub bomb_radius: f32,
    /// Blast radius of a detonating bomb.
    pub bomb_range: f32,
    /// Number of blast evaluations per detonation.
    pub bomb_pulses: u32,
    /// Spacing between blast evaluations.
    pub bomb_pulse_interval_ms: Millis,
    /// A launched bomb detonates on its own after this long.
    pub bomb_fuse_ms: Millis,
    /// Bullets hitting their own shooter are ignored this long after launch.
    pub self_hit_grace_ms: Millis,
    /// Shots hitting their own shooter's shield are ignored this long.
    pub shield_self_hit_grace_ms: Millis,
    /// Highest drone level.
    pub drone_max_level: u32,
    /// A drone disappears this long after its last (re)initialisation.
    pub drone_lifetime_ms: Millis,
    /// Orbit distance from the owning ship.
    pub drone_orbit_radius: f32,
    /// Orbit angular speed per drone level, radians per second.
    pub drone_orbit_speed: f32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            ship_radius: 19.0,
            shield_radius: 22.0,
            power_up_radius: 10.0,
            bullet_radius: 2.0,
            missile_radius: 4.0,
            drone_radius: 3.0,
            bomb_radius: 4.0,
            bomb_range: 70.0,
            bomb_pulses: 8,
            bomb_pulse_interval_ms: 50,
            bomb_fuse_ms: 6_000,
            self_hit_grace_ms: 50,
            shield_self_hit_grace_ms: 225,
            drone_max_level: 3,
            drone_lifetime_ms: 15_000,
            drone_orbit_radius: 32.0,
            drone_orbit_speed: 2.5,
        }
    }
}

/// Launch parameters for one projectile kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaunchTuning {
    /// Impulse added to the owner's velocity along the heading.
    pub impulse: f32,
    /// Lower speed clamp.
    pub min_speed: f32,
    /// Upper speed clamp.
    pub max_speed: f32,
    /// Time until the projectile expires.
    pub lifetime_ms: Millis,
}

/// Ship handling and projectile launch parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipConfig {
    /// Starting and maximum hull points.
    pub max_hp: f32,
    /// Turn rate in radians per second.
    pub turn_rate: f32,
    /// Forward acceleration in units per second squared.
    pub thrust: f32,
    /// Fraction of velocity kept after one second without thrust.
    pub drag: f32,
    /// Speed cap in units per second.
    pub max_speed: f32,
    /// Speed cap multiplier while boosting.
    pub boost_multiplier: f32,
    /// Boost length.
    pub boost_duration_ms: Millis,
    /// Shield length (the shield also drops when its hp run out).
    pub shield_duration_ms: Millis,
    /// Camouflage fade drained per second while fading in.
    pub camu_fade_per_sec: f32,
    /// Total camouflage length, fade included.
    pub camu_duration_ms: Millis,
    /// Minimum time between bullets.
    pub bullet_cooldown_ms: Millis,
    /// Minimum time between missiles.
    pub missile_cooldown_ms: Millis,
    /// Bullet launch.
    pub bullet: LaunchTuning,
    /// Missile launch.
    pub missile: LaunchTuning,
    /// Bomb launch (lifetime unused, see `CombatConfig::bomb_fuse_ms`).
    pub bomb: LaunchTuning,
    /// Delay between a ship's death and its respawn.
    pub respawn_delay_ms: Millis,
    /// Ticks of collision immunity after (re)spawning.
    pub spawn_guard_ticks: u32,
}

impl Default for ShipConfig {
    fn default() -> Self {
        Self {
            max_hp: 30.0,
            turn_rate: 4.5,
            thrust: 260.0,
            drag: 0.55,
            max_speed: 140.0,
            boost_multiplier: 1.5,
            boost_duration_ms: 8_000,
            shield_duration_ms: 12_000,
            camu_fade_per_sec: 50.0,
            camu_duration_ms: 20_000,
            bullet_cooldown_ms: 180,
            missile_cooldown_ms: 400,
            bullet: LaunchTuning {
                impulse: 180.0,
                min_speed: 150.0,
                max_speed: 280.0,
                lifetime_ms: 1_200,
            },
            missile: LaunchTuning {
                impulse: 140.0,
                min_speed: 120.0,
                max_speed: 230.0,
                lifetime_ms: 2_000,
            },
            bomb: LaunchTuning {
                impulse: 60.0,
                min_speed: 40.0,
                max_speed: 100.0,
                lifetime_ms: 0,
            },
            respawn_delay_ms: 2_500,
            spawn_guard_ticks: 40,
        }
    }
}

/// Points awarded and deducted on kills.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Awarded to the killer of another player.
    pub kill_points: i64,
    /// Deducted from a player who destroys themself.
    pub self_destruct_penalty: i64,
    /// Awarded to a drone owner when the drone destroys an asteroid.
    pub drone_asteroid_points: i64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            kill_points: 10,
            self_destruct_penalty: 5,
            drone_asteroid_points: 1,
        }
    }
}
