//! Players, their colors and their per-round counters.
//!
//! The roster is the single owner of score bookkeeping. Kills are recorded
//! here first; [`ClientHooks`](crate::hooks::ClientHooks) only hear about the
//! result.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::actor::ActorId;
use crate::config::ScoringConfig;
use crate::error::JoinError;
use crate::hooks::Weapon;
use crate::movement::InputFlags;
use crate::snapshot::LeaderboardEntry;

/// Number of distinct player colors.
pub const PALETTE_SIZE: usize = 7;

/// Identifies a player for the lifetime of their connection.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(u32);

impl PlayerId {
    /// Creates a `PlayerId` from a raw value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// The raw value.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PlayerId({})", self.0)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-round counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    /// Points, floored at zero once per tick.
    pub score: i64,
    /// Other players destroyed.
    pub kills: u32,
    /// Projectiles fired.
    pub shots: u32,
    /// Projectiles that struck something.
    pub hits: u32,
    /// Deaths with nobody else to blame.
    pub self_destructs: u32,
}

impl PlayerStats {
    /// Rounded hit percentage, or `None` before the first shot.
    #[must_use]
    pub fn hit_percent(&self) -> Option<u32> {
        (self.shots > 0).then(|| {
            let pct = 100.0 * f64::from(self.hits) / f64::from(self.shots);
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let pct = pct.round() as u32;
            pct
        })
    }
}

/// Why a ship died.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KillCause {
    /// Flew into an asteroid.
    Asteroid,
    /// Rammed by another ship.
    Player(PlayerId),
    /// Hit by a bullet, missile or drone.
    Projectile {
        /// Who fired it.
        shooter: PlayerId,
        /// What it was.
        weapon: Weapon,
    },
    /// Caught in a bomb blast.
    Bomb(PlayerId),
}

impl KillCause {
    /// The player credited with the kill, if any.
    #[must_use]
    pub const fn killer(&self) -> Option<PlayerId> {
        match *self {
            Self::Asteroid => None,
            Self::Player(killer) | Self::Bomb(killer) => Some(killer),
            Self::Projectile { shooter, .. } => Some(shooter),
        }
    }
}

/// A connected player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    /// Player id.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Palette slot.
    pub color: u8,
    /// Counters for the current round.
    pub stats: PlayerStats,
    /// The live ship, if any.
    pub ship: Option<ActorId>,
    /// Latest intent.
    pub input: InputFlags,
    /// Intent seen on the previous tick, for edge-triggered actions.
    pub previous_input: InputFlags,
}

/// Every connected player.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
    next_id: u32,
    players: BTreeMap<PlayerId, PlayerRecord>,
}

impl Roster {
    /// Creates an empty roster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a player, taking the first free color.
    ///
    /// # Errors
    ///
    /// [`JoinError::EmptyName`] for a blank name and
    /// [`JoinError::ArenaFull`] when `max_players` are already connected.
    pub fn join(&mut self, name: &str, max_players: usize) -> Result<PlayerId, JoinError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(JoinError::EmptyName);
        }
        let cap = max_players.min(PALETTE_SIZE);
        if self.players.len() >= cap {
            return Err(JoinError::ArenaFull { max_players });
        }
        let color = (0u8..)
            .take(PALETTE_SIZE)
            .find(|c| self.players.values().all(|p| p.color != *c))
            .ok_or(JoinError::ArenaFull { max_players })?;

        self.next_id += 1;
        let id = PlayerId(self.next_id);
        self.players.insert(
            id,
            PlayerRecord {
                id,
                name: name.to_owned(),
                color,
                stats: PlayerStats::default(),
                ship: None,
                input: InputFlags::empty(),
                previous_input: InputFlags::empty(),
            },
        );
        info!(player = %id, name, color, "player joined");
        Ok(id)
    }

    /// Removes a player, returning their record.
    pub fn leave(&mut self, id: PlayerId) -> Option<PlayerRecord> {
        let record = self.players.remove(&id)?;
        info!(player = %id, name = %record.name, "player left");
        Some(record)
    }

    /// A player by id.
    #[must_use]
    pub fn get(&self, id: PlayerId) -> Option<&PlayerRecord> {
        self.players.get(&id)
    }

    /// Mutable access to a player.
    #[must_use]
    pub fn get_mut(&mut self, id: PlayerId) -> Option<&mut PlayerRecord> {
        self.players.get_mut(&id)
    }

    /// Every player, in join order.
    pub fn iter(&self) -> impl Iterator<Item = &PlayerRecord> + '_ {
        self.players.values()
    }

    /// Player ids, in join order.
    #[must_use]
    pub fn ids(&self) -> Vec<PlayerId> {
        self.players.keys().copied().collect()
    }

    /// Number of connected players.
    #[must_use]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Whether nobody is connected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Counts a fired projectile.
    pub fn record_shot(&mut self, id: PlayerId) {
        if let Some(player) = self.players.get_mut(&id) {
            player.stats.shots += 1;
        }
    }

    /// Counts a projectile that struck something.
    pub fn record_hit(&mut self, id: PlayerId) {
        if let Some(player) = self.players.get_mut(&id) {
            player.stats.hits += 1;
        }
    }

    /// Adds `points` to a player's score. Returns whether the player exists.
    pub fn add_score(&mut self, id: PlayerId, points: i64) -> bool {
        self.players
            .get_mut(&id)
            .map(|player| player.stats.score += points)
            .is_some()
    }

    /// Books a death and returns the score change it caused.
    ///
    /// A kill with no other player to blame counts as a self-destruct and
    /// costs the victim points. Otherwise the killer gains a kill and points.
    /// Credits to players who already left are dropped.
    pub fn record_death(
        &mut self,
        victim: PlayerId,
        cause: &KillCause,
        scoring: &ScoringConfig,
    ) -> Option<(PlayerId, i64)> {
        match cause.killer() {
            Some(killer) if killer != victim => {
                let player = self.players.get_mut(&killer)?;
                player.stats.kills += 1;
                player.stats.score += scoring.kill_points;
                Some((killer, scoring.kill_points))
            }
            _ => {
                let player = self.players.get_mut(&victim)?;
                player.stats.self_destructs += 1;
                player.stats.score -= scoring.self_destruct_penalty;
                Some((victim, -scoring.self_destruct_penalty))
            }
        }
    }

    /// Clamps every negative score to zero.
    pub fn floor_scores(&mut self) {
        for player in self.players.values_mut() {
            player.stats.score = player.stats.score.max(0);
        }
    }

    /// Zeroes every player's per-round counters.
    pub fn reset_round(&mut self) {
        for player in self.players.values_mut() {
            player.stats = PlayerStats::default();
        }
    }

    /// Ranked standings: score descending, then kills descending, then
    /// self-destructs ascending. Ties beyond that keep join order. Every
    /// connected player is listed; [`Roster::join`] never admits a blank name.
    #[must_use]
    pub fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        let mut entries: Vec<LeaderboardEntry> = self
            .players
            .values()
            .map(|player| LeaderboardEntry {
                score: player.stats.score,
                kills: player.stats.kills,
                name: player.name.clone(),
                self_destructs: player.stats.self_destructs,
                color: player.color,
                hit_percent: player.stats.hit_percent(),
            })
            .collect();
        entries.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| b.kills.cmp(&a.kills))
                .then_with(|| a.self_destructs.cmp(&b.self_destructs))
        });
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod join_tests {
        use super::*;

        #[test]
        fn assigns_first_free_color() {
            let mut roster = Roster::new();
            let a = roster.join("ann", 5).unwrap();
            let b = roster.join("bob", 5).unwrap();
            assert_eq!(roster.get(a).unwrap().color, 0);
            assert_eq!(roster.get(b).unwrap().color, 1);

            roster.leave(a);
            let c = roster.join("cid", 5).unwrap();
            assert_eq!(roster.get(c).unwrap().color, 0);
            assert_ne!(c, a);
        }

        #[test]
        fn rejects_when_full() {
            let mut roster = Roster::new();
            roster.join("a", 2).unwrap();
            roster.join("b", 2).unwrap();
            assert_eq!(
                roster.join("c", 2),
                Err(JoinError::ArenaFull { max_players: 2 })
            );
            assert_eq!(roster.len(), 2);
        }

        #[test]
        fn rejects_blank_names() {
            let mut roster = Roster::new();
            assert_eq!(roster.join("   ", 5), Err(JoinError::EmptyName));
            assert!(roster.is_empty());
        }

        #[test]
        fn trims_names() {
            let mut roster = Roster::new();
            let id = roster.join("  zed ", 5).unwrap();
            assert_eq!(roster.get(id).unwrap().name, "zed");
        }
    }

    mod scoring_tests {
        use super::*;

        fn two_players() -> (Roster, PlayerId, PlayerId) {
            let mut roster = Roster::new();
            let a = roster.join("a", 5).unwrap();
            let b = roster.join("b", 5).unwrap();
            (roster, a, b)
        }

        #[test]
        fn kill_credits_the_killer() {
            let (mut roster, a, b) = two_players();
            let delta = roster.record_death(b, &KillCause::Player(a), &ScoringConfig::default());
            assert_eq!(delta, Some((a, 10)));
            assert_eq!(roster.get(a).unwrap().stats.kills, 1);
            assert_eq!(roster.get(a).unwrap().stats.score, 10);
            assert_eq!(roster.get(b).unwrap().stats, PlayerStats::default());
        }

        #[test]
        fn asteroid_death_is_a_self_destruct() {
            let (mut roster, a, _) = two_players();
            let delta = roster.record_death(a, &KillCause::Asteroid, &ScoringConfig::default());
            assert_eq!(delta, Some((a, -5)));
            let stats = roster.get(a).unwrap().stats;
            assert_eq!(stats.self_destructs, 1);
            assert_eq!(stats.score, -5);

            roster.floor_scores();
            assert_eq!(roster.get(a).unwrap().stats.score, 0);
        }

        #[test]
        fn own_bomb_is_a_self_destruct() {
            let (mut roster, a, _) = two_players();
            roster.record_death(a, &KillCause::Bomb(a), &ScoringConfig::default());
            assert_eq!(roster.get(a).unwrap().stats.self_destructs, 1);
            assert_eq!(roster.get(a).unwrap().stats.kills, 0);
        }

        #[test]
        fn departed_killer_earns_nothing() {
            let (mut roster, a, b) = two_players();
            roster.leave(a);
            let cause = KillCause::Projectile {
                shooter: a,
                weapon: Weapon::Missile,
            };
            assert_eq!(roster.record_death(b, &cause, &ScoringConfig::default()), None);
        }

        #[test]
        fn hit_percent_rounds() {
            let stats = PlayerStats {
                shots: 3,
                hits: 2,
                ..PlayerStats::default()
            };
            assert_eq!(stats.hit_percent(), Some(67));
            assert_eq!(PlayerStats::default().hit_percent(), None);
        }

        #[test]
        fn reset_round_zeroes_counters() {
            let (mut roster, a, b) = two_players();
            roster.record_shot(a);
            roster.record_hit(a);
            roster.record_death(b, &KillCause::Player(a), &ScoringConfig::default());
            roster.reset_round();
            assert_eq!(roster.get(a).unwrap().stats, PlayerStats::default());
        }
    }

    mod leaderboard_tests {
        use super::*;

        #[test]
        fn ties_break_on_kills_then_self_destructs() {
            let mut roster = Roster::new();
            let mut set = |name: &str, score, kills, self_destructs| {
                let id = roster.join(name, 5).unwrap();
                let stats = &mut roster.get_mut(id).unwrap().stats;
                stats.score = score;
                stats.kills = kills;
                stats.self_destructs = self_destructs;
            };
            set("p1", 10, 2, 0);
            set("p2", 10, 3, 0);
            set("p3", 5, 1, 0);
            set("p4", 5, 1, 2);
            set("p5", 5, 1, 1);

            let names: Vec<_> = roster
                .leaderboard()
                .into_iter()
                .map(|entry| entry.name)
                .collect();
            assert_eq!(names, vec!["p2", "p1", "p3", "p5", "p4"]);
        }

        #[test]
        fn lists_every_connected_player() {
            let mut roster = Roster::new();
            let quiet = roster.join("quiet", 5).unwrap();
            roster.join("busy", 5).unwrap();
            roster.record_shot(quiet);
            let board = roster.leaderboard();
            assert_eq!(board.len(), roster.len());
            assert!(board.iter().all(|entry| !entry.name.is_empty()));

            roster.leave(quiet);
            assert_eq!(roster.leaderboard().len(), 1);
        }
    }
}
