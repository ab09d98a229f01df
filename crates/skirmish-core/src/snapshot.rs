//! Outward-facing state.
//!
//! [`WorldSnapshot`] is the full picture handed to the transport layer each
//! tick; [`ServerMessage`]s are the discrete announcements drained from the
//! world between ticks. Both are plain serde types, the framing is up to the
//! transport.

use std::collections::BTreeMap;

use glam::Vec2;
use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::ser::{SerializeTuple, Serializer};
use serde::{Deserialize, Serialize};

use crate::actor::{Actor, ActorId, ActorInner, ActorTag, PowerUpKind};
use crate::roster::PlayerId;
use crate::schedule::Millis;

// =============================================================================
// Leaderboard
// =============================================================================

/// One row of the end-of-round standings.
///
/// On the wire this is the tuple
/// `(score, kills, name, self_destructs, color, hit_percent)` with `-1`
/// standing in for "no shots fired".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    /// Final score.
    pub score: i64,
    /// Kills.
    pub kills: u32,
    /// Display name.
    pub name: String,
    /// Self-destructs.
    pub self_destructs: u32,
    /// Palette slot.
    pub color: u8,
    /// Rounded hit percentage, `None` if the player never fired.
    pub hit_percent: Option<u32>,
}

const NO_SHOTS: i64 = -1;

impl Serialize for LeaderboardEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(6)?;
        tuple.serialize_element(&self.score)?;
        tuple.serialize_element(&self.kills)?;
        tuple.serialize_element(&self.name)?;
        tuple.serialize_element(&self.self_destructs)?;
        tuple.serialize_element(&self.color)?;
        tuple.serialize_element(&self.hit_percent.map_or(NO_SHOTS, i64::from))?;
        tuple.end()
    }
}

impl<'de> Deserialize<'de> for LeaderboardEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntryVisitor;

        impl<'de> Visitor<'de> for EntryVisitor {
            type Value = LeaderboardEntry;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("a (score, kills, name, self_destructs, color, hit_percent) tuple")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let missing = |i| <A::Error as de::Error>::invalid_length(i, &self);
                let score = seq.next_element()?.ok_or_else(|| missing(0))?;
                let kills = seq.next_element()?.ok_or_else(|| missing(1))?;
                let name = seq.next_element()?.ok_or_else(|| missing(2))?;
                let self_destructs = seq.next_element()?.ok_or_else(|| missing(3))?;
                let color = seq.next_element()?.ok_or_else(|| missing(4))?;
                let hit: i64 = seq.next_element()?.ok_or_else(|| missing(5))?;
                let hit_percent = u32::try_from(hit).ok();
                Ok(LeaderboardEntry {
                    score,
                    kills,
                    name,
                    self_destructs,
                    color,
                    hit_percent,
                })
            }
        }

        deserializer.deserialize_tuple(6, EntryVisitor)
    }
}

// =============================================================================
// Messages
// =============================================================================

/// Discrete announcements for the transport layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// A round began.
    RoundStarted {
        /// New round id.
        round_id: u32,
        /// Round length.
        duration_ms: Millis,
    },
    /// A round ended; the next starts after `wait_ms`.
    RoundEnded {
        /// The round that ended.
        round_id: u32,
        /// Intermission length.
        wait_ms: Millis,
        /// Final standings.
        stats: Vec<LeaderboardEntry>,
    },
    /// Periodic reminder of the remaining round time.
    RoundTime {
        /// Milliseconds left.
        time_left_ms: Millis,
    },
    /// One pulse of a bomb blast was evaluated.
    BlastPulse {
        /// Blast center.
        center: Vec2,
        /// Blast radius.
        range: f32,
        /// Pulses still to come after this one.
        remaining: u32,
    },
}

// =============================================================================
// Snapshot
// =============================================================================

/// Kind-specific details worth showing to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActorDetail {
    /// A ship.
    Ship {
        /// Owner.
        player: PlayerId,
        /// Facing.
        heading: f32,
        /// Hull points.
        hp: f32,
        /// Armor mounted.
        armor: bool,
        /// Shield up.
        shield: bool,
        /// Boost running.
        boost: bool,
        /// Spawn protection running.
        guarded: bool,
        /// Camouflage level.
        camu: u8,
        /// Missile stock.
        missiles: u32,
        /// Bomb armed.
        bomb: bool,
    },
    /// An asteroid.
    Asteroid {
        /// Size tier.
        tier: u8,
        /// Outline vertices, relative to the position.
        hull: Vec<Vec2>,
    },
    /// A bullet.
    Bullet {
        /// Who fired it.
        owner: PlayerId,
    },
    /// A missile.
    Missile {
        /// Who fired it.
        owner: PlayerId,
    },
    /// A bomb in flight.
    Bomb {
        /// Who launched it.
        owner: PlayerId,
        /// Blast radius.
        range: f32,
    },
    /// A defense drone.
    Drone {
        /// Owner.
        owner: PlayerId,
        /// Upgrade level.
        level: u32,
    },
    /// A power-up.
    PowerUp {
        /// Kind.
        power_up: PowerUpKind,
    },
}

/// One live actor as seen from outside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorView {
    /// Registry id.
    pub id: ActorId,
    /// Position.
    pub position: Vec2,
    /// Velocity.
    pub velocity: Vec2,
    /// Kind-specific details.
    pub detail: ActorDetail,
}

impl ActorView {
    /// Describes an actor.
    #[must_use]
    pub fn of(actor: &Actor) -> Self {
        let detail = match &actor.inner {
            ActorInner::Ship(ship) => ActorDetail::Ship {
                player: ship.player,
                heading: ship.heading,
                hp: ship.hp,
                armor: ship.armor.on,
                shield: ship.shield.on,
                boost: ship.boost.on,
                guarded: ship.is_guarded(),
                camu: ship.camu.level,
                missiles: ship.missiles,
                bomb: ship.bomb_held,
            },
            ActorInner::Asteroid(asteroid) => ActorDetail::Asteroid {
                tier: asteroid.tier,
                hull: asteroid.hull.points().to_vec(),
            },
            ActorInner::Bullet(p) => ActorDetail::Bullet { owner: p.owner },
            ActorInner::Missile(p) => ActorDetail::Missile { owner: p.owner },
            ActorInner::Bomb(bomb) => ActorDetail::Bomb {
                owner: bomb.owner,
                range: bomb.range,
            },
            ActorInner::Drone(drone) => ActorDetail::Drone {
                owner: drone.owner,
                level: drone.level,
            },
            ActorInner::PowerUp(p) => ActorDetail::PowerUp { power_up: p.kind },
        };
        Self {
            id: actor.id(),
            position: actor.position(),
            velocity: actor.velocity(),
            detail,
        }
    }

    /// The viewed actor's kind.
    #[must_use]
    pub const fn tag(&self) -> ActorTag {
        match self.detail {
            ActorDetail::Ship { .. } => ActorTag::Ship,
            ActorDetail::Asteroid { .. } => ActorTag::Asteroid,
            ActorDetail::Bullet { .. } => ActorTag::Bullet,
            ActorDetail::Missile { .. } => ActorTag::Missile,
            ActorDetail::Bomb { .. } => ActorTag::Bomb,
            ActorDetail::Drone { .. } => ActorTag::Drone,
            ActorDetail::PowerUp { .. } => ActorTag::PowerUp,
        }
    }
}

/// Public view of a connected player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    /// Display name.
    pub name: String,
    /// Current score.
    pub score: i64,
    /// Palette slot.
    pub color: u8,
}

/// Everything a client needs to render the arena.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Simulation time of the snapshot.
    pub now: Millis,
    /// Arena size `(width, height)`.
    pub size: (f32, f32),
    /// Player cap.
    pub max_players: usize,
    /// Connected players.
    pub players: BTreeMap<PlayerId, PlayerView>,
    /// Current round id.
    pub round_id: u32,
    /// Whether the round is in play.
    pub round_go: bool,
    /// Milliseconds left in the current phase.
    pub time_left_ms: Millis,
    /// Final standings of the last round, present only during the intermission.
    pub round_stats: Option<Vec<LeaderboardEntry>>,
    /// Live actors, oldest first.
    pub actors: Vec<ActorView>,
}

impl WorldSnapshot {
    /// Live actors of one kind.
    pub fn actors_of(&self, tag: ActorTag) -> impl Iterator<Item = &ActorView> + '_ {
        self.actors.iter().filter(move |view| view.tag() == tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(hit_percent: Option<u32>) -> LeaderboardEntry {
        LeaderboardEntry {
            score: 10,
            kills: 2,
            name: "ann".to_owned(),
            self_destructs: 1,
            color: 3,
            hit_percent,
        }
    }

    mod leaderboard_tests {
        use super::*;

        #[test]
        fn serializes_as_tuple() {
            let json = serde_json::to_string(&entry(Some(40))).unwrap();
            assert_eq!(json, r#"[10,2,"ann",1,3,40]"#);
        }

        #[test]
        fn no_shots_uses_sentinel() {
            let json = serde_json::to_string(&entry(None)).unwrap();
            assert_eq!(json, r#"[10,2,"ann",1,3,-1]"#);
            let back: LeaderboardEntry = serde_json::from_str(&json).unwrap();
            assert_eq!(back.hit_percent, None);
        }

        #[test]
        fn short_tuple_is_rejected() {
            assert!(serde_json::from_str::<LeaderboardEntry>(r#"[10,2,"ann"]"#).is_err());
        }
    }

    mod message_tests {
        use super::*;

        #[test]
        fn messages_are_tagged() {
            let msg = ServerMessage::RoundTime { time_left_ms: 1500 };
            let json = serde_json::to_value(&msg).unwrap();
            assert_eq!(json["type"], "round_time");
            assert_eq!(json["time_left_ms"], 1500);
        }

        #[test]
        fn round_end_embeds_tuples() {
            let msg = ServerMessage::RoundEnded {
                round_id: 4,
                wait_ms: 15_000,
                stats: vec![entry(None)],
            };
            let json = serde_json::to_value(&msg).unwrap();
            assert_eq!(json["stats"][0][5], -1);
        }
    }
}
