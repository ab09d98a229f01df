//! Round lifecycle.
//!
//! A match alternates between an active round and an intermission:
//!
//! ```text
//! Active --(duration elapsed)--> Ended --(wait elapsed)--> Active (id + 1)
//! ```
//!
//! Both transitions are timer events in the [`EventQueue`](crate::schedule::EventQueue).
//! Each transition cancels the pending timer by id before arming the next
//! one, so there is never more than one round timer in flight.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::context::SimContext;
use crate::schedule::{EventId, Millis, TimedEvent};
use crate::snapshot::{LeaderboardEntry, ServerMessage};

/// Round phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundPhase {
    /// In play.
    Active,
    /// Intermission; only ships move and nothing collides.
    Ended,
}

/// Drives the round state machine.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundManager {
    round_id: u32,
    phase: RoundPhase,
    phase_started_at: Millis,
    time_left_at_start: Millis,
    last_broadcast: Millis,
    timer: Option<EventId>,
    stats: Option<Vec<LeaderboardEntry>>,
}

impl Default for RoundManager {
    fn default() -> Self {
        Self::new()
    }
}

impl RoundManager {
    /// A manager waiting for its first round.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            round_id: 0,
            phase: RoundPhase::Ended,
            phase_started_at: 0,
            time_left_at_start: 0,
            last_broadcast: 0,
            timer: None,
            stats: None,
        }
    }

    /// Id of the current (or last) round. Zero before the first round.
    #[must_use]
    pub const fn round_id(&self) -> u32 {
        self.round_id
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> RoundPhase {
        self.phase
    }

    /// Whether the round is in play.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.phase == RoundPhase::Active
    }

    /// Standings of the round that just ended, during the intermission.
    #[must_use]
    pub fn stats(&self) -> Option<&[LeaderboardEntry]> {
        self.stats.as_deref()
    }

    /// The pending transition timer.
    #[must_use]
    pub const fn timer(&self) -> Option<EventId> {
        self.timer
    }

    /// Milliseconds left in the current phase.
    #[must_use]
    pub const fn time_left(&self, now: Millis) -> Millis {
        self.time_left_at_start
            .saturating_sub(now.saturating_sub(self.phase_started_at))
    }

    /// Begins a new round.
    ///
    /// Resets both spawners and every player's counters, puts every player
    /// back in a ship and arms the end-of-round timer.
    pub fn start(&mut self, ctx: &mut SimContext) {
        let now = ctx.now;
        let duration = ctx.config.round.duration_ms;
        self.round_id += 1;
        self.phase = RoundPhase::Active;
        self.phase_started_at = now;
        self.time_left_at_start = duration;
        self.last_broadcast = now;
        self.stats = None;

        ctx.clear_arena();
        let roster = &ctx.roster;
        ctx.schedule.cancel_where(|event| match event {
            TimedEvent::Respawn(player) => roster.get(*player).is_none(),
            _ => false,
        });
        let config = &ctx.config.asteroids;
        ctx.asteroids.reset(now, config, &mut ctx.rng);
        let player_count = ctx.roster.len();
        ctx.power_ups.reset(now, player_count, &mut ctx.rng);
        ctx.roster.reset_round();
        for player in ctx.roster.ids() {
            if ctx.spawn_ship(player).is_some() {
                ctx.schedule
                    .cancel_where(|event| *event == TimedEvent::Respawn(player));
            }
        }

        self.rearm(ctx, now + duration, TimedEvent::EndRound);
        info!(round = self.round_id, duration_ms = duration, "round started");
        ctx.emit(ServerMessage::RoundStarted {
            round_id: self.round_id,
            duration_ms: duration,
        });
    }

    /// Ends the round: wipes the arena, freezes the standings and arms the
    /// restart timer.
    pub fn end(&mut self, ctx: &mut SimContext) {
        let now = ctx.now;
        let wait = ctx.config.round.wait_ms;
        self.phase = RoundPhase::Ended;
        self.phase_started_at = now;
        self.time_left_at_start = wait;

        let cleared = ctx.clear_arena();
        let stats = ctx.roster.leaderboard();
        self.stats = Some(stats.clone());

        self.rearm(ctx, now + wait, TimedEvent::StartRound);
        info!(
            round = self.round_id,
            cleared,
            players = stats.len(),
            "round ended"
        );
        ctx.emit(ServerMessage::RoundEnded {
            round_id: self.round_id,
            wait_ms: wait,
            stats,
        });
    }

    /// Republishes the remaining time once per broadcast period while the
    /// round is in play.
    pub fn broadcast_time(&mut self, ctx: &mut SimContext) {
        let now = ctx.now;
        if !self.is_active() || now <= self.last_broadcast + ctx.config.round.time_broadcast_ms {
            return;
        }
        self.last_broadcast = now;
        ctx.emit(ServerMessage::RoundTime {
            time_left_ms: self.time_left(now),
        });
    }

    fn rearm(&mut self, ctx: &mut SimContext, due: Millis, event: TimedEvent) {
        if let Some(previous) = self.timer.take() {
            ctx.schedule.cancel(previous);
        }
        self.timer = Some(ctx.schedule.schedule(due, event));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::ActorTag;
    use crate::hooks::NoopHooks;
    use crate::tests::helpers::{context, place_asteroid};
    use glam::Vec2;

    fn run_timers(round: &mut RoundManager, ctx: &mut SimContext) {
        while let Some(due) = ctx.schedule.pop_due(ctx.now) {
            match due.event {
                TimedEvent::EndRound => round.end(ctx),
                TimedEvent::StartRound => round.start(ctx),
                TimedEvent::Respawn(player) => ctx.respawn(player),
                _ => {}
            }
        }
    }

    mod lifecycle_tests {
        use super::*;

        #[test]
        fn active_then_ended_then_active() {
            let mut ctx = context(Box::new(NoopHooks));
            let mut round = RoundManager::new();
            round.start(&mut ctx);
            assert_eq!(round.round_id(), 1);
            assert!(round.is_active());

            ctx.now = 180_000;
            run_timers(&mut round, &mut ctx);
            assert_eq!(round.phase(), RoundPhase::Ended);
            assert!(round.stats().is_some());
            assert_eq!(round.time_left(ctx.now), 15_000);

            ctx.now = 195_000;
            run_timers(&mut round, &mut ctx);
            assert_eq!(round.round_id(), 2);
            assert!(round.is_active());
            assert!(round.stats().is_none());
        }

        #[test]
        fn single_timer_in_flight() {
            let mut ctx = context(Box::new(NoopHooks));
            let mut round = RoundManager::new();
            round.start(&mut ctx);
            round.start(&mut ctx);
            let timers = |ctx: &SimContext| {
                let mut n = 0;
                for event in [TimedEvent::EndRound, TimedEvent::StartRound] {
                    if ctx.schedule.any(|e| *e == event) {
                        n += 1;
                    }
                }
                n
            };
            assert_eq!(timers(&ctx), 1);
            assert_eq!(ctx.schedule.due_of(round.timer().unwrap()), Some(180_000));
        }

        #[test]
        fn end_clears_everything_but_ships() {
            let mut ctx = context(Box::new(NoopHooks));
            ctx.roster.join("p", 5).unwrap();
            let mut round = RoundManager::new();
            round.start(&mut ctx);
            place_asteroid(&mut ctx, 3, Vec2::new(100.0, 100.0), Vec2::ZERO);
            round.end(&mut ctx);
            assert_eq!(ctx.registry.count(ActorTag::Asteroid), 0);
            assert_eq!(ctx.registry.count(ActorTag::Ship), 1);
        }

        #[test]
        fn start_resets_counters() {
            let mut ctx = context(Box::new(NoopHooks));
            let p = ctx.roster.join("p", 5).unwrap();
            let mut round = RoundManager::new();
            round.start(&mut ctx);
            ctx.roster.add_score(p, 40);
            ctx.roster.record_shot(p);
            round.end(&mut ctx);
            assert_eq!(round.stats().unwrap()[0].score, 40);
            round.start(&mut ctx);
            assert_eq!(ctx.roster.get(p).unwrap().stats.score, 0);
            assert_eq!(ctx.roster.get(p).unwrap().stats.shots, 0);
        }
    }

    mod message_tests {
        use super::*;

        #[test]
        fn announces_transitions() {
            let mut ctx = context(Box::new(NoopHooks));
            let mut round = RoundManager::new();
            round.start(&mut ctx);
            round.end(&mut ctx);
            assert!(matches!(
                ctx.outbox[0],
                ServerMessage::RoundStarted {
                    round_id: 1,
                    duration_ms: 180_000
                }
            ));
            assert!(matches!(
                ctx.outbox[1],
                ServerMessage::RoundEnded {
                    round_id: 1,
                    wait_ms: 15_000,
                    ..
                }
            ));
        }

        #[test]
        fn time_broadcast_every_period() {
            let mut ctx = context(Box::new(NoopHooks));
            let mut round = RoundManager::new();
            round.start(&mut ctx);
            ctx.outbox.clear();
            for step in 0..=600u64 {
                ctx.now = step * 50;
                round.broadcast_time(&mut ctx);
            }
            // 30 s of play: one broadcast, on the first tick past 15 s.
            let left: Vec<Millis> = ctx
                .outbox
                .iter()
                .filter_map(|m| match m {
                    ServerMessage::RoundTime { time_left_ms } => Some(*time_left_ms),
                    _ => None,
                })
                .collect();
            assert_eq!(left, vec![180_000 - 15_050]);
        }

        #[test]
        fn no_broadcast_during_intermission() {
            let mut ctx = context(Box::new(NoopHooks));
            let mut round = RoundManager::new();
            round.start(&mut ctx);
            round.end(&mut ctx);
            ctx.outbox.clear();
            ctx.now = 60_000;
            round.broadcast_time(&mut ctx);
            assert!(ctx.outbox.is_empty());
        }
    }
}
