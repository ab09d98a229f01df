//! Power-up pacing.
//!
//! Every [`PowerUpKind`] has a slot with its own cap, base wait and jitter.
//! A slot becomes eligible at its `next_at` time; if the global budget is
//! full at that moment it backs off instead of spawning. Life power-ups do
//! not count towards the global budget but are still blocked by a full one.
//! All waits are scaled by a multiplier looked up by player count, so small
//! games see fewer pickups.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::actor::components::PowerUpState;
use crate::actor::{ActorId, ActorInner, Motion, PowerUpKind};
use crate::config::{by_player_count, PowerUpConfig, SlotTuning};
use crate::context::SimContext;
use crate::schedule::Millis;
use crate::spawner::placement;

/// Pacing state for one power-up kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerUpSlot {
    /// Cap, base wait and jitter.
    pub tuning: SlotTuning,
    /// Live power-ups of this kind.
    pub active: u32,
    /// Earliest time the next one may appear.
    pub next_at: Millis,
}

/// Power-up spawner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerUpSpawner {
    slots: Vec<PowerUpSlot>,
    /// Live power-ups that count towards the global budget.
    budget_used: u32,
    max_concurrent: u32,
    multipliers: Vec<f32>,
}

impl PowerUpSpawner {
    /// Creates a spawner with every slot empty and immediately eligible.
    #[must_use]
    pub fn new(config: &PowerUpConfig) -> Self {
        Self {
            slots: config
                .slots
                .iter()
                .map(|&tuning| PowerUpSlot {
                    tuning,
                    active: 0,
                    next_at: 0,
                })
                .collect(),
            budget_used: 0,
            max_concurrent: config.max_concurrent,
            multipliers: config.time_multipliers.clone(),
        }
    }

    /// Empties every slot and reschedules all of them with the initial bias.
    pub fn reset<R: Rng + ?Sized>(&mut self, now: Millis, player_count: usize, rng: &mut R) {
        let mult = self.multiplier(player_count);
        for slot in &mut self.slots {
            slot.active = 0;
            slot.next_at = Self::next_spawn(&slot.tuning, now, mult, true, rng);
        }
        self.budget_used = 0;
    }

    /// Decides which kinds spawn at `now`.
    ///
    /// Each returned kind is already counted as active; the caller must place
    /// exactly one power-up per entry.
    pub fn due<R: Rng + ?Sized>(
        &mut self,
        now: Millis,
        player_count: usize,
        rng: &mut R,
    ) -> Vec<PowerUpKind> {
        let mult = self.multiplier(player_count);
        let mut spawned = Vec::new();
        for slot in &mut self.slots {
            if now <= slot.next_at || slot.active >= slot.tuning.max {
                continue;
            }
            if self.budget_used < self.max_concurrent {
                slot.next_at = Self::next_spawn(&slot.tuning, now, mult, false, rng);
                slot.active += 1;
                if slot.tuning.kind.counts_towards_budget() {
                    self.budget_used += 1;
                }
                spawned.push(slot.tuning.kind);
            } else {
                let backoff = slot.tuning.jitter_secs * (rng.gen::<f32>() / 2.0 + 0.5) * 1000.0;
                slot.next_at += millis(backoff);
                trace!(kind = ?slot.tuning.kind, next_at = slot.next_at, "power-up budget full");
            }
        }
        spawned
    }

    /// Frees the slot of a power-up that was destroyed without being
    /// collected.
    pub fn release(&mut self, kind: PowerUpKind) {
        let Some(slot) = self.slots.iter_mut().find(|s| s.tuning.kind == kind) else {
            return;
        };
        slot.active = slot.active.saturating_sub(1);
        if kind.counts_towards_budget() {
            self.budget_used = self.budget_used.saturating_sub(1);
        }
    }

    /// Frees the slot of a collected power-up and pushes its next spawn out.
    pub fn collected<R: Rng + ?Sized>(
        &mut self,
        kind: PowerUpKind,
        now: Millis,
        player_count: usize,
        rng: &mut R,
    ) {
        self.release(kind);
        let mult = self.multiplier(player_count);
        if let Some(slot) = self.slots.iter_mut().find(|s| s.tuning.kind == kind) {
            slot.next_at = Self::next_spawn(&slot.tuning, now, mult, true, rng);
        }
    }

    /// Live power-ups counted against the global budget.
    #[must_use]
    pub const fn budget_used(&self) -> u32 {
        self.budget_used
    }

    /// Live power-ups of one kind.
    #[must_use]
    pub fn active(&self, kind: PowerUpKind) -> u32 {
        self.slot(kind).map_or(0, |s| s.active)
    }

    /// The slot of one kind.
    #[must_use]
    pub fn slot(&self, kind: PowerUpKind) -> Option<&PowerUpSlot> {
        self.slots.iter().find(|s| s.tuning.kind == kind)
    }

    /// Every slot, in configuration order.
    #[must_use]
    pub fn slots(&self) -> &[PowerUpSlot] {
        &self.slots
    }

    fn multiplier(&self, player_count: usize) -> f32 {
        by_player_count(&self.multipliers, player_count, 1.0)
    }

    fn next_spawn<R: Rng + ?Sized>(
        tuning: &SlotTuning,
        now: Millis,
        mult: f32,
        initial: bool,
        rng: &mut R,
    ) -> Millis {
        let jitter = tuning.jitter_secs * 1000.0;
        let mut add = tuning.wait_secs * 1000.0 + rng.gen::<f32>() * jitter;
        if initial {
            add -= jitter / 2.0 * (rng.gen::<f32>() / 2.0 + 0.5);
        }
        now + millis(add * mult)
    }
}

/// Places every power-up that is due this tick.
pub fn update(ctx: &mut SimContext) -> Vec<ActorId> {
    let player_count = ctx.roster.len();
    let kinds = ctx.power_ups.due(ctx.now, player_count, &mut ctx.rng);
    let mut spawned = Vec::with_capacity(kinds.len());
    for kind in kinds {
        let position = placement::interior(
            &ctx.registry,
            &ctx.config,
            &mut ctx.rng,
            ctx.config.combat.power_up_radius,
            ctx.config.power_ups.placement_tries,
        );
        let id = ctx.registry.spawn(
            Motion::at(position),
            ctx.now,
            ActorInner::PowerUp(PowerUpState { kind }),
        );
        trace!(power_up = %id, ?kind, "power-up spawned");
        spawned.push(id);
    }
    spawned
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn millis(ms: f32) -> Millis {
    ms.max(0.0) as Millis
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn spawner() -> PowerUpSpawner {
        PowerUpSpawner::new(&PowerUpConfig::default())
    }

    #[test]
    fn first_eligible_tick_spawns_up_to_budget() {
        let mut s = spawner();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let spawned = s.due(1, 2, &mut rng);
        // Every slot is eligible at once; the first three fill the budget and
        // block the rest, life included.
        assert_eq!(
            spawned,
            vec![PowerUpKind::Shield, PowerUpKind::Armor, PowerUpKind::Missile]
        );
        assert_eq!(s.budget_used(), 3);
    }

    #[test]
    fn reset_applies_pacing_window() {
        let mut s = spawner();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        s.reset(10_000, 3, &mut rng);
        let shield = s.slot(PowerUpKind::Shield).unwrap();
        // wait 23 s, jitter 10 s, initial bias removes at most 5 s, mult 1.0.
        assert!(shield.next_at >= 10_000 + 18_000);
        assert!(shield.next_at <= 10_000 + 33_000);
        assert_eq!(s.budget_used(), 0);
        // Life has the shortest window: 8 s wait minus at most 4 s of bias.
        assert!(s.due(10_000 + 3_999, 3, &mut rng).is_empty());
    }

    #[test]
    fn backoff_when_budget_full() {
        let mut s = spawner();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        s.due(1, 3, &mut rng);
        let blocked: Vec<_> = s
            .slots()
            .iter()
            .filter(|slot| slot.active == 0 && slot.tuning.kind.counts_towards_budget())
            .map(|slot| (slot.tuning.kind, slot.next_at))
            .collect();
        assert!(!blocked.is_empty());
        for (kind, next_at) in blocked {
            let jitter = s.slot(kind).unwrap().tuning.jitter_secs * 1000.0;
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let lo = (jitter * 0.5) as Millis;
            assert!(next_at >= lo.saturating_sub(1), "{kind:?} at {next_at}");
            assert!(next_at <= jitter as Millis + 1);
        }
    }

    #[test]
    fn release_and_collect_free_the_budget() {
        let mut s = spawner();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let spawned = s.due(1, 3, &mut rng);
        let counted: Vec<_> = spawned
            .into_iter()
            .filter(|k| k.counts_towards_budget())
            .collect();
        s.release(counted[0]);
        assert_eq!(s.budget_used(), 2);
        s.collected(counted[1], 5_000, 3, &mut rng);
        assert_eq!(s.budget_used(), 1);
        assert_eq!(s.active(counted[1]), 0);
        assert!(s.slot(counted[1]).unwrap().next_at > 5_000);
    }

    #[test]
    fn release_never_underflows() {
        let mut s = spawner();
        s.release(PowerUpKind::Bomb);
        assert_eq!(s.budget_used(), 0);
        assert_eq!(s.active(PowerUpKind::Bomb), 0);
    }

    #[test]
    fn update_places_actors() {
        let mut ctx = crate::tests::helpers::context(Box::new(crate::hooks::NoopHooks));
        ctx.now = 1;
        let ids = update(&mut ctx);
        assert_eq!(ids.len(), 3);
        assert_eq!(ctx.registry.count(crate::actor::ActorTag::PowerUp), 3);
        assert!(update(&mut ctx).is_empty());
    }

    proptest! {
        #[test]
        fn budget_is_never_exceeded(
            seed in any::<u64>(),
            players in 0usize..8,
            pickups in proptest::collection::vec(0usize..8, 0..40),
        ) {
            let config = PowerUpConfig::default();
            let mut s = PowerUpSpawner::new(&config);
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut live: Vec<PowerUpKind> = Vec::new();
            let mut pickups = pickups.into_iter();
            for tick in 0..2_000u64 {
                let now = tick * 50;
                live.extend(s.due(now, players, &mut rng));
                let counted = live.iter().filter(|k| k.counts_towards_budget()).count();
                prop_assert!(counted <= config.max_concurrent as usize);
                prop_assert_eq!(counted as u32, s.budget_used());
                if tick % 100 == 0 && !live.is_empty() {
                    if let Some(i) = pickups.next() {
                        let kind = live.remove(i % live.len());
                        s.collected(kind, now, players, &mut rng);
                    }
                }
            }
        }
    }
}
