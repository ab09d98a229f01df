//! Deferred work keyed by the simulation clock.
//!
//! Round transitions, bomb pulses, projectile lifetimes and respawns are all
//! [`TimedEvent`]s in one [`EventQueue`]. The world drains the queue once per
//! tick; an event scheduled while draining that is already due runs in the
//! same drain. Ties on the due time resolve in scheduling order, which keeps
//! replays deterministic.
//!
//! # Example
//!
//! ```
//! use skirmish_core::schedule::{EventQueue, TimedEvent};
//!
//! let mut queue = EventQueue::new();
//! let end = queue.schedule(500, TimedEvent::EndRound);
//! queue.schedule(100, TimedEvent::StartRound);
//!
//! assert!(queue.cancel(end));
//! assert_eq!(queue.pop_due(1_000).map(|due| due.event), Some(TimedEvent::StartRound));
//! assert!(queue.pop_due(1_000).is_none());
//! ```

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

use crate::actor::ActorId;
use crate::resolver::bomb::Blast;
use crate::roster::PlayerId;

/// Simulation time in milliseconds.
pub type Millis = u64;

/// Handle for cancelling a scheduled event.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventId(u64);

impl EventId {
    /// The raw sequence number.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

/// Something that happens at a point in simulation time.
#[derive(Debug, Clone, PartialEq)]
pub enum TimedEvent {
    /// The active round's timer ran out.
    EndRound,
    /// The intermission is over.
    StartRound,
    /// One pulse of a bomb blast.
    BombPulse(Blast),
    /// An actor reached the end of its lifetime. Bombs detonate, everything
    /// else is simply destroyed.
    Expire(ActorId),
    /// A dead player's ship comes back.
    Respawn(PlayerId),
}

/// An event popped from the queue.
#[derive(Debug, Clone, PartialEq)]
pub struct DueEvent {
    /// Handle the event was scheduled under.
    pub id: EventId,
    /// Time the event was due, which may be earlier than the current tick.
    pub due: Millis,
    /// The event itself.
    pub event: TimedEvent,
}

#[derive(Debug)]
struct Entry {
    due: Millis,
    id: EventId,
    event: TimedEvent,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.id == other.id
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    // `BinaryHeap` is a max-heap; reverse so the earliest (due, seq) pops first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.id.cmp(&self.id))
    }
}

/// Min-queue of timed events with cancellation.
#[derive(Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<Entry>,
    next_seq: u64,
}

impl EventQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `event` at `due` and returns its cancellation handle.
    pub fn schedule(&mut self, due: Millis, event: TimedEvent) -> EventId {
        let id = EventId(self.next_seq);
        self.next_seq += 1;
        self.heap.push(Entry { due, id, event });
        id
    }

    /// Cancels one event. Returns `false` if it already ran or never existed.
    pub fn cancel(&mut self, id: EventId) -> bool {
        let before = self.heap.len();
        self.heap.retain(|entry| entry.id != id);
        self.heap.len() != before
    }

    /// Cancels every pending event matching `predicate`. Returns how many
    /// were cancelled.
    pub fn cancel_where<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&TimedEvent) -> bool,
    {
        let before = self.heap.len();
        self.heap.retain(|entry| !predicate(&entry.event));
        before - self.heap.len()
    }

    /// Pops the earliest event if it is due at `now`.
    pub fn pop_due(&mut self, now: Millis) -> Option<DueEvent> {
        if self.heap.peek()?.due > now {
            return None;
        }
        self.heap.pop().map(|entry| DueEvent {
            id: entry.id,
            due: entry.due,
            event: entry.event,
        })
    }

    /// Due time of a pending event.
    #[must_use]
    pub fn due_of(&self, id: EventId) -> Option<Millis> {
        self.heap
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.due)
    }

    /// Whether any pending event matches `predicate`.
    #[must_use]
    pub fn any<F>(&self, mut predicate: F) -> bool
    where
        F: FnMut(&TimedEvent) -> bool,
    {
        self.heap.iter().any(|entry| predicate(&entry.event))
    }

    /// Number of pending events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Whether nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(queue: &mut EventQueue, now: Millis) -> Vec<TimedEvent> {
        std::iter::from_fn(|| queue.pop_due(now).map(|due| due.event)).collect()
    }

    #[test]
    fn pops_in_due_order() {
        let mut queue = EventQueue::new();
        queue.schedule(300, TimedEvent::Respawn(PlayerId::new(3)));
        queue.schedule(100, TimedEvent::Respawn(PlayerId::new(1)));
        queue.schedule(200, TimedEvent::Respawn(PlayerId::new(2)));

        assert_eq!(
            drain(&mut queue, 1_000),
            vec![
                TimedEvent::Respawn(PlayerId::new(1)),
                TimedEvent::Respawn(PlayerId::new(2)),
                TimedEvent::Respawn(PlayerId::new(3)),
            ]
        );
    }

    #[test]
    fn ties_pop_in_scheduling_order() {
        let mut queue = EventQueue::new();
        queue.schedule(100, TimedEvent::EndRound);
        queue.schedule(100, TimedEvent::StartRound);
        assert_eq!(
            drain(&mut queue, 100),
            vec![TimedEvent::EndRound, TimedEvent::StartRound]
        );
    }

    #[test]
    fn future_events_stay() {
        let mut queue = EventQueue::new();
        queue.schedule(100, TimedEvent::EndRound);
        assert!(queue.pop_due(99).is_none());
        assert_eq!(queue.len(), 1);
        let due = queue.pop_due(150).unwrap();
        assert_eq!(due.due, 100);
    }

    #[test]
    fn cancel_by_id() {
        let mut queue = EventQueue::new();
        let a = queue.schedule(100, TimedEvent::EndRound);
        queue.schedule(100, TimedEvent::StartRound);
        assert_eq!(queue.due_of(a), Some(100));
        assert!(queue.cancel(a));
        assert!(!queue.cancel(a));
        assert_eq!(queue.due_of(a), None);
        assert_eq!(drain(&mut queue, 100), vec![TimedEvent::StartRound]);
    }

    #[test]
    fn cancel_by_predicate() {
        let mut queue = EventQueue::new();
        queue.schedule(10, TimedEvent::Expire(ActorId::new(1)));
        queue.schedule(20, TimedEvent::Expire(ActorId::new(2)));
        queue.schedule(30, TimedEvent::EndRound);

        let cancelled = queue.cancel_where(|event| matches!(event, TimedEvent::Expire(_)));
        assert_eq!(cancelled, 2);
        assert!(!queue.any(|event| matches!(event, TimedEvent::Expire(_))));
        assert_eq!(drain(&mut queue, 100), vec![TimedEvent::EndRound]);
    }

    #[test]
    fn events_scheduled_mid_drain_run_if_due() {
        let mut queue = EventQueue::new();
        queue.schedule(50, TimedEvent::EndRound);

        let mut seen = Vec::new();
        while let Some(due) = queue.pop_due(100) {
            if due.event == TimedEvent::EndRound {
                queue.schedule(due.due + 25, TimedEvent::StartRound);
                queue.schedule(due.due + 500, TimedEvent::EndRound);
            }
            seen.push(due.event);
        }

        assert_eq!(seen, vec![TimedEvent::EndRound, TimedEvent::StartRound]);
        assert_eq!(queue.len(), 1);
    }
}
