//! Deferred actions keyed by simulation time.
//!
//! Timed sequences (wave delays, staggered spawns, reloads, respawns) are
//! entries in a min-heap ordered by due time, then by insertion. The engine
//! drains due entries at the start of every tick. Cancelling removes an entry
//! before it fires; nothing is ever in flight between two checks.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use hecs::Entity;

/// Handle to a scheduled entry, usable for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionId(u64);

/// Actions the simulation defers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    StartWave,
    /// Spawn the next enemy of `wave`; `remaining` counts this one.
    SpawnEnemy { wave: u32, remaining: u32 },
    /// Close the spawn sequence of `wave`.
    EndWaveSpawn { wave: u32 },
    Respawn { entity: Entity },
    Destroy { entity: Entity },
    FinishReload { entity: Entity },
}

impl Action {
    /// Whether this action belongs to the wave cycle.
    pub fn is_wave_action(&self) -> bool {
        matches!(
            self,
            Action::StartWave | Action::SpawnEnemy { .. } | Action::EndWaveSpawn { .. }
        )
    }
}

#[derive(Debug)]
struct Entry<A> {
    due_secs: f64,
    id: ActionId,
    action: A,
}

impl<A> PartialEq for Entry<A> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<A> Eq for Entry<A> {}

impl<A> PartialOrd for Entry<A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<A> Ord for Entry<A> {
    // Reversed: BinaryHeap is a max-heap and the earliest entry must surface first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due_secs
            .total_cmp(&self.due_secs)
            .then_with(|| other.id.cmp(&self.id))
    }
}

/// Min-heap of pending actions.
#[derive(Debug)]
pub struct Scheduler<A> {
    heap: BinaryHeap<Entry<A>>,
    next_id: u64,
}

impl<A> Default for Scheduler<A> {
    fn default() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_id: 0,
        }
    }
}

impl<A> Scheduler<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `action` to fire once the clock reaches `due_secs`.
    pub fn schedule(&mut self, due_secs: f64, action: A) -> ActionId {
        let id = ActionId(self.next_id);
        self.next_id += 1;
        self.heap.push(Entry {
            due_secs,
            id,
            action,
        });
        id
    }

    /// Remove and return the earliest action due at `now`, if any.
    pub fn pop_due(&mut self, now: f64) -> Option<A> {
        if self.heap.peek()?.due_secs > now {
            return None;
        }
        self.heap.pop().map(|entry| entry.action)
    }

    /// Cancel one entry. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: ActionId) -> bool {
        let before = self.heap.len();
        self.heap.retain(|entry| entry.id != id);
        self.heap.len() != before
    }

    /// Cancel every entry whose action matches. Returns how many were removed.
    pub fn cancel_where(&mut self, mut predicate: impl FnMut(&A) -> bool) -> usize {
        let before = self.heap.len();
        self.heap.retain(|entry| !predicate(&entry.action));
        before - self.heap.len()
    }

    pub fn is_pending(&self, mut predicate: impl FnMut(&A) -> bool) -> bool {
        self.heap.iter().any(|entry| predicate(&entry.action))
    }

    /// Due time of the earliest entry.
    pub fn next_due(&self) -> Option<f64> {
        self.heap.peek().map(|entry| entry.due_secs)
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
