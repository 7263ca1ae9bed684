//! Virtual-clock timer queue.
//!
//! Screen timers belong to the mount that scheduled them. Remounting (any screen
//! change) drops them, so a stale timer can never navigate out of a screen it
//! was not scheduled on.

use std::cmp::{Ordering, Reverse};
use std::collections::{BTreeSet, BinaryHeap};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MountId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Mount(MountId),
    Session,
}

#[derive(Debug, Clone)]
struct Entry<T> {
    due: Duration,
    seq: u64,
    scope: Scope,
    task: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Due time first, then scheduling order.
impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.due
            .cmp(&other.due)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    now: Duration,
    next_seq: u64,
    mount: MountId,
    queue: BinaryHeap<Reverse<Entry<T>>>,
    cancelled: BTreeSet<u64>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_seq: 0,
            mount: MountId(0),
            queue: BinaryHeap::new(),
            cancelled: BTreeSet::new(),
        }
    }

    /// Virtual time since the scheduler was created.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    #[must_use]
    pub const fn mount(&self) -> MountId {
        self.mount
    }

    /// Start a new mount and drop every timer tied to the previous one.
    pub fn remount(&mut self) -> MountId {
        self.mount = MountId(self.mount.0 + 1);
        let before = self.queue.len();
        self.queue
            .retain(|Reverse(entry)| entry.scope == Scope::Session);
        let dropped = before - self.queue.len();
        if dropped > 0 {
            log::debug!("remount {:?} dropped {dropped} screen timers", self.mount);
        }
        self.mount
    }

    fn push(&mut self, delay: Duration, scope: Scope, task: T) -> TimerId {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse(Entry {
            due: self.now + delay,
            seq,
            scope,
            task,
        }));
        TimerId(seq)
    }

    /// Schedule `task` on the current mount.
    pub fn schedule(&mut self, delay: Duration, task: T) -> TimerId {
        let scope = Scope::Mount(self.mount);
        self.push(delay, scope, task)
    }

    /// Schedule `task` so that it survives screen changes.
    pub fn schedule_detached(&mut self, delay: Duration, task: T) -> TimerId {
        self.push(delay, Scope::Session, task)
    }

    /// Returns `false` if the timer already fired, was dropped, or never existed.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let live = self
            .queue
            .iter()
            .any(|Reverse(entry)| entry.seq == id.0);
        if live {
            self.cancelled.insert(id.0);
        }
        live
    }

    /// Live timers still waiting.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue
            .iter()
            .filter(|Reverse(entry)| self.is_live(entry))
            .count()
    }

    /// Live timers tied to the current mount.
    #[must_use]
    pub fn pending_on_mount(&self) -> usize {
        self.queue
            .iter()
            .filter(|Reverse(entry)| {
                entry.scope == Scope::Mount(self.mount) && self.is_live(entry)
            })
            .count()
    }

    /// Earliest due time among live timers.
    #[must_use]
    pub fn next_due(&self) -> Option<Duration> {
        self.queue
            .iter()
            .filter(|Reverse(entry)| self.is_live(entry))
            .map(|Reverse(entry)| entry.due)
            .min()
    }

    fn is_live(&self, entry: &Entry<T>) -> bool {
        let current = match entry.scope {
            Scope::Mount(mount) => mount == self.mount,
            Scope::Session => true,
        };
        current && !self.cancelled.contains(&entry.seq)
    }

    /// Pop the next live timer due at or before `until`, moving the clock to it.
    ///
    /// Callers that react to each task (and may remount) should drain with this
    /// rather than [`Scheduler::advance`].
    pub fn pop_due(&mut self, until: Duration) -> Option<T> {
        loop {
            let Reverse(next) = self.queue.peek()?;
            if next.due > until {
                return None;
            }
            let Reverse(entry) = self.queue.pop()?;
            if self.cancelled.remove(&entry.seq) || !self.is_live(&entry) {
                continue;
            }
            self.now = self.now.max(entry.due);
            return Some(entry.task);
        }
    }

    /// Move the clock forward without firing anything.
    pub fn advance_clock_to(&mut self, target: Duration) {
        self.now = self.now.max(target);
    }

    /// Advance by `dt` and return every task that came due, in order.
    pub fn advance(&mut self, dt: Duration) -> Vec<T> {
        let target = self.now + dt;
        let mut fired = Vec::new();
        while let Some(task) = self.pop_due(target) {
            fired.push(task);
        }
        self.advance_clock_to(target);
        fired
    }
}
