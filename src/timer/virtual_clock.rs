//! Deterministic timer queue with explicitly advanced time.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use super::{Task, TimerId, Timers};

/// A virtual clock holding scheduled items of type `T`.
///
/// Nothing happens on its own: a driver repeatedly calls [`pop_until`] to
/// take the earliest due item, which moves `now` forward to that item's due
/// time. Items due at the same instant come out in the order they were
/// scheduled.
///
/// `T` only needs to be constructible from a [`Task`] for the clock to act
/// as [`Timers`], so a driver can mix its own events into the same queue.
///
/// [`pop_until`]: VirtualClock::pop_until
#[derive(Debug)]
pub struct VirtualClock<T> {
    now: Duration,
    next_id: u64,
    /// Keyed by (due, id); ids are monotonic so equal due times stay FIFO
    queue: BTreeMap<(Duration, u64), T>,
    /// id -> due, for cancellation
    index: HashMap<u64, Duration>,
}

impl<T> VirtualClock<T> {
    /// Create a clock at time zero with nothing scheduled.
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            queue: BTreeMap::new(),
            index: HashMap::new(),
        }
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Schedule `item` to become due `delay` from now.
    pub fn push(&mut self, delay: Duration, item: T) -> TimerId {
        self.push_at(self.now + delay, item)
    }

    /// Schedule `item` at an absolute virtual time.
    ///
    /// Times in the past are clamped to `now`.
    pub fn push_at(&mut self, at: Duration, item: T) -> TimerId {
        let due = at.max(self.now);
        let id = self.next_id;
        self.next_id += 1;
        self.queue.insert((due, id), item);
        self.index.insert(id, due);
        TimerId(id)
    }

    /// Remove a pending item, returning it if it was still queued.
    pub fn remove(&mut self, id: TimerId) -> Option<T> {
        let due = self.index.remove(&id.0)?;
        self.queue.remove(&(due, id.0))
    }

    /// Whether the item behind `id` is still queued.
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.index.contains_key(&id.0)
    }

    /// Due time of the earliest queued item.
    pub fn next_due(&self) -> Option<Duration> {
        self.queue.keys().next().map(|(due, _)| *due)
    }

    /// Take the earliest item if it is due at or before `deadline`,
    /// advancing `now` to its due time.
    pub fn pop_until(&mut self, deadline: Duration) -> Option<(TimerId, T)> {
        let (&(due, id), _) = self.queue.iter().next()?;
        if due > deadline {
            return None;
        }
        let item = self.queue.remove(&(due, id))?;
        self.index.remove(&id);
        self.now = self.now.max(due);
        Some((TimerId(id), item))
    }

    /// Move `now` forward without running anything. Never moves backwards.
    pub fn advance_to(&mut self, at: Duration) {
        self.now = self.now.max(at);
    }

    /// Queued items in due order.
    pub fn pending(&self) -> impl Iterator<Item = &T> {
        self.queue.values()
    }

    /// Number of queued items.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl<T> Default for VirtualClock<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: From<Task>> Timers for VirtualClock<T> {
    fn schedule(&mut self, delay: Duration, task: Task) -> TimerId {
        self.push(delay, T::from(task))
    }

    fn cancel(&mut self, id: TimerId) {
        self.remove(id);
    }
}
