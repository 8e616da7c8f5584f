//! Virtual-time timer queue shared by every orchestration component.
//!
//! Components never own real timers. They schedule tasks here and the host
//! decides how time advances: wall clock in the terminal host,
//! `performance.now()` in the browser, plain integers in tests.

use std::collections::{BTreeMap, HashMap};

use log::trace;

/// Handle to a scheduled timeout or interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// A task whose due time has been reached.
#[derive(Debug, Clone, PartialEq)]
pub struct Fired<T> {
    pub id: TimerId,
    pub at_ms: u64,
    pub task: T,
}

struct Entry<T> {
    id: TimerId,
    task: T,
    period_ms: Option<u64>,
}

/// Single-threaded timer queue over a monotonic millisecond clock.
///
/// Due tasks are handed out in due order; ties go to whichever was
/// scheduled first. Intervals are re-armed *before* their task is handed
/// out, so a handler that cancels its own interval stops it for good.
pub struct Scheduler<T> {
    now_ms: u64,
    next_seq: u64,
    /// Keyed by (due time, insertion sequence).
    queue: BTreeMap<(u64, u64), Entry<T>>,
    slots: HashMap<TimerId, (u64, u64)>,
}

impl<T: Clone> Scheduler<T> {
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    pub fn starting_at(now_ms: u64) -> Self {
        Self {
            now_ms,
            next_seq: 0,
            queue: BTreeMap::new(),
            slots: HashMap::new(),
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Number of armed timers.
    pub fn pending(&self) -> usize {
        self.slots.len()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.slots.contains_key(&id)
    }

    /// Due time of the earliest armed timer.
    pub fn next_due(&self) -> Option<u64> {
        self.queue.keys().next().map(|&(due, _)| due)
    }

    /// Run `task` once, `delay_ms` from now.
    pub fn set_timeout(&mut self, delay_ms: u64, task: T) -> TimerId {
        self.insert(delay_ms, task, None)
    }

    /// Run `task` every `period_ms`, first one period from now. A zero
    /// period is treated as 1 ms.
    pub fn set_interval(&mut self, period_ms: u64, task: T) -> TimerId {
        let period_ms = period_ms.max(1);
        self.insert(period_ms, task, Some(period_ms))
    }

    /// Disarm a timer. Returns whether it was still armed; cancelling a
    /// fired, cancelled or unknown timer is a no-op.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.slots.remove(&id) {
            Some(key) => {
                self.queue.remove(&key);
                trace!("scheduler: cancelled {id:?}");
                true
            }
            None => false,
        }
    }

    /// Cancel the timer held in `slot`, if any, and clear the slot.
    pub fn cancel_slot(&mut self, slot: &mut Option<TimerId>) {
        if let Some(id) = slot.take() {
            self.cancel(id);
        }
    }

    /// Disarm everything.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.slots.clear();
    }

    /// Pop the earliest task due at or before `until_ms`, advancing the
    /// clock to its due time.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<Fired<T>> {
        let (&key, _) = self.queue.iter().next()?;
        let (due, _) = key;
        if due > until_ms {
            return None;
        }
        let entry = self.queue.remove(&key)?;
        self.now_ms = self.now_ms.max(due);
        let id = entry.id;

        let task = match entry.period_ms {
            Some(period) => {
                let seq = self.bump_seq();
                let next_key = (due.saturating_add(period), seq);
                self.slots.insert(id, next_key);
                let task = entry.task.clone();
                self.queue.insert(next_key, entry);
                task
            }
            None => {
                self.slots.remove(&id);
                entry.task
            }
        };

        Some(Fired {
            id,
            at_ms: due,
            task,
        })
    }

    /// Advance the clock to `until_ms`, handing each due task to `handle`
    /// together with the scheduler so the handler can re-arm or cancel.
    /// Returns how many tasks ran.
    pub fn run_until(&mut self, until_ms: u64, mut handle: impl FnMut(&mut Self, Fired<T>)) -> usize {
        let mut ran = 0;
        while let Some(fired) = self.pop_due(until_ms) {
            handle(self, fired);
            ran += 1;
        }
        self.advance_clock(until_ms);
        ran
    }

    /// Move the clock forward without running anything. Callers that drive
    /// `pop_due` themselves finish a step with this; it never goes back.
    pub fn advance_clock(&mut self, until_ms: u64) {
        self.now_ms = self.now_ms.max(until_ms);
    }

    fn insert(&mut self, delay_ms: u64, task: T, period_ms: Option<u64>) -> TimerId {
        let seq = self.bump_seq();
        let id = TimerId(seq);
        let key = (self.now_ms.saturating_add(delay_ms), seq);
        self.queue.insert(key, Entry { id, task, period_ms });
        self.slots.insert(id, key);
        trace!("scheduler: armed {id:?} due at {} ms", key.0);
        id
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}

impl<T: Clone> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}
