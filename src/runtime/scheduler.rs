use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

/// Handle of a scheduled timer, used for cancellation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

#[derive(Debug)]
struct Entry<E> {
    due_ms: f64,
    seq: u64,
    event: E,
}

impl<E> PartialEq for Entry<E> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<E> Eq for Entry<E> {}

impl<E> PartialOrd for Entry<E> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<E> Ord for Entry<E> {
    // Reversed so the max-heap pops the earliest (due, seq) first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due_ms
            .total_cmp(&self.due_ms)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Single-threaded timer queue over a monotonically advancing clock.
///
/// Events due at the same time fire in scheduling order. Cancelled timers are dropped lazily
/// when they reach the front of the queue.
#[derive(Debug)]
pub struct Scheduler<E> {
    now_ms: f64,
    next_seq: u64,
    heap: BinaryHeap<Entry<E>>,
    pending: HashSet<u64>,
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl<E> Scheduler<E> {
    pub fn new(start_ms: f64) -> Self {
        Self {
            now_ms: start_ms,
            next_seq: 0,
            heap: BinaryHeap::new(),
            pending: HashSet::new(),
        }
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Schedule `event` `delay_ms` after the current time (negative delays fire immediately).
    pub fn schedule_after(&mut self, delay_ms: f64, event: E) -> TimerId {
        let delay = if delay_ms.is_nan() { 0.0 } else { delay_ms.max(0.0) };
        self.schedule_at(self.now_ms + delay, event)
    }

    /// Schedule `event` at an absolute time; times in the past fire on the next pop.
    pub fn schedule_at(&mut self, due_ms: f64, event: E) -> TimerId {
        let seq = self.next_seq;
        self.next_seq += 1;
        let due_ms = if due_ms.is_nan() { self.now_ms } else { due_ms };
        self.heap.push(Entry { due_ms, seq, event });
        self.pending.insert(seq);
        TimerId(seq)
    }

    /// Cancel a timer. Returns `false` if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.pending.remove(&id.0)
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.contains(&id.0)
    }

    /// Number of live (not fired, not cancelled) timers.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Due time of the earliest live timer.
    pub fn next_due_ms(&mut self) -> Option<f64> {
        self.discard_cancelled();
        self.heap.peek().map(|e| e.due_ms)
    }

    /// Pop the earliest live timer due at or before `until_ms`, advancing the clock to its due
    /// time (never backwards).
    pub fn pop_due(&mut self, until_ms: f64) -> Option<(TimerId, E)> {
        self.discard_cancelled();
        if self.heap.peek()?.due_ms > until_ms {
            return None;
        }
        let entry = self.heap.pop()?;
        self.pending.remove(&entry.seq);
        self.now_ms = self.now_ms.max(entry.due_ms);
        Some((TimerId(entry.seq), entry.event))
    }

    /// Move the clock forward without firing anything.
    pub fn advance_to(&mut self, ms: f64) {
        if ms > self.now_ms {
            self.now_ms = ms;
        }
    }

    fn discard_cancelled(&mut self) {
        while let Some(top) = self.heap.peek() {
            if self.pending.contains(&top.seq) {
                break;
            }
            self.heap.pop();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/runtime/scheduler.rs"]
mod tests;
