//! Cancellable one-shot timers driven by the caller's clock.
//!
//! Nothing fires on its own: the owner calls [`Timeline::due`] from its
//! update tick, so an entry scheduled with a zero delay still runs on the
//! next tick rather than synchronously.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Scheduled<T> {
    id: TimerId,
    deadline: Instant,
    payload: T,
}

#[derive(Debug)]
pub struct Timeline<T> {
    next_id: u64,
    entries: Vec<Scheduled<T>>,
}

impl<T> Default for Timeline<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }
}

impl<T> Timeline<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, now: Instant, delay: Duration, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Scheduled {
            id,
            deadline: now + delay,
            payload,
        });
        id
    }

    pub fn cancel(&mut self, id: TimerId) -> Option<T> {
        let index = self.entries.iter().position(|entry| entry.id == id)?;
        Some(self.entries.remove(index).payload)
    }

    /// Removes every pending entry and hands the payloads back in schedule order.
    pub fn cancel_all(&mut self) -> Vec<T> {
        self.entries.drain(..).map(|entry| entry.payload).collect()
    }

    /// Pops the entries whose deadline has passed, earliest first. Entries
    /// sharing a deadline come out in the order they were scheduled.
    pub fn due(&mut self, now: Instant) -> Vec<T> {
        let mut fired = Vec::new();
        let mut pending = Vec::with_capacity(self.entries.len());
        for entry in self.entries.drain(..) {
            if entry.deadline <= now {
                fired.push(entry);
            } else {
                pending.push(entry);
            }
        }
        self.entries = pending;

        fired.sort_by_key(|entry| (entry.deadline, entry.id.0));
        fired.into_iter().map(|entry| entry.payload).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
