//! Expiry-ordered alarm store for a single lane
//!
//! Entries are owned by the store and moved in and out; nothing outside the
//! lane lock ever holds a reference into it. The sequence is kept
//! non-decreasing by `expires_at`, with equal deadlines in arrival order.

use std::collections::VecDeque;

use tokio::time::Instant;

use crate::domain::{AlarmId, AlarmRequest};

/// Ordered pending alarms of one lane
#[derive(Debug, Default)]
pub struct AlarmStore {
    entries: VecDeque<AlarmRequest>,
}

impl AlarmStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Earliest pending alarm
    pub fn head(&self) -> Option<&AlarmRequest> {
        self.entries.front()
    }

    /// Deadline of the earliest pending alarm
    pub fn next_deadline(&self) -> Option<Instant> {
        self.head().map(|a| a.expires_at)
    }

    /// Insert after every entry due at or before the new one.
    ///
    /// Returns the position the alarm landed at.
    pub fn insert(&mut self, alarm: AlarmRequest) -> usize {
        let position = self.entries.partition_point(|e| e.expires_at <= alarm.expires_at);
        self.entries.insert(position, alarm);
        position
    }

    pub fn get(&self, position: usize) -> Option<&AlarmRequest> {
        self.entries.get(position)
    }

    pub fn position(&self, id: AlarmId) -> Option<usize> {
        self.entries.iter().position(|a| a.id == id)
    }

    pub fn contains(&self, id: AlarmId) -> bool {
        self.position(id).is_some()
    }

    /// Move the pending alarm with `id` out of the store
    pub fn remove(&mut self, id: AlarmId) -> Option<AlarmRequest> {
        let position = self.position(id)?;
        self.entries.remove(position)
    }

    /// Pop the head if its deadline has passed at `now`
    pub fn pop_due(&mut self, now: Instant) -> Option<AlarmRequest> {
        if self.head().is_some_and(|a| a.is_due(now)) {
            self.entries.pop_front()
        } else {
            None
        }
    }

    /// Discard everything, returning how many alarms were dropped
    pub fn clear(&mut self) -> usize {
        let dropped = self.entries.len();
        self.entries.clear();
        dropped
    }

    pub fn iter(&self) -> impl Iterator<Item = &AlarmRequest> {
        self.entries.iter()
    }

    /// True when deadlines are non-decreasing from head to tail
    pub fn is_ordered(&self) -> bool {
        self.entries
            .iter()
            .zip(self.entries.iter().skip(1))
            .all(|(a, b)| a.expires_at <= b.expires_at)
    }
}
