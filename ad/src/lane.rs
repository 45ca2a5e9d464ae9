//! Lanes: independent partitions of the alarm store
//!
//! Each lane pairs its store with its own lock and wait primitive, so
//! insertion pressure on one lane never holds up another.

use serde::Serialize;
use tokio::sync::{Mutex, MutexGuard};
use tokio::time::Instant;
use tracing::debug;

use crate::domain::AlarmId;
use crate::signal::LaneSignal;
use crate::store::AlarmStore;

/// One routing partition
#[derive(Debug)]
pub struct Lane {
    index: usize,
    store: Mutex<AlarmStore>,
    signal: LaneSignal,
}

impl Lane {
    pub fn new(index: usize) -> Self {
        debug!(index, "Lane::new: called");
        Self {
            index,
            store: Mutex::new(AlarmStore::new()),
            signal: LaneSignal::new(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Acquire the lane lock. Every read and write of the store goes through here.
    pub async fn lock(&self) -> MutexGuard<'_, AlarmStore> {
        self.store.lock().await
    }

    pub fn signal(&self) -> &LaneSignal {
        &self.signal
    }

    /// Copy out the pending alarms in dispatch order
    pub async fn snapshot(&self) -> LaneSnapshot {
        let store = self.lock().await;
        let now = Instant::now();
        LaneSnapshot {
            lane: self.index,
            pending: store
                .iter()
                .map(|a| PendingAlarm {
                    id: a.id,
                    delay_secs: a.delay_secs,
                    seconds_remaining: a.seconds_remaining(now),
                    message: a.message.to_string(),
                })
                .collect(),
        }
    }
}

/// Read-only view of one lane
#[derive(Debug, Clone, Serialize)]
pub struct LaneSnapshot {
    pub lane: usize,
    pub pending: Vec<PendingAlarm>,
}

/// A pending alarm as seen in a snapshot
#[derive(Debug, Clone, Serialize)]
pub struct PendingAlarm {
    pub id: AlarmId,
    pub delay_secs: u64,
    pub seconds_remaining: u64,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AlarmMessage, AlarmRequest, MessagePolicy};

    #[tokio::test(start_paused = true)]
    async fn test_snapshot_lists_in_dispatch_order() {
        let lane = Lane::new(1);
        let now = Instant::now();
        {
            let mut store = lane.lock().await;
            for (id, delay) in [(1u64, 9u64), (3, 4), (5, 6)] {
                let id = AlarmId::new(id).unwrap();
                let message = AlarmMessage::new(format!("m{}", id), MessagePolicy::Reject).unwrap();
                store.insert(AlarmRequest::new(id, 1, id.get(), delay, message, now));
            }
        }

        let snapshot = lane.snapshot().await;
        assert_eq!(snapshot.lane, 1);
        let order: Vec<u64> = snapshot.pending.iter().map(|p| p.id.get()).collect();
        assert_eq!(order, vec![3, 5, 1]);
        assert_eq!(snapshot.pending[0].seconds_remaining, 4);
        assert_eq!(snapshot.pending[0].message, "m3");
    }
}
