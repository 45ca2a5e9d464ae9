//! Dispatcher - removes alarms from a lane once their deadline has passed
//!
//! Each wake (timeout or signal) re-reads the head under the lane lock; a
//! head captured before the wait is never trusted. Removal only happens when
//! the clock says the deadline is genuinely behind us, so a spurious or early
//! wake just re-arms the wait.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::domain::{AlarmRequest, AlarmState};
use crate::lane::Lane;

/// Dispatcher state for one lane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    /// Store is empty; waiting for a signal
    Idle,
    /// Waiting for the head alarm's deadline
    Waiting(Instant),
    /// Shutting down
    Draining,
}

pub(crate) struct Dispatcher {
    lane: Arc<Lane>,
    handoff: mpsc::UnboundedSender<AlarmRequest>,
    shutdown: CancellationToken,
}

impl Dispatcher {
    pub(crate) fn new(
        lane: Arc<Lane>,
        handoff: mpsc::UnboundedSender<AlarmRequest>,
        shutdown: CancellationToken,
    ) -> Self {
        debug!(lane = lane.index(), "Dispatcher::new: called");
        Self {
            lane,
            handoff,
            shutdown,
        }
    }

    /// Run until shutdown
    pub(crate) async fn run(self) {
        let lane = self.lane.index();
        info!(lane, "Dispatcher starting");
        let mut state = DispatchState::Idle;

        loop {
            let next = self.dispatch_due().await;
            if next != state {
                debug!(lane, from = ?state, to = ?next, "Dispatcher::run: state change");
                state = next;
            }

            let deadline = match state {
                DispatchState::Idle => None,
                DispatchState::Waiting(deadline) => Some(deadline),
                DispatchState::Draining => break,
            };

            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    state = DispatchState::Draining;
                    break;
                }
                wake = self.lane.signal().wait_until(deadline) => {
                    trace!(lane, ?wake, "Dispatcher::run: woke");
                }
            }
        }

        debug!(lane, ?state, "Dispatcher::run: leaving loop");
        self.drain().await;
    }

    /// Remove and hand off every head alarm that is due, then work out what
    /// to wait for next.
    async fn dispatch_due(&self) -> DispatchState {
        let mut store = self.lane.lock().await;
        let now = Instant::now();

        while let Some(mut alarm) = store.pop_due(now) {
            if store.head().is_some_and(|h| h.expires_at < alarm.expires_at) {
                error!(
                    lane = self.lane.index(),
                    id = %alarm.id,
                    "Dispatcher: lane store out of expiry order"
                );
                panic!(
                    "lane {} dispatched alarm {} out of expiry order",
                    self.lane.index(),
                    alarm.id
                );
            }

            alarm.state = AlarmState::Dispatched;
            info!(lane = self.lane.index(), id = %alarm.id, "Alarm dispatched");
            if self.handoff.send(alarm).is_err() {
                warn!(lane = self.lane.index(), "Dispatcher: reporter is gone, dropping alarm");
            }
        }

        match store.next_deadline() {
            Some(deadline) => DispatchState::Waiting(deadline),
            None => DispatchState::Idle,
        }
    }

    /// Pending alarms are not persisted; drop them
    async fn drain(&self) {
        let dropped = self.lane.lock().await.clear();
        if dropped > 0 {
            warn!(lane = self.lane.index(), dropped, "Dispatcher: discarding pending alarms on shutdown");
        }
        info!(lane = self.lane.index(), "Dispatcher stopped");
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::domain::{AlarmId, AlarmMessage, MessagePolicy};

    async fn push(lane: &Lane, id: u64, delay: u64, seq: u64) {
        let id = AlarmId::new(id).unwrap();
        let message = AlarmMessage::new(format!("alarm {}", id), MessagePolicy::Reject).unwrap();
        lane.lock()
            .await
            .insert(AlarmRequest::new(id, lane.index(), seq, delay, message, Instant::now()));
        lane.signal().notify();
    }

    fn spawn(lane: &Arc<Lane>) -> (mpsc::UnboundedReceiver<AlarmRequest>, CancellationToken) {
        let (tx, rx) = mpsc::unbounded_channel();
        let token = CancellationToken::new();
        tokio::spawn(Dispatcher::new(lane.clone(), tx, token.clone()).run());
        (rx, token)
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispatches_in_deadline_order() {
        let lane = Arc::new(Lane::new(0));
        let (mut rx, _token) = spawn(&lane);
        let start = Instant::now();

        push(&lane, 2, 5, 1).await;
        push(&lane, 4, 2, 2).await;
        push(&lane, 6, 8, 3).await;

        for (id, delay) in [(4, 2), (2, 5), (6, 8)] {
            let alarm = rx.recv().await.unwrap();
            assert_eq!(alarm.id.get(), id);
            assert_eq!(alarm.state, AlarmState::Dispatched);
            assert!(Instant::now() >= start + Duration::from_secs(delay));
        }
        assert!(lane.lock().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_urgent_insert_preempts_wait() {
        let lane = Arc::new(Lane::new(0));
        let (mut rx, _token) = spawn(&lane);
        let start = Instant::now();

        push(&lane, 2, 60, 1).await;
        tokio::time::sleep(Duration::from_secs(1)).await;
        push(&lane, 4, 1, 2).await;

        let alarm = rx.recv().await.unwrap();
        assert_eq!(alarm.id.get(), 4);
        assert!(Instant::now() < start + Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_removed_head_is_not_dispatched() {
        let lane = Arc::new(Lane::new(0));
        let (mut rx, _token) = spawn(&lane);

        push(&lane, 2, 3, 1).await;
        push(&lane, 4, 6, 2).await;
        tokio::time::sleep(Duration::from_secs(1)).await;
        lane.lock().await.remove(AlarmId::new(2).unwrap());
        lane.signal().notify();

        assert_eq!(rx.recv().await.unwrap().id.get(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_drains_pending() {
        let lane = Arc::new(Lane::new(0));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let token = CancellationToken::new();
        let handle = tokio::spawn(Dispatcher::new(lane.clone(), tx, token.clone()).run());

        push(&lane, 2, 30, 1).await;
        tokio::time::sleep(Duration::from_secs(1)).await;
        token.cancel();
        handle.await.unwrap();

        assert!(lane.lock().await.is_empty());
        // sender dropped with the dispatcher, nothing was handed off
        assert!(rx.recv().await.is_none());
    }
}
