//! Reporter - progress and expiry notifications for one lane
//!
//! The reporter only observes the store; removal belongs to the dispatcher,
//! which hands each dispatched alarm over for the final `Expired` event.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::domain::{AlarmId, AlarmRequest};
use crate::events::LaneEmitter;
use crate::lane::Lane;

/// The head entry currently being reported on
#[derive(Debug, Clone, Copy)]
struct Tracked {
    id: AlarmId,
    seq: u64,
    last_report: Instant,
}

pub(crate) struct Reporter {
    lane: Arc<Lane>,
    emitter: LaneEmitter,
    dispatched: mpsc::UnboundedReceiver<AlarmRequest>,
    interval: Duration,
    poll: Duration,
    shutdown: CancellationToken,
}

impl Reporter {
    pub(crate) fn new(
        lane: Arc<Lane>,
        emitter: LaneEmitter,
        dispatched: mpsc::UnboundedReceiver<AlarmRequest>,
        interval: Duration,
        poll: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        debug!(lane = lane.index(), ?interval, ?poll, "Reporter::new: called");
        Self {
            lane,
            emitter,
            dispatched,
            interval,
            poll,
            shutdown,
        }
    }

    /// Run until shutdown
    pub(crate) async fn run(mut self) {
        let lane = self.lane.index();
        info!(lane, "Reporter starting");
        let mut tracked: Option<Tracked> = None;

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                Some(alarm) = self.dispatched.recv() => {
                    debug!(lane, id = %alarm.id, "Reporter::run: alarm dispatched");
                    if tracked.is_some_and(|t| t.seq == alarm.seq) {
                        tracked = None;
                    }
                    self.emitter.expired(&alarm);
                }
                _ = tokio::time::sleep(self.poll) => {
                    tracked = self.observe(tracked).await;
                }
            }
        }

        // alarms dispatched just before shutdown still get their final event;
        // the channel closes once the dispatcher has stopped
        while let Some(alarm) = self.dispatched.recv().await {
            self.emitter.expired(&alarm);
        }
        info!(lane, "Reporter stopped");
    }

    /// Look at the head and report on it if its interval has elapsed
    async fn observe(&self, tracked: Option<Tracked>) -> Option<Tracked> {
        let store = self.lane.lock().await;
        let now = Instant::now();
        let head = store.head()?;

        let mut current = match tracked {
            Some(t) if t.seq == head.seq => t,
            _ => {
                debug!(lane = self.lane.index(), id = %head.id, seq = head.seq, "Reporter::observe: new head");
                Tracked {
                    id: head.id,
                    seq: head.seq,
                    last_report: now,
                }
            }
        };

        // a due head is left for the dispatcher; its Expired comes through the handoff
        if !head.is_due(now) && now.duration_since(current.last_report) >= self.interval {
            debug!(lane = self.lane.index(), id = %current.id, "Reporter::observe: progress");
            self.emitter.progress(head, head.seconds_remaining(now));
            current.last_report = now;
        }
        Some(current)
    }
}
