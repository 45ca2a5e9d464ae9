//! Intake - the front desk for submit and cancel requests
//!
//! Validation happens before any lock is taken, so a rejected request never
//! touches a store. Accepted mutations happen under the lane lock, emit their
//! event while still holding it (keeping `Submitted` ahead of any `Expired`
//! for the same entry), then signal the lane's dispatcher.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::MutexGuard;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::config::EngineConfig;
use super::error::{CancelError, SubmitError};
use crate::domain::{
    AlarmId, AlarmMessage, AlarmRequest, AlarmState, MAX_ALARM_ID, MessagePolicy, validate_delay,
};
use crate::events::{EventBus, LaneEmitter};
use crate::lane::{Lane, LaneSnapshot};
use crate::store::AlarmStore;

/// Successful submit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accepted {
    pub id: AlarmId,
    pub lane: usize,
    pub delay_secs: u64,
    pub message: AlarmMessage,
    /// A pending alarm with the same id was superseded
    pub replaced: bool,
    /// Position in the lane's dispatch order at the time of insertion
    pub position: usize,
}

/// Successful cancel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cancelled {
    pub id: AlarmId,
    pub lane: usize,
    pub message: AlarmMessage,
}

/// Cloneable handle for submitting and cancelling alarms
#[derive(Clone)]
pub struct Intake {
    lanes: Arc<[Arc<Lane>]>,
    emitters: Arc<[LaneEmitter]>,
    policy: MessagePolicy,
    max_pending_per_lane: usize,
    next_id: Arc<AtomicU64>,
    next_seq: Arc<AtomicU64>,
    shutdown: CancellationToken,
}

impl Intake {
    pub(crate) fn new(
        lanes: Arc<[Arc<Lane>]>,
        bus: &EventBus,
        config: &EngineConfig,
        shutdown: CancellationToken,
    ) -> Self {
        debug!(lanes = lanes.len(), "Intake::new: called");
        let emitters: Arc<[LaneEmitter]> = lanes.iter().map(|l| bus.emitter_for(l.index())).collect();
        Self {
            lanes,
            emitters,
            policy: config.message_policy,
            max_pending_per_lane: config.max_pending_per_lane,
            // request numbers start at 1
            next_id: Arc::new(AtomicU64::new(1)),
            next_seq: Arc::new(AtomicU64::new(1)),
            shutdown,
        }
    }

    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    /// Schedule an alarm `delay_secs` from now.
    ///
    /// With `id` of `None` the next free system id is used. If `id` is
    /// already pending, the pending alarm takes the new message and deadline
    /// and moves to the position the new deadline implies.
    pub async fn submit(&self, id: Option<u64>, delay_secs: i64, message: &str) -> Result<Accepted, SubmitError> {
        debug!(?id, delay_secs, "Intake::submit: called");
        if self.shutdown.is_cancelled() {
            debug!("Intake::submit: engine shutting down");
            return Err(SubmitError::ShutDown);
        }

        let result = self.try_submit(id, delay_secs, message).await;
        if let Err(e) = &result {
            warn!(?id, delay_secs, error = %e, "Submit rejected");
        }
        result
    }

    async fn try_submit(&self, id: Option<u64>, delay_secs: i64, message: &str) -> Result<Accepted, SubmitError> {
        let delay_secs = validate_delay(delay_secs)?;
        let message = AlarmMessage::new(message, self.policy)?;

        let (lane, mut store, id) = match id {
            Some(raw) => {
                let id = AlarmId::new(raw)?;
                let lane = self.lane_for(id);
                (lane, lane.lock().await, id)
            }
            None => self.reserve_id().await?,
        };

        let now = Instant::now();
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let (position, replaced) = match store.remove(id) {
            Some(mut existing) => {
                debug!(%id, old_seq = existing.seq, seq, "Intake::submit: superseding pending alarm");
                existing.supersede(seq, delay_secs, message.clone(), now);
                (store.insert(existing), true)
            }
            None => {
                if store.len() >= self.max_pending_per_lane {
                    return Err(SubmitError::LaneFull {
                        lane: lane.index(),
                        capacity: self.max_pending_per_lane,
                    });
                }
                let alarm = AlarmRequest::new(id, lane.index(), seq, delay_secs, message.clone(), now);
                (store.insert(alarm), false)
            }
        };
        debug_assert!(store.is_ordered(), "lane {} out of expiry order", lane.index());

        if let Some(alarm) = store.get(position) {
            self.emitter(lane).submitted(alarm, replaced);
        }
        drop(store);
        lane.signal().notify();

        info!(%id, lane = lane.index(), delay_secs, replaced, position, "Alarm accepted");
        Ok(Accepted {
            id,
            lane: lane.index(),
            delay_secs,
            message,
            replaced,
            position,
        })
    }

    /// Cancel the pending alarm with `id`
    pub async fn cancel(&self, id: u64) -> Result<Cancelled, CancelError> {
        debug!(id, "Intake::cancel: called");
        if self.shutdown.is_cancelled() {
            debug!("Intake::cancel: engine shutting down");
            return Err(CancelError::ShutDown);
        }

        let id = AlarmId::new(id)?;
        let lane = self.lane_for(id);
        let mut store = lane.lock().await;

        let Some(mut alarm) = store.remove(id) else {
            drop(store);
            debug!(%id, lane = lane.index(), "Intake::cancel: no pending alarm");
            return Err(CancelError::NotFound { id });
        };
        alarm.state = AlarmState::Cancelled;
        self.emitter(lane).cancelled(&alarm);
        drop(store);
        lane.signal().notify();

        info!(%id, lane = lane.index(), "Alarm cancelled");
        Ok(Cancelled {
            id,
            lane: lane.index(),
            message: alarm.message,
        })
    }

    /// Pending alarms of every lane, in dispatch order
    pub async fn snapshot(&self) -> Vec<LaneSnapshot> {
        debug!("Intake::snapshot: called");
        let mut snapshots = Vec::with_capacity(self.lanes.len());
        for lane in self.lanes.iter() {
            snapshots.push(lane.snapshot().await);
        }
        snapshots
    }

    fn lane_for(&self, id: AlarmId) -> &Lane {
        &self.lanes[id.lane(self.lanes.len())]
    }

    fn emitter(&self, lane: &Lane) -> &LaneEmitter {
        &self.emitters[lane.index()]
    }

    /// Draw system ids until one is free in a lane with room, returning with
    /// that lane locked so the id cannot be taken in between.
    async fn reserve_id(&self) -> Result<(&Lane, MutexGuard<'_, AlarmStore>, AlarmId), SubmitError> {
        // consecutive ids cycle the lanes, so every lane with room is seen
        // max_pending + 1 times and one of those ids must be free
        let attempts = self
            .lanes
            .len()
            .saturating_mul(self.max_pending_per_lane.saturating_add(1))
            .saturating_add(1);
        let mut last_lane = 0;
        for _ in 0..attempts {
            let raw = self.next_id.fetch_add(1, Ordering::Relaxed) % (MAX_ALARM_ID + 1);
            let id = AlarmId::new(raw)?;
            let lane = self.lane_for(id);
            let store = lane.lock().await;
            if store.len() < self.max_pending_per_lane && !store.contains(id) {
                debug!(%id, lane = lane.index(), "Intake::reserve_id: assigned");
                return Ok((lane, store, id));
            }
            last_lane = lane.index();
        }
        Err(SubmitError::LaneFull {
            lane: last_lane,
            capacity: self.max_pending_per_lane,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intake(config: &EngineConfig) -> (Intake, EventBus) {
        let bus = EventBus::new(64);
        let lanes: Arc<[Arc<Lane>]> = (0..config.lanes).map(|i| Arc::new(Lane::new(i))).collect();
        let intake = Intake::new(lanes, &bus, config, CancellationToken::new());
        (intake, bus)
    }

    async fn lane_ids(intake: &Intake, lane: usize) -> Vec<u64> {
        intake.snapshot().await[lane].pending.iter().map(|p| p.id.get()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_routes_by_parity() {
        let (intake, _bus) = intake(&EngineConfig::default());

        let even = intake.submit(Some(4), 5, "even").await.unwrap();
        let odd = intake.submit(Some(7), 5, "odd").await.unwrap();
        assert_eq!(even.lane, 0);
        assert_eq!(odd.lane, 1);
        assert_eq!(lane_ids(&intake, 0).await, vec![4]);
        assert_eq!(lane_ids(&intake, 1).await, vec![7]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejections_leave_stores_untouched() {
        let (intake, _bus) = intake(&EngineConfig::default());

        assert!(matches!(
            intake.submit(Some(2), -1, "late").await,
            Err(SubmitError::Invalid(crate::domain::ValidationError::NegativeDelay { .. }))
        ));
        let long = "z".repeat(crate::domain::MAX_MESSAGE_LEN + 1);
        assert!(matches!(
            intake.submit(Some(2), 3, &long).await,
            Err(SubmitError::Invalid(crate::domain::ValidationError::MessageTooLong { .. }))
        ));
        assert!(matches!(
            intake.submit(Some(MAX_ALARM_ID + 1), 3, "big").await,
            Err(SubmitError::Invalid(crate::domain::ValidationError::IdOutOfRange { .. }))
        ));

        for snapshot in intake.snapshot().await {
            assert!(snapshot.pending.is_empty());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_truncate_policy_accepts_long_message() {
        let config = EngineConfig {
            message_policy: MessagePolicy::Truncate,
            ..Default::default()
        };
        let (intake, _bus) = intake(&config);
        let long = "z".repeat(crate::domain::MAX_MESSAGE_LEN + 10);

        let accepted = intake.submit(Some(2), 3, &long).await.unwrap();
        assert_eq!(accepted.message.len(), crate::domain::MAX_MESSAGE_LEN);
    }

    #[tokio::test(start_paused = true)]
    async fn test_replace_repositions_entry() {
        let (intake, _bus) = intake(&EngineConfig::default());
        intake.submit(Some(3), 10, "first").await.unwrap();
        intake.submit(Some(5), 6, "other").await.unwrap();
        assert_eq!(lane_ids(&intake, 1).await, vec![5, 3]);

        let accepted = intake.submit(Some(3), 2, "second").await.unwrap();
        assert!(accepted.replaced);
        assert_eq!(accepted.position, 0);

        let snapshot = &intake.snapshot().await[1];
        assert_eq!(snapshot.pending.len(), 2);
        assert_eq!(snapshot.pending[0].id.get(), 3);
        assert_eq!(snapshot.pending[0].message, "second");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_then_cancel_again() {
        let (intake, bus) = intake(&EngineConfig::default());
        let mut rx = bus.subscribe();
        intake.submit(Some(7), 10, "meeting").await.unwrap();

        let cancelled = intake.cancel(7).await.unwrap();
        assert_eq!(cancelled.lane, 1);
        assert_eq!(cancelled.message.as_str(), "meeting");
        assert_eq!(
            intake.cancel(7).await,
            Err(CancelError::NotFound {
                id: AlarmId::new(7).unwrap()
            })
        );

        assert_eq!(rx.recv().await.unwrap().event_type(), "Submitted");
        assert_eq!(rx.recv().await.unwrap().event_type(), "Cancelled");
    }

    #[tokio::test(start_paused = true)]
    async fn test_system_ids_skip_pending() {
        let (intake, _bus) = intake(&EngineConfig::default());
        intake.submit(Some(1), 30, "taken").await.unwrap();

        let first = intake.submit(None, 5, "auto").await.unwrap();
        let second = intake.submit(None, 5, "auto").await.unwrap();
        assert_eq!(first.id.get(), 2);
        assert_eq!(second.id.get(), 3);
        assert!(!first.replaced);
    }

    #[tokio::test(start_paused = true)]
    async fn test_lane_full() {
        let config = EngineConfig {
            max_pending_per_lane: 2,
            ..Default::default()
        };
        let (intake, _bus) = intake(&config);
        intake.submit(Some(0), 5, "a").await.unwrap();
        intake.submit(Some(2), 5, "b").await.unwrap();

        assert_eq!(
            intake.submit(Some(4), 5, "c").await,
            Err(SubmitError::LaneFull { lane: 0, capacity: 2 })
        );
        // replacing an existing id is still allowed
        assert!(intake.submit(Some(2), 1, "b2").await.unwrap().replaced);
        // the other lane is unaffected
        assert!(intake.submit(Some(1), 5, "d").await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_system_ids_skip_full_lane() {
        let config = EngineConfig {
            max_pending_per_lane: 3,
            ..Default::default()
        };
        let (intake, _bus) = intake(&config);
        for id in [1, 5, 7] {
            intake.submit(Some(id), 30, "odd").await.unwrap();
        }

        let first = intake.submit(None, 5, "auto").await.unwrap();
        let second = intake.submit(None, 5, "auto").await.unwrap();
        assert_eq!((first.id.get(), first.lane), (2, 0));
        // 3 is free but lane 1 is full
        assert_eq!((second.id.get(), second.lane), (4, 0));

        intake.submit(None, 5, "auto").await.unwrap();
        assert_eq!(
            intake.submit(None, 5, "auto").await,
            Err(SubmitError::LaneFull { lane: 1, capacity: 3 })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_rejects() {
        let bus = EventBus::new(8);
        let token = CancellationToken::new();
        let lanes: Arc<[Arc<Lane>]> = (0..2).map(|i| Arc::new(Lane::new(i))).collect();
        let intake = Intake::new(lanes, &bus, &EngineConfig::default(), token.clone());

        token.cancel();
        assert_eq!(intake.submit(Some(1), 1, "x").await, Err(SubmitError::ShutDown));
        assert_eq!(intake.cancel(1).await, Err(CancelError::ShutDown));
    }
}
