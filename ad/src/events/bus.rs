//! Event Bus - pub/sub for alarm events
//!
//! Components emit events, consumers subscribe. Emitting never blocks: with no
//! subscribers the event is dropped, and a lagging subscriber loses the oldest
//! events first.

use chrono::Utc;
use tokio::sync::broadcast;
use tracing::debug;

use super::types::AlarmEvent;
use crate::domain::AlarmRequest;

/// Default channel capacity (events)
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Central event bus for alarm activity
pub struct EventBus {
    tx: broadcast::Sender<AlarmEvent>,
}

impl EventBus {
    /// Create a new event bus with the given capacity
    pub fn new(capacity: usize) -> Self {
        debug!(capacity, "EventBus::new: creating event bus");
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Create a new event bus with default capacity
    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Emit an event to all subscribers (fire-and-forget)
    pub fn emit(&self, event: AlarmEvent) {
        debug!(
            event_type = event.event_type(),
            id = %event.alarm_id(),
            lane = event.lane(),
            "EventBus::emit"
        );
        // No subscribers is fine
        let _ = self.tx.send(event);
    }

    /// Subscribe to events emitted from now on
    pub fn subscribe(&self) -> broadcast::Receiver<AlarmEvent> {
        debug!("EventBus::subscribe: new subscriber");
        self.tx.subscribe()
    }

    /// Create an emitter bound to one lane
    pub fn emitter_for(&self, lane: usize) -> LaneEmitter {
        debug!(lane, "EventBus::emitter_for: creating emitter");
        LaneEmitter {
            tx: self.tx.clone(),
            lane,
        }
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

/// Cheap, cloneable handle for emitting one lane's events
#[derive(Clone)]
pub struct LaneEmitter {
    tx: broadcast::Sender<AlarmEvent>,
    lane: usize,
}

impl LaneEmitter {
    pub fn lane(&self) -> usize {
        self.lane
    }

    /// Emit a raw event
    pub fn emit(&self, event: AlarmEvent) {
        debug!(event_type = event.event_type(), lane = self.lane, "LaneEmitter::emit");
        let _ = self.tx.send(event);
    }

    // === Convenience methods ===

    pub fn submitted(&self, alarm: &AlarmRequest, replaced: bool) {
        self.emit(AlarmEvent::Submitted {
            id: alarm.id,
            lane: self.lane,
            delay_secs: alarm.delay_secs,
            message: alarm.message.to_string(),
            replaced,
        });
    }

    pub fn progress(&self, alarm: &AlarmRequest, seconds_remaining: u64) {
        self.emit(AlarmEvent::Progress {
            id: alarm.id,
            lane: self.lane,
            seconds_remaining,
            message: alarm.message.to_string(),
        });
    }

    pub fn expired(&self, alarm: &AlarmRequest) {
        self.emit(AlarmEvent::Expired {
            id: alarm.id,
            lane: self.lane,
            delay_secs: alarm.delay_secs,
            message: alarm.message.to_string(),
            expired_at: Utc::now(),
        });
    }

    pub fn cancelled(&self, alarm: &AlarmRequest) {
        self.emit(AlarmEvent::Cancelled {
            id: alarm.id,
            lane: self.lane,
            message: alarm.message.to_string(),
        });
    }
}
