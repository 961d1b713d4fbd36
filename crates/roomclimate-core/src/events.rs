//! Room event notifications.
//!
//! The registry publishes an event whenever a tick appends a point, a room's
//! alert state changes, or the thresholds are swapped. Events go out over a
//! tokio broadcast channel; publishing with no subscribers is a no-op.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use roomclimate_types::{AlertState, Reading, RoomId, ThresholdConfig};

/// Events emitted by the room registry.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new event types
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum RoomEvent {
    /// A new point was appended to a room's history.
    ReadingAppended { room: RoomId, reading: Reading },
    /// A room's alert state differs from the previous tick.
    AlertsChanged {
        room: RoomId,
        previous: AlertState,
        current: AlertState,
    },
    /// The shared threshold configuration was replaced.
    ThresholdsChanged { thresholds: ThresholdConfig },
}

impl RoomEvent {
    /// The room this event concerns, if any.
    pub fn room(&self) -> Option<RoomId> {
        match self {
            RoomEvent::ReadingAppended { room, .. } | RoomEvent::AlertsChanged { room, .. } => {
                Some(*room)
            }
            RoomEvent::ThresholdsChanged { .. } => None,
        }
    }
}

/// Sender for room events.
pub type EventSender = broadcast::Sender<RoomEvent>;

/// Receiver for room events.
pub type EventReceiver = broadcast::Receiver<RoomEvent>;

/// Event dispatcher for sending events to multiple receivers.
#[derive(Debug, Clone)]
pub struct EventDispatcher {
    sender: EventSender,
}

impl EventDispatcher {
    /// Create a new event dispatcher.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribe to events.
    pub fn subscribe(&self) -> EventReceiver {
        self.sender.subscribe()
    }

    /// Send an event.
    pub fn send(&self, event: RoomEvent) {
        // Ignore error if no receivers
        let _ = self.sender.send(event);
    }

    /// Get the number of active receivers.
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new(256)
    }
}
