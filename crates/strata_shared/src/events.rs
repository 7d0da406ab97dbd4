//! # World Event System
//!
//! Explicit notification channel between the STRATA systems.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐  TileChanged   ┌─────────────┐
//! │   TileMap   │───────────────>│  Autotile   │
//! └─────────────┘                └─────────────┘
//! ┌─────────────┐  RegionLoaded  ┌─────────────┐
//! │  Streaming  │───────────────>│  Host game  │
//! └─────────────┘ RegionUnloaded └─────────────┘
//! ```
//!
//! Events are delivered in send order. Consumers drain once per tick, which
//! is what lets autotiling batch many edits into one recomputation.

use crossbeam_channel::{bounded, unbounded, Receiver, Sender, TrySendError};
use serde::{Deserialize, Serialize};

use crate::math::{RegionCoord, TilePos};
use crate::tile::Layer;

/// Events that flow between systems.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorldEvent {
    /// A tile was written or removed.
    ///
    /// Emitted by: tile storage
    /// Consumed by: autotiling
    TileChanged {
        /// World position of the tile.
        position: TilePos,
        /// Layer the tile lives on.
        layer: Layer,
    },

    /// A region transitioned from unloaded to loaded.
    ///
    /// Emitted by: region streaming
    /// Consumed by: entity spawners, persistence, simulation
    RegionLoaded {
        /// Region that was loaded.
        coord: RegionCoord,
    },

    /// A region transitioned from loaded to unloaded.
    RegionUnloaded {
        /// Region that was unloaded.
        coord: RegionCoord,
    },
}

/// Event bus for inter-system communication.
#[derive(Debug)]
pub struct EventBus {
    /// Sender end - held by event producers.
    sender: Sender<WorldEvent>,
    /// Receiver end - held by event consumers.
    receiver: Receiver<WorldEvent>,
}

impl EventBus {
    /// Creates a new bounded event bus.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum events in flight. Sends beyond this are dropped
    ///   with a warning, so size it for the largest burst in one tick.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self { sender, receiver }
    }

    /// Creates an event bus without a capacity limit.
    #[must_use]
    pub fn unbounded() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }

    /// Creates a sender handle (clone for multiple producers).
    #[must_use]
    pub fn sender(&self) -> EventSender {
        EventSender {
            sender: self.sender.clone(),
        }
    }

    /// Creates a receiver handle.
    #[must_use]
    pub fn receiver(&self) -> EventReceiver {
        EventReceiver {
            receiver: self.receiver.clone(),
        }
    }
}

/// Handle for sending events.
#[derive(Clone, Debug)]
pub struct EventSender {
    sender: Sender<WorldEvent>,
}

impl EventSender {
    /// Sends an event (non-blocking).
    ///
    /// Returns `false` if the event could not be queued.
    #[inline]
    pub fn send(&self, event: WorldEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                tracing::warn!(?event, "event bus full, dropping event");
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

/// Handle for receiving events.
#[derive(Clone, Debug)]
pub struct EventReceiver {
    receiver: Receiver<WorldEvent>,
}

impl EventReceiver {
    /// Receives all pending events (non-blocking), in send order.
    #[inline]
    pub fn drain(&self) -> Vec<WorldEvent> {
        self.receiver.try_iter().collect()
    }

    /// Receives one event (non-blocking).
    #[inline]
    pub fn try_recv(&self) -> Option<WorldEvent> {
        self.receiver.try_recv().ok()
    }

    /// Returns the number of pending events.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Checks if there are pending events.
    #[inline]
    #[must_use]
    pub fn has_events(&self) -> bool {
        !self.receiver.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_send_receive() {
        let bus = EventBus::new(16);
        let sender = bus.sender();
        let receiver = bus.receiver();

        let event = WorldEvent::TileChanged {
            position: TilePos::new(3, -4),
            layer: Layer::Ground,
        };
        assert!(sender.send(event));
        assert!(receiver.has_events());
        assert_eq!(receiver.try_recv(), Some(event));
        assert!(!receiver.has_events());
    }

    #[test]
    fn test_drain_preserves_order() {
        let bus = EventBus::unbounded();
        let sender = bus.sender();
        for x in 0..10 {
            sender.send(WorldEvent::RegionLoaded {
                coord: RegionCoord::new(x, 0),
            });
        }

        let events = bus.receiver().drain();
        assert_eq!(events.len(), 10);
        for (x, event) in (0..10).zip(events) {
            assert_eq!(event, WorldEvent::RegionLoaded { coord: RegionCoord::new(x, 0) });
        }
    }

    #[test]
    fn test_full_bus_drops() {
        let bus = EventBus::new(1);
        let (sender, receiver) = (bus.sender(), bus.receiver());
        let event = WorldEvent::RegionUnloaded { coord: RegionCoord::new(1, 1) };
        assert!(sender.send(event));
        assert!(!sender.send(event));
        assert_eq!(receiver.pending_count(), 1);
        assert_eq!(receiver.drain(), vec![event]);
    }
}
