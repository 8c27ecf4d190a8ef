//! The event bus trait and its in-process implementation.

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::event::ImportEvent;

/// A fire-and-forget sink for lifecycle events. Implementations must never
/// propagate a failure back to the emitter — a full channel or a dead
/// subscriber is the bus's problem, not the pipeline's.
#[async_trait]
pub trait EventBus: Send + Sync {
    fn publish(&self, event: ImportEvent);
}

/// In-process fan-out bus backed by a `tokio::sync::broadcast` channel, so a
/// terminal UI, a metrics exporter, and a test harness can each subscribe
/// independently without coordinating with one another.
pub struct BroadcastEventBus {
    sender: broadcast::Sender<ImportEvent>,
}

impl BroadcastEventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ImportEvent> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastEventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[async_trait]
impl EventBus for BroadcastEventBus {
    fn publish(&self, event: ImportEvent) {
        // No subscribers is not an error: broadcast::Sender::send only fails
        // when the receiver count is zero, which simply means nobody is
        // watching right now.
        let _ = self.sender.send(event);
    }
}

/// A no-op bus for call sites (one-shot tools, unit tests) that don't need a
/// live subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullEventBus;

#[async_trait]
impl EventBus for NullEventBus {
    fn publish(&self, _event: ImportEvent) {}
}
