use crate::ports::outbound::{EventSink, ScanEvent};
use tokio::sync::broadcast;
use tracing::trace;

/// Events buffered per subscriber before slow subscribers start lagging
pub const DEFAULT_EVENT_CAPACITY: usize = 100;

/// BroadcastEventSink adapter fanning scan events out to every subscriber
///
/// Emitting never blocks and never fails: with no subscriber the event is
/// dropped, and a lagging subscriber skips the oldest events. Since events
/// carry no payload, a subscriber that lagged only needs to re-query once.
#[derive(Debug, Clone)]
pub struct BroadcastEventSink {
    tx: broadcast::Sender<ScanEvent>,
}

impl BroadcastEventSink {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_EVENT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ScanEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for BroadcastEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for BroadcastEventSink {
    fn emit(&self, event: ScanEvent) {
        let delivered = self.tx.send(event).unwrap_or(0);
        trace!(%event, subscribers = delivered, "Scan event emitted");
    }
}
