use std::sync::{Arc, Mutex};
use workspace_scan::prelude::*;

/// Mock EventSink recording every emitted event
#[derive(Default, Clone)]
pub struct RecordingEventSink {
    pub events: Arc<Mutex<Vec<ScanEvent>>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_events(&self) -> Vec<ScanEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, event: ScanEvent) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| **e == event)
            .count()
    }
}

impl EventSink for RecordingEventSink {
    fn emit(&self, event: ScanEvent) {
        self.events.lock().unwrap().push(event);
    }
}
