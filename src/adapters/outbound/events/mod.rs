/// Change notification adapters
mod broadcast_event_sink;

pub use broadcast_event_sink::{BroadcastEventSink, DEFAULT_EVENT_CAPACITY};
