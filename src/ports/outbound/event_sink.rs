use std::fmt;

/// Change notifications emitted by the scan engine.
///
/// Events carry no payload; consumers re-query the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanEvent {
    FilterChanged,
    IssuesChanged,
    ComponentsChanged,
}

impl fmt::Display for ScanEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanEvent::FilterChanged => write!(f, "filter changed"),
            ScanEvent::IssuesChanged => write!(f, "issues changed"),
            ScanEvent::ComponentsChanged => write!(f, "components changed"),
        }
    }
}

/// EventSink port for publishing [`ScanEvent`]s
pub trait EventSink: Send + Sync {
    fn emit(&self, event: ScanEvent);
}
