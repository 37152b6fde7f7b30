use crate::scan_engine::domain::{FilterSelection, Severity};

/// ScanRequest - Internal request DTO for the workspace scan use case
#[derive(Debug, Clone)]
pub struct ScanRequest {
    /// Use cached annotations where available and only query the service
    /// for components missing from the cache
    pub quick: bool,
    /// Filter selection applied to the resulting report
    pub selection: FilterSelection,
    /// Minimum severity that marks the scan as failed
    pub fail_on: Option<Severity>,
}

impl ScanRequest {
    pub fn new(quick: bool, selection: FilterSelection, fail_on: Option<Severity>) -> Self {
        Self {
            quick,
            selection,
            fail_on,
        }
    }
}

impl Default for ScanRequest {
    fn default() -> Self {
        Self::new(true, FilterSelection::new(), None)
    }
}
