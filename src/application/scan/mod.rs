//! Scan orchestration: per-ecosystem scan managers and the registry that
//! owns them.

mod context;
mod manager;
mod registry;

pub use context::{ScanContext, ScanContextBuilder};
pub use manager::{EcosystemScanManager, ManagerKey, ScanRun, ScanState, ScanSummary};
pub use registry::{ScanManagerRegistry, StartScanOutcome};
