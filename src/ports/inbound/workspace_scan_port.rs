use crate::application::dto::{ScanRequest, ScanResponse};
use crate::shared::Result;
use async_trait::async_trait;

/// WorkspaceScanPort - Inbound port for the workspace scan use case
///
/// This port defines the interface that external adapters (CLI, IDE
/// integrations) use to trigger a scan. It represents the application's
/// public API.
#[async_trait]
pub trait WorkspaceScanPort {
    /// Scans every detected module and builds the filtered report
    ///
    /// # Errors
    /// Returns an error if:
    /// - No vulnerability service is configured
    /// - A previous scan is still running
    /// - The scan was cancelled before it started
    async fn scan_workspace(&self, request: ScanRequest) -> Result<ScanResponse>;
}
