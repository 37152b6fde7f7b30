use crate::application::read_models::ScanReport;
use crate::shared::Result;

/// ReportFormatter port for rendering scan results
///
/// This port abstracts the formatting logic for the supported report
/// formats (Markdown, JSON).
pub trait ReportFormatter {
    /// Formats a scan report
    ///
    /// # Arguments
    /// * `report` - Read model with module trees, filtered issues and licenses
    ///
    /// # Errors
    /// Returns an error if formatting or serialization fails
    fn format(&self, report: &ScanReport) -> Result<String>;
}
