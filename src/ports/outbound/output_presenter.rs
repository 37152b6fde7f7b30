use crate::shared::Result;

/// OutputPresenter port for delivering a formatted scan report
///
/// Implementations decide where the report ends up (stdout, a file).
pub trait OutputPresenter {
    /// # Errors
    /// Returns an error if the destination cannot be written
    fn present(&self, report: &str) -> Result<()>;
}
