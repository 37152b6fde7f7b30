use crate::scan_engine::domain::{ComponentAnnotation, ComponentId};
use crate::shared::error::ServiceError;
use async_trait::async_trait;

/// VulnerabilityService port for the vulnerability-intelligence backend
///
/// Every failure is recoverable: callers keep whatever results they already
/// have and report the error for the current scan only.
#[async_trait]
pub trait VulnerabilityService: Send + Sync {
    /// Verifies that the server is reachable, accepts the credentials and is
    /// recent enough
    async fn check_compatibility(&self) -> Result<(), ServiceError>;

    /// Looks up findings for a set of components
    ///
    /// # Returns
    /// One annotation per component the service reported on. Components
    /// missing from the response have no known issues or licenses.
    async fn scan(
        &self,
        components: &[ComponentId],
    ) -> Result<Vec<ComponentAnnotation>, ServiceError>;
}
