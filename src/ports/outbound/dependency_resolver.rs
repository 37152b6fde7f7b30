use crate::scan_engine::domain::{DependencyGraph, Ecosystem};
use crate::shared::Result;
use async_trait::async_trait;
use std::path::Path;

/// DependencyResolver port for turning a module directory into a resolved graph
///
/// Implementations usually drive the ecosystem's own tooling as an external
/// process, which makes `resolve` the slowest step of a scan.
///
/// # Async Support
/// Implementations must be `Send + Sync`; one resolver is shared by every
/// scan manager of its ecosystem.
#[async_trait]
pub trait DependencyResolver: Send + Sync {
    fn ecosystem(&self) -> Ecosystem;

    /// Cheap check that the ecosystem tooling can be found
    fn is_tool_available(&self) -> bool;

    /// Resolves the dependency graph of the module(s) rooted at `project_dir`
    ///
    /// # Errors
    /// Returns an error if the tool cannot be started, exits unsuccessfully,
    /// or prints output that cannot be parsed
    async fn resolve(&self, project_dir: &Path) -> Result<DependencyGraph>;
}
