use crate::scan_engine::domain::{DependencyTree, Ecosystem};
use crate::shared::Result;

/// InspectionRunner port for the post-merge pass that maps tree nodes back
/// to manifest source locations
pub trait InspectionRunner: Send + Sync {
    fn run_inspections(&self, ecosystem: Ecosystem, tree: &DependencyTree) -> Result<()>;
}
