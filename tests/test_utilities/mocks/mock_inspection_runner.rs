use std::sync::{Arc, Mutex};
use workspace_scan::prelude::*;

/// Mock InspectionRunner recording the ecosystem and issue count of each run
#[derive(Default, Clone)]
pub struct RecordingInspectionRunner {
    pub runs: Arc<Mutex<Vec<(Ecosystem, usize)>>>,
}

impl RecordingInspectionRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_runs(&self) -> Vec<(Ecosystem, usize)> {
        self.runs.lock().unwrap().clone()
    }
}

impl InspectionRunner for RecordingInspectionRunner {
    fn run_inspections(&self, ecosystem: Ecosystem, tree: &DependencyTree) -> Result<()> {
        self.runs
            .lock()
            .unwrap()
            .push((ecosystem, tree.count_issues(tree.root())));
        Ok(())
    }
}
