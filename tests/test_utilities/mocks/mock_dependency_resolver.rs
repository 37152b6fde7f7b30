use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use workspace_scan::prelude::*;

/// Mock DependencyResolver returning canned graphs per project directory
pub struct MockDependencyResolver {
    ecosystem: Ecosystem,
    graphs: Mutex<HashMap<PathBuf, DependencyGraph>>,
    tool_available: bool,
    should_fail: bool,
    calls: AtomicUsize,
}

impl MockDependencyResolver {
    pub fn new(ecosystem: Ecosystem) -> Self {
        Self {
            ecosystem,
            graphs: Mutex::new(HashMap::new()),
            tool_available: true,
            should_fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_graph(self, project_dir: &Path, graph: DependencyGraph) -> Self {
        self.set_graph(project_dir, graph);
        self
    }

    pub fn without_tool(mut self) -> Self {
        self.tool_available = false;
        self
    }

    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Replaces the graph reported for `project_dir`
    pub fn set_graph(&self, project_dir: &Path, graph: DependencyGraph) {
        self.graphs
            .lock()
            .unwrap()
            .insert(project_dir.to_path_buf(), graph);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DependencyResolver for MockDependencyResolver {
    fn ecosystem(&self) -> Ecosystem {
        self.ecosystem
    }

    fn is_tool_available(&self) -> bool {
        self.tool_available
    }

    async fn resolve(&self, project_dir: &Path) -> Result<DependencyGraph> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.should_fail {
            anyhow::bail!("Mock resolver failure");
        }

        if let Some(graph) = self.graphs.lock().unwrap().get(project_dir) {
            return Ok(graph.clone());
        }
        let name = project_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "root".to_string());
        let id = ComponentId::unscoped(self.ecosystem, name.clone(), "0.0.0")?;
        Ok(DependencyGraph::new(vec![ResolvedModule::new(
            name,
            GeneralInfo::new(id).with_path(project_dir.to_path_buf()),
        )]))
    }
}
