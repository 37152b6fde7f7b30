use super::{ComponentId, GeneralInfo};
use std::collections::HashMap;
use std::path::Path;

/// One package manifest as reported by an ecosystem resolver.
///
/// `edges` maps a component to the components it depends on, in the order the
/// resolver printed them. Direct dependencies hang off the module's own id.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedModule {
    name: String,
    info: GeneralInfo,
    edges: HashMap<ComponentId, Vec<GeneralInfo>>,
}

impl ResolvedModule {
    pub fn new(name: impl Into<String>, info: GeneralInfo) -> Self {
        Self {
            name: name.into(),
            info,
            edges: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn info(&self) -> &GeneralInfo {
        &self.info
    }

    pub fn id(&self) -> &ComponentId {
        self.info.id()
    }

    pub fn path(&self) -> Option<&Path> {
        self.info.path().map(|p| p.as_path())
    }

    /// Records `parent -> child`. Identical edges may be recorded more than
    /// once; the tree builder drops them.
    pub fn add_edge(&mut self, parent: &ComponentId, child: GeneralInfo) {
        self.edges.entry(parent.clone()).or_default().push(child);
    }

    pub fn add_direct(&mut self, child: GeneralInfo) {
        let root = self.info.id().clone();
        self.add_edge(&root, child);
    }

    pub fn dependencies_of(&self, parent: &ComponentId) -> &[GeneralInfo] {
        self.edges.get(parent).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn direct_dependencies(&self) -> &[GeneralInfo] {
        self.dependencies_of(self.info.id())
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }
}

/// Resolver output for every manifest one scan manager owns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DependencyGraph {
    modules: Vec<ResolvedModule>,
}

impl DependencyGraph {
    pub fn new(modules: Vec<ResolvedModule>) -> Self {
        Self { modules }
    }

    pub fn modules(&self) -> &[ResolvedModule] {
        &self.modules
    }

    pub fn push(&mut self, module: ResolvedModule) {
        self.modules.push(module);
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
