use super::command::ToolCommand;
use crate::adapters::outbound::filesystem::ManifestReader;
use crate::ports::outbound::DependencyResolver;
use crate::scan_engine::domain::{
    ComponentId, DependencyGraph, Ecosystem, GeneralInfo, ResolvedModule,
};
use crate::shared::Result;
use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use tracing::warn;

/// Maximum nesting followed in `pipdeptree` output
const MAX_NESTING: usize = 100;

#[derive(Debug, Deserialize)]
struct PipDepTreeNode {
    key: String,
    #[serde(default)]
    installed_version: Option<String>,
    #[serde(default)]
    dependencies: Vec<PipDepTreeNode>,
}

/// PypiResolver adapter running `python -m pipdeptree --json-tree`
///
/// Reports the packages installed in the active interpreter; every top-level
/// package becomes a direct dependency of the project.
pub struct PypiResolver {
    command: ToolCommand,
}

impl PypiResolver {
    /// Uses `python3` when present on `PATH`, otherwise `python`
    pub fn new() -> Self {
        let python3 = ToolCommand::new("python3");
        let command = if python3.is_available() {
            python3
        } else {
            ToolCommand::new("python")
        };
        Self { command }
    }

    pub fn with_command(command: ToolCommand) -> Self {
        Self { command }
    }

    pub fn parse_json_tree(output: &str, project_dir: &Path) -> Result<DependencyGraph> {
        let packages: Vec<PipDepTreeNode> =
            serde_json::from_str(output).context("Failed to parse pipdeptree output")?;

        let name = ManifestReader::module_name(Ecosystem::Pypi, project_dir);
        let id = ComponentId::unscoped(Ecosystem::Pypi, name.clone(), "")?;
        let mut module = ResolvedModule::new(
            name,
            GeneralInfo::new(id.clone()).with_path(project_dir.to_path_buf()),
        );

        for package in &packages {
            Self::attach(&mut module, &id, package, 0);
        }
        Ok(DependencyGraph::new(vec![module]))
    }

    fn attach(
        module: &mut ResolvedModule,
        parent: &ComponentId,
        node: &PipDepTreeNode,
        nesting: usize,
    ) {
        if nesting >= MAX_NESTING {
            warn!(package = %node.key, "pipdeptree nesting too deep, truncating");
            return;
        }
        // Requirements that are not installed carry no version
        let Some(version) = node.installed_version.as_deref() else {
            return;
        };
        let Ok(id) = ComponentId::unscoped(Ecosystem::Pypi, node.key.to_lowercase(), version)
        else {
            return;
        };

        module.add_edge(parent, GeneralInfo::new(id.clone()));
        for child in &node.dependencies {
            Self::attach(module, &id, child, nesting + 1);
        }
    }
}

impl Default for PypiResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DependencyResolver for PypiResolver {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Pypi
    }

    fn is_tool_available(&self) -> bool {
        self.command.is_available()
    }

    async fn resolve(&self, project_dir: &Path) -> Result<DependencyGraph> {
        let output = self
            .command
            .run(&["-m", "pipdeptree", "--json-tree"], project_dir)
            .await
            .context("pipdeptree must be installed in the active Python environment")?;
        Self::parse_json_tree(&output, project_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OUTPUT: &str = r#"[
      {
        "key": "requests",
        "package_name": "requests",
        "installed_version": "2.31.0",
        "required_version": "2.31.0",
        "dependencies": [
          {"key": "urllib3", "package_name": "urllib3", "installed_version": "2.0.7", "required_version": ">=1.21.1", "dependencies": []},
          {"key": "idna", "package_name": "idna", "installed_version": "3.4", "required_version": ">=2.5", "dependencies": []}
        ]
      },
      {
        "key": "pyyaml",
        "package_name": "PyYAML",
        "installed_version": "6.0.1",
        "required_version": "6.0.1",
        "dependencies": []
      },
      {"key": "ghost", "package_name": "ghost", "required_version": ">=1", "dependencies": []}
    ]"#;

    #[test]
    fn test_parse_json_tree() {
        let graph = PypiResolver::parse_json_tree(OUTPUT, Path::new("/ws/ml")).unwrap();
        let module = &graph.modules()[0];
        assert_eq!(module.name(), "ml");

        let direct: Vec<String> = module
            .direct_dependencies()
            .iter()
            .map(|d| d.id().to_component_string())
            .collect();
        assert_eq!(direct, vec!["pypi://requests:2.31.0", "pypi://pyyaml:6.0.1"]);

        let requests = module.direct_dependencies()[0].id().clone();
        let children: Vec<&str> = module
            .dependencies_of(&requests)
            .iter()
            .map(|d| d.id().artifact())
            .collect();
        assert_eq!(children, vec!["urllib3", "idna"]);
    }

    #[test]
    fn test_parse_json_tree_invalid() {
        assert!(PypiResolver::parse_json_tree("No module named pipdeptree", Path::new("/ws")).is_err());
    }

    #[test]
    fn test_parse_json_tree_empty_environment() {
        let graph = PypiResolver::parse_json_tree("[]", Path::new("/ws/ml")).unwrap();
        assert_eq!(graph.modules()[0].edge_count(), 0);
    }
}
