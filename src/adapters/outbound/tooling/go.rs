use super::command::ToolCommand;
use crate::adapters::outbound::filesystem::ManifestReader;
use crate::ports::outbound::DependencyResolver;
use crate::scan_engine::domain::{
    ComponentId, DependencyGraph, Ecosystem, GeneralInfo, ResolvedModule,
};
use crate::shared::Result;
use async_trait::async_trait;
use std::path::Path;
use tracing::debug;

/// Pseudo-modules `go mod graph` prints for the language and toolchain versions
const PSEUDO_MODULES: [&str; 2] = ["go", "toolchain"];

/// GoResolver adapter running `go mod graph`
///
/// The graph is an edge list `<from> <to>`; the main module is the only
/// token without an `@version` suffix.
pub struct GoResolver {
    command: ToolCommand,
}

impl GoResolver {
    pub fn new() -> Self {
        Self {
            command: ToolCommand::new("go"),
        }
    }

    pub fn with_command(command: ToolCommand) -> Self {
        Self { command }
    }

    fn split_token(token: &str) -> (&str, Option<&str>) {
        match token.rsplit_once('@') {
            Some((path, version)) => (path, Some(version)),
            None => (token, None),
        }
    }

    fn component(token: &str) -> Option<ComponentId> {
        let (path, version) = Self::split_token(token);
        let version = version?;
        if PSEUDO_MODULES.contains(&path) {
            return None;
        }
        ComponentId::unscoped(Ecosystem::Go, path, version).ok()
    }

    pub fn parse_graph(output: &str, project_dir: &Path) -> Result<DependencyGraph> {
        let name = ManifestReader::module_name(Ecosystem::Go, project_dir);
        let id = ComponentId::unscoped(Ecosystem::Go, name.clone(), "")?;
        let mut module = ResolvedModule::new(
            name,
            GeneralInfo::new(id.clone()).with_path(project_dir.to_path_buf()),
        );

        for line in output.lines() {
            let mut tokens = line.split_whitespace();
            let (Some(from), Some(to)) = (tokens.next(), tokens.next()) else {
                continue;
            };
            let Some(child) = Self::component(to) else {
                continue;
            };
            let parent = match Self::split_token(from) {
                (_, None) => id.clone(),
                _ => match Self::component(from) {
                    Some(parent) => parent,
                    None => continue,
                },
            };
            module.add_edge(&parent, GeneralInfo::new(child));
        }

        debug!(module = module.name(), edges = module.edge_count(), "Parsed go mod graph");
        Ok(DependencyGraph::new(vec![module]))
    }
}

impl Default for GoResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DependencyResolver for GoResolver {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Go
    }

    fn is_tool_available(&self) -> bool {
        self.command.is_available()
    }

    async fn resolve(&self, project_dir: &Path) -> Result<DependencyGraph> {
        let output = self.command.run(&["mod", "graph"], project_dir).await?;
        Self::parse_graph(&output, project_dir)
    }
}
