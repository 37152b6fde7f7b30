use super::command::ToolCommand;
use super::text_tree::attach_indented;
use crate::ports::outbound::DependencyResolver;
use crate::scan_engine::domain::{
    ComponentId, DependencyGraph, Ecosystem, GeneralInfo, ResolvedModule, Scope,
};
use crate::shared::Result;
use async_trait::async_trait;
use std::path::Path;
use tracing::debug;

const TREE_GOAL_MARKER: &str = "--- maven-dependency-plugin:";

/// MavenResolver adapter running `mvn dependency:tree`
///
/// A multi-module build prints one tree per module; every module becomes a
/// module root of the same graph.
pub struct MavenResolver {
    command: ToolCommand,
}

impl MavenResolver {
    pub fn new() -> Self {
        Self {
            command: ToolCommand::new("mvn"),
        }
    }

    pub fn with_command(command: ToolCommand) -> Self {
        Self { command }
    }

    /// Parses `mvn dependency:tree -B` output.
    ///
    /// Module directories are guessed as `<project_dir>/<artifactId>` when
    /// that directory holds a `pom.xml`; the first module is the project
    /// itself.
    pub fn parse_tree(output: &str, project_dir: &Path) -> Result<DependencyGraph> {
        let mut graph = DependencyGraph::default();
        let mut current: Option<(ResolvedModule, Vec<(usize, Option<GeneralInfo>)>)> = None;
        let mut expect_header = false;

        for raw in output.lines() {
            let Some(line) = raw.strip_prefix("[INFO] ") else {
                continue;
            };
            if line.contains(TREE_GOAL_MARKER) {
                if let Some((module, entries)) = current.take() {
                    graph.push(Self::finish(module, entries));
                }
                expect_header = true;
                continue;
            }

            if expect_header {
                expect_header = false;
                let Some(id) = Self::parse_coordinates(line.trim()).map(|(id, _)| id) else {
                    continue;
                };
                let path = if graph.is_empty() {
                    project_dir.to_path_buf()
                } else {
                    let candidate = project_dir.join(id.artifact());
                    if candidate.join("pom.xml").is_file() {
                        candidate
                    } else {
                        project_dir.to_path_buf()
                    }
                };
                let name = id.artifact().to_string();
                let module = ResolvedModule::new(name, GeneralInfo::new(id).with_path(path));
                current = Some((module, Vec::new()));
                continue;
            }

            if let Some((_, entries)) = current.as_mut() {
                if let Some((depth, rest)) = Self::split_prefix(line) {
                    let info = Self::parse_coordinates(rest).map(|(id, scope)| {
                        let info = GeneralInfo::new(id);
                        match scope {
                            Some(scope) => info.with_scope(scope),
                            None => info,
                        }
                    });
                    entries.push((depth, info));
                }
            }
        }

        if let Some((module, entries)) = current.take() {
            graph.push(Self::finish(module, entries));
        }
        if graph.is_empty() {
            anyhow::bail!("No dependency tree found in Maven output");
        }
        Ok(graph)
    }

    fn finish(
        mut module: ResolvedModule,
        entries: Vec<(usize, Option<GeneralInfo>)>,
    ) -> ResolvedModule {
        attach_indented(&mut module, entries);
        debug!(module = module.name(), edges = module.edge_count(), "Parsed Maven module");
        module
    }

    /// Splits `|  +- coords` into (depth, coords); depth 1 is a direct dependency
    fn split_prefix(line: &str) -> Option<(usize, &str)> {
        let marker = line.find("+- ").or_else(|| line.find("\\- "))?;
        let prefix = &line[..marker];
        if !prefix.chars().all(|c| c == '|' || c == ' ') {
            return None;
        }
        Some((marker / 3 + 1, line[marker + 3..].trim()))
    }

    /// `group:artifact:type[:classifier]:version[:scope]`, optionally
    /// followed by annotations such as ` (optional)`
    fn parse_coordinates(text: &str) -> Option<(ComponentId, Option<Scope>)> {
        let coordinates = text.split_whitespace().next()?;
        let parts: Vec<&str> = coordinates.split(':').collect();
        let (group, artifact, version, scope) = match parts.as_slice() {
            [g, a, _type, v] => (g, a, v, None),
            [g, a, _type, v, s] => (g, a, v, Some(s)),
            [g, a, _type, _classifier, v, s] => (g, a, v, Some(s)),
            _ => return None,
        };
        let id = ComponentId::new(Ecosystem::Maven, *group, *artifact, *version).ok()?;
        Some((id, scope.map(|s| Scope::new(*s))))
    }
}

impl Default for MavenResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DependencyResolver for MavenResolver {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Maven
    }

    fn is_tool_available(&self) -> bool {
        self.command.is_available()
    }

    async fn resolve(&self, project_dir: &Path) -> Result<DependencyGraph> {
        let output = self
            .command
            .run(&["dependency:tree", "-B"], project_dir)
            .await?;
        Self::parse_tree(&output, project_dir)
    }
}
