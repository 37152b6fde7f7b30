use super::command::ToolCommand;
use super::text_tree::attach_indented;
use crate::adapters::outbound::filesystem::ManifestReader;
use crate::ports::outbound::DependencyResolver;
use crate::scan_engine::domain::{
    ComponentId, DependencyGraph, Ecosystem, GeneralInfo, ResolvedModule, Scope,
};
use crate::shared::Result;
use async_trait::async_trait;
use std::path::Path;

/// Configuration whose resolved dependencies are reported
const CONFIGURATION: &str = "runtimeClasspath";

/// Width of one indentation level in `gradle dependencies` output
const INDENT_WIDTH: usize = 5;

/// GradleResolver adapter running `gradle dependencies`
///
/// The project's wrapper script is preferred over a `gradle` on `PATH`.
pub struct GradleResolver {
    command: ToolCommand,
}

impl GradleResolver {
    pub fn new() -> Self {
        Self {
            command: ToolCommand::new("gradle"),
        }
    }

    pub fn with_command(command: ToolCommand) -> Self {
        Self { command }
    }

    fn command_for(&self, project_dir: &Path) -> ToolCommand {
        let wrapper = if cfg!(windows) { "gradlew.bat" } else { "gradlew" };
        let wrapper_path = project_dir.join(wrapper);
        if wrapper_path.is_file() {
            ToolCommand::new(wrapper_path.to_string_lossy().into_owned())
                .with_timeout(self.command.timeout())
        } else {
            self.command.clone()
        }
    }

    /// Parses `gradle dependencies` output for one project.
    ///
    /// Entries marked `(*)` were expanded earlier and carry no children here;
    /// constraints `(c)` and unresolved entries `(n)` are dropped, as are
    /// inter-project dependencies.
    pub fn parse_dependencies(output: &str, project_dir: &Path) -> Result<DependencyGraph> {
        let name = output
            .lines()
            .find_map(Self::parse_project_header)
            .unwrap_or_else(|| ManifestReader::directory_name(project_dir));

        let id = ComponentId::new(Ecosystem::Gradle, "", name.clone(), "")?;
        let mut module = ResolvedModule::new(
            name,
            GeneralInfo::new(id).with_path(project_dir.to_path_buf()),
        );

        let mut in_configuration = false;
        let mut entries = Vec::new();
        for line in output.lines() {
            if line.starts_with(CONFIGURATION) {
                in_configuration = true;
                continue;
            }
            if !in_configuration {
                continue;
            }
            if line.trim().is_empty() {
                break;
            }
            if let Some((depth, rest)) = Self::split_prefix(line) {
                entries.push((depth, Self::parse_entry(rest)));
            }
        }

        attach_indented(&mut module, entries);
        Ok(DependencyGraph::new(vec![module]))
    }

    /// `Root project 'demo'` or `Project ':app'`
    fn parse_project_header(line: &str) -> Option<String> {
        let rest = line
            .strip_prefix("Root project ")
            .or_else(|| line.strip_prefix("Project "))?;
        let name = rest.split('\'').nth(1)?.trim_start_matches(':');
        (!name.is_empty()).then(|| name.to_string())
    }

    fn split_prefix(line: &str) -> Option<(usize, &str)> {
        let marker = line.find("+--- ").or_else(|| line.find("\\--- "))?;
        let prefix = &line[..marker];
        if !prefix.chars().all(|c| c == '|' || c == ' ') {
            return None;
        }
        Some((marker / INDENT_WIDTH + 1, line[marker + INDENT_WIDTH..].trim()))
    }

    /// `group:artifact:version`, `group:artifact:requested -> selected`,
    /// `group:artifact -> selected`, each optionally suffixed by a marker
    fn parse_entry(text: &str) -> Option<GeneralInfo> {
        if text.starts_with("project ") || text.ends_with("(c)") || text.ends_with("(n)") {
            return None;
        }
        let text = text.trim_end_matches("(*)").trim();
        let (coordinates, selected) = match text.split_once(" -> ") {
            Some((coordinates, selected)) => (coordinates, Some(selected.trim())),
            None => (text, None),
        };

        let parts: Vec<&str> = coordinates.split(':').collect();
        let (group, artifact, requested) = match parts.as_slice() {
            [g, a] => (*g, *a, None),
            [g, a, v] => (*g, *a, Some(*v)),
            _ => return None,
        };
        let version = selected
            .and_then(|s| s.split_whitespace().next())
            .or(requested)?;

        let id = ComponentId::new(Ecosystem::Gradle, group, artifact, version).ok()?;
        Some(GeneralInfo::new(id).with_scope(Scope::new("runtime")))
    }
}

impl Default for GradleResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DependencyResolver for GradleResolver {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Gradle
    }

    fn is_tool_available(&self) -> bool {
        self.command.is_available()
    }

    async fn resolve(&self, project_dir: &Path) -> Result<DependencyGraph> {
        let output = self
            .command_for(project_dir)
            .run(
                &["dependencies", "-q", "--configuration", CONFIGURATION],
                project_dir,
            )
            .await?;
        Self::parse_dependencies(&output, project_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OUTPUT: &str = "
------------------------------------------------------------
Root project 'demo'
------------------------------------------------------------

runtimeClasspath - Runtime classpath of source set 'main'.
+--- org.springframework:spring-core:5.3.9
|    \\--- org.springframework:spring-jcl:5.3.9
+--- com.google.guava:guava:30.1-jre -> 31.0-jre
|    +--- com.google.guava:failureaccess:1.0.1
|    \\--- org.springframework:spring-jcl:5.3.9 (*)
+--- org.slf4j:slf4j-api -> 1.7.36
+--- org.apache.logging.log4j:log4j-bom:2.17.1 (c)
\\--- project :lib
     \\--- commons-io:commons-io:2.11.0

(*) - dependencies omitted (listed previously)
";

    #[test]
    fn test_parse_dependencies() {
        let graph = GradleResolver::parse_dependencies(OUTPUT, Path::new("/ws/demo")).unwrap();
        let module = &graph.modules()[0];
        assert_eq!(module.name(), "demo");
        assert_eq!(module.path(), Some(Path::new("/ws/demo")));

        let direct: Vec<String> = module
            .direct_dependencies()
            .iter()
            .map(|d| d.id().coordinates())
            .collect();
        assert_eq!(
            direct,
            vec![
                "org.springframework:spring-core:5.3.9",
                "com.google.guava:guava:31.0-jre",
                "org.slf4j:slf4j-api:1.7.36",
            ]
        );

        let guava = module.direct_dependencies()[1].id().clone();
        assert_eq!(module.dependencies_of(&guava).len(), 2);
        assert_eq!(module.edge_count(), 6);
        assert_eq!(guava.to_component_string(), "gav://com.google.guava:guava:31.0-jre");
    }

    #[test]
    fn test_parse_subproject_header() {
        assert_eq!(
            GradleResolver::parse_project_header("Project ':app'"),
            Some("app".to_string())
        );
        assert_eq!(GradleResolver::parse_project_header("runtimeClasspath"), None);
    }

    #[test]
    fn test_parse_without_header_uses_directory_name() {
        let graph = GradleResolver::parse_dependencies(
            "runtimeClasspath\nNo dependencies\n",
            Path::new("/ws/android"),
        )
        .unwrap();
        assert_eq!(graph.modules()[0].name(), "android");
        assert_eq!(graph.modules()[0].edge_count(), 0);
    }
}
