use super::command::ToolCommand;
use crate::adapters::outbound::filesystem::ManifestReader;
use crate::ports::outbound::DependencyResolver;
use crate::scan_engine::domain::{
    ComponentId, DependencyGraph, Ecosystem, GeneralInfo, ResolvedModule, Scope,
};
use crate::shared::Result;
use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::{debug, warn};

/// Maximum nesting followed in `npm ls` output
const MAX_NESTING: usize = 100;

#[derive(Debug, Deserialize)]
struct NpmLsNode {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    dependencies: BTreeMap<String, NpmLsNode>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageJson {
    #[serde(default)]
    dev_dependencies: BTreeMap<String, serde_json::Value>,
}

/// NpmResolver adapter running `npm ls --json --all`
///
/// Direct dependencies declared in `devDependencies` get the `dev` scope,
/// every other direct dependency `prod`; transitive dependencies inherit
/// the scope of the direct dependency they hang off.
pub struct NpmResolver {
    command: ToolCommand,
}

impl NpmResolver {
    pub fn new() -> Self {
        Self {
            command: ToolCommand::new("npm"),
        }
    }

    pub fn with_command(command: ToolCommand) -> Self {
        Self { command }
    }

    /// Names declared in `devDependencies`
    pub fn dev_dependencies(package_json: &str) -> Result<HashSet<String>> {
        let parsed: PackageJson =
            serde_json::from_str(package_json).context("Failed to parse package.json")?;
        Ok(parsed.dev_dependencies.into_keys().collect())
    }

    pub fn parse_ls(
        output: &str,
        project_dir: &Path,
        dev_names: &HashSet<String>,
    ) -> Result<DependencyGraph> {
        let root: NpmLsNode =
            serde_json::from_str(output).context("Failed to parse npm ls output")?;

        let name = root
            .name
            .clone()
            .unwrap_or_else(|| ManifestReader::module_name(Ecosystem::Npm, project_dir));
        let version = root.version.clone().unwrap_or_default();
        let id = ComponentId::unscoped(Ecosystem::Npm, name.clone(), version)?;
        let mut module = ResolvedModule::new(
            name,
            GeneralInfo::new(id.clone()).with_path(project_dir.to_path_buf()),
        );

        for (dep_name, dep) in &root.dependencies {
            let scope = if dev_names.contains(dep_name) {
                Scope::new("dev")
            } else {
                Scope::new("prod")
            };
            Self::attach(&mut module, &id, dep_name, dep, &scope, 0);
        }
        Ok(DependencyGraph::new(vec![module]))
    }

    fn attach(
        module: &mut ResolvedModule,
        parent: &ComponentId,
        name: &str,
        node: &NpmLsNode,
        scope: &Scope,
        nesting: usize,
    ) {
        if nesting >= MAX_NESTING {
            warn!(package = name, "npm dependency nesting too deep, truncating");
            return;
        }
        // Missing or unmet dependencies are listed without a version
        let Some(version) = node.version.as_deref() else {
            debug!(package = name, "Skipping unresolved npm dependency");
            return;
        };
        let Ok(id) = ComponentId::unscoped(Ecosystem::Npm, name, version) else {
            return;
        };

        module.add_edge(parent, GeneralInfo::new(id.clone()).with_scope(scope.clone()));
        for (child_name, child) in &node.dependencies {
            Self::attach(module, &id, child_name, child, scope, nesting + 1);
        }
    }
}

impl Default for NpmResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DependencyResolver for NpmResolver {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Npm
    }

    fn is_tool_available(&self) -> bool {
        self.command.is_available()
    }

    async fn resolve(&self, project_dir: &Path) -> Result<DependencyGraph> {
        let dev_names = ManifestReader::read(project_dir, "package.json")
            .and_then(|content| Self::dev_dependencies(&content))
            .unwrap_or_else(|e| {
                warn!(path = %project_dir.display(), "Cannot read devDependencies: {:#}", e);
                HashSet::new()
            });

        // npm ls exits non-zero for extraneous or missing packages but still
        // prints the tree
        let output = self
            .command
            .output(&["ls", "--json", "--all"], project_dir)
            .await?;
        if !output.success {
            if output.stdout.trim().is_empty() {
                anyhow::bail!("npm ls {}", output.failure());
            }
            warn!(path = %project_dir.display(), "npm ls reported problems: {}", output.stderr);
        }
        Self::parse_ls(&output.stdout, project_dir, &dev_names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OUTPUT: &str = r#"{
      "name": "web",
      "version": "1.0.0",
      "dependencies": {
        "express": {
          "version": "4.17.1",
          "dependencies": {
            "qs": {"version": "6.7.0"},
            "body-parser": {
              "version": "1.19.0",
              "dependencies": {"qs": {"version": "6.7.0"}}
            }
          }
        },
        "jest": {"version": "29.0.0"},
        "left-pad": {"required": "^1.3.0", "missing": true}
      }
    }"#;

    fn dev() -> HashSet<String> {
        HashSet::from(["jest".to_string()])
    }

    #[test]
    fn test_parse_ls() {
        let graph = NpmResolver::parse_ls(OUTPUT, Path::new("/ws/web"), &dev()).unwrap();
        let module = &graph.modules()[0];
        assert_eq!(module.name(), "web");
        assert_eq!(module.id().to_component_string(), "npm://web:1.0.0");

        let direct: Vec<String> = module
            .direct_dependencies()
            .iter()
            .map(|d| d.id().coordinates())
            .collect();
        assert_eq!(direct, vec!["express:4.17.1", "jest:29.0.0"]);

        let express = module.direct_dependencies()[0].clone();
        assert_eq!(express.scope().map(|s| s.name()), Some("prod"));
        assert_eq!(module.direct_dependencies()[1].scope().map(|s| s.name()), Some("dev"));

        let children: Vec<&str> = module
            .dependencies_of(express.id())
            .iter()
            .map(|d| d.id().artifact())
            .collect();
        assert_eq!(children, vec!["body-parser", "qs"]);
        assert_eq!(
            module.dependencies_of(express.id())[1].scope().map(|s| s.name()),
            Some("prod")
        );
    }

    #[test]
    fn test_parse_ls_invalid_json() {
        assert!(NpmResolver::parse_ls("npm ERR!", Path::new("/ws"), &HashSet::new()).is_err());
    }

    #[test]
    fn test_dev_dependencies() {
        let names = NpmResolver::dev_dependencies(
            r#"{"name": "web", "devDependencies": {"jest": "^29.0.0", "eslint": "^8"}}"#,
        )
        .unwrap();
        assert_eq!(names.len(), 2);
        assert!(names.contains("jest"));
        assert!(NpmResolver::dev_dependencies(r#"{"name": "web"}"#).unwrap().is_empty());
    }
}
