use crate::application::read_models::{ModuleView, NodeView, ScanReport};
use crate::ports::outbound::ReportFormatter;
use crate::scan_engine::domain::{IssueKind, Severity};
use crate::shared::Result;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Document {
    workspace: String,
    generated_at: String,
    tool: Tool,
    summary: Summary,
    modules: Vec<Module>,
    issues: Vec<Issue>,
    licenses: Vec<License>,
}

#[derive(Debug, Serialize)]
struct Tool {
    name: String,
    version: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Summary {
    modules: usize,
    failed_modules: usize,
    components: usize,
    issues: usize,
    by_severity: BTreeMap<String, usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Module {
    name: String,
    ecosystem: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    issue_count: usize,
    dependencies: Vec<Dependency>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Dependency {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    scope: Option<String>,
    issue_count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    licenses: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    dependencies: Vec<Dependency>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Issue {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    severity: Severity,
    kind: IssueKind,
    summary: String,
    component: String,
    ecosystem: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fixed_versions: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct License {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
}

/// JsonFormatter adapter for rendering a scan report as JSON
///
/// Module trees are emitted nested, rebuilt from the depth-annotated
/// pre-order node list of the read model.
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn new() -> Self {
        Self
    }

    fn build_module(module: &ModuleView) -> Module {
        Module {
            name: module.name.clone(),
            ecosystem: module.ecosystem.clone(),
            path: module.path.clone(),
            error: module.error.clone(),
            issue_count: module.issue_count,
            dependencies: Self::nest(&module.nodes, 1).0,
        }
    }

    /// Consumes the nodes at `depth` (and their descendants) from the front
    /// of a pre-order list; returns them with the number of entries consumed
    fn nest(nodes: &[NodeView], depth: usize) -> (Vec<Dependency>, usize) {
        let mut out = Vec::new();
        let mut index = 0;
        while let Some(node) = nodes.get(index) {
            if node.depth < depth {
                break;
            }
            let (children, consumed) = Self::nest(&nodes[index + 1..], node.depth + 1);
            out.push(Dependency {
                name: node.name.clone(),
                scope: node.scope.clone(),
                issue_count: node.issue_count,
                licenses: node.licenses.clone(),
                dependencies: children,
            });
            index += 1 + consumed;
        }
        (out, index)
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for JsonFormatter {
    fn format(&self, report: &ScanReport) -> Result<String> {
        let document = Document {
            workspace: report.metadata.workspace.clone(),
            generated_at: report.metadata.generated_at.clone(),
            tool: Tool {
                name: report.metadata.tool_name.clone(),
                version: report.metadata.tool_version.clone(),
            },
            summary: Summary {
                modules: report.summary.modules,
                failed_modules: report.summary.failed_modules,
                components: report.summary.components,
                issues: report.summary.issues,
                by_severity: report
                    .summary
                    .by_severity
                    .iter()
                    .map(|(s, c)| (s.to_string(), *c))
                    .collect(),
            },
            modules: report.modules.iter().map(Self::build_module).collect(),
            issues: report
                .issues
                .iter()
                .map(|i| Issue {
                    id: i.id.clone(),
                    severity: i.severity,
                    kind: i.kind,
                    summary: i.summary.clone(),
                    component: i.component.clone(),
                    ecosystem: i.ecosystem.clone(),
                    fixed_versions: i.fixed_versions.clone(),
                })
                .collect(),
            licenses: report
                .licenses
                .iter()
                .map(|l| License {
                    name: l.name.clone(),
                    full_name: l.full_name.clone(),
                    url: l.url.clone(),
                })
                .collect(),
        };

        let json = serde_json::to_string_pretty(&document)
            .map_err(|e| anyhow::anyhow!("Failed to serialize scan report: {}", e))?;
        Ok(json)
    }
}
