use crate::application::read_models::{
    IssueView, LicenseView, ModuleView, NodeView, ScanReport, SummaryView,
};
use crate::ports::outbound::ReportFormatter;
use crate::shared::Result;

/// Markdown table header for issue information
const ISSUE_TABLE_HEADER: &str = "| Severity | Component | Summary | ID | Fixed Versions |\n";

/// Markdown table separator line for issue table
const ISSUE_TABLE_SEPARATOR: &str = "|----------|-----------|---------|----|----------------|\n";

/// Markdown table header for license information
const LICENSE_TABLE_HEADER: &str = "| License | Full Name |\n";

/// Markdown table separator line for license table
const LICENSE_TABLE_SEPARATOR: &str = "|---------|-----------|\n";

/// MarkdownFormatter adapter for rendering a scan report as Markdown
///
/// Renders every module as an indented dependency tree with per-node issue
/// counts, followed by the filtered issue table and the license list.
pub struct MarkdownFormatter;

impl MarkdownFormatter {
    pub fn new() -> Self {
        Self
    }

    /// Escapes pipe characters and newlines for safe Markdown table rendering
    fn escape_markdown_table_cell(text: &str) -> String {
        text.replace('|', "\\|").replace('\n', " ")
    }

    fn plural(count: usize, singular: &str, plural: &str) -> String {
        if count == 1 {
            format!("{} {}", count, singular)
        } else {
            format!("{} {}", count, plural)
        }
    }
}

impl Default for MarkdownFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper methods for rendering sections
impl MarkdownFormatter {
    fn render_header(&self, output: &mut String, report: &ScanReport) {
        output.push_str("# Workspace Scan Report\n\n");
        output.push_str(&format!(
            "- **Workspace:** `{}`\n- **Generated:** {}\n- **Tool:** {} {}\n\n",
            report.metadata.workspace,
            report.metadata.generated_at,
            report.metadata.tool_name,
            report.metadata.tool_version
        ));
    }

    fn render_summary(&self, output: &mut String, summary: &SummaryView) {
        output.push_str("## Summary\n\n");
        output.push_str(&format!(
            "**Found {} in {} across {}.**\n\n",
            Self::plural(summary.issues, "issue", "issues"),
            Self::plural(summary.components, "component", "components"),
            Self::plural(summary.modules, "module", "modules")
        ));

        if !summary.by_severity.is_empty() {
            for (severity, count) in summary.by_severity.iter().rev() {
                output.push_str(&format!("- {}: {}\n", severity, count));
            }
            output.push('\n');
        }

        if summary.failed_modules > 0 {
            output.push_str(&format!(
                "⚠️ {} could not be scanned.\n\n",
                Self::plural(summary.failed_modules, "module", "modules")
            ));
        }
    }

    fn render_modules(&self, output: &mut String, modules: &[ModuleView]) {
        output.push_str("## Dependency Trees\n\n");
        if modules.is_empty() {
            output.push_str("*No modules detected*\n\n");
            return;
        }

        for module in modules {
            output.push_str(&format!(
                "### {} ({}) - {}\n\n",
                module.name,
                module.ecosystem,
                Self::plural(module.issue_count, "issue", "issues")
            ));
            if let Some(path) = &module.path {
                output.push_str(&format!("Path: `{}`\n\n", path));
            }
            if let Some(error) = &module.error {
                output.push_str(&format!("> ⚠️ Scan failed: {}\n\n", error));
            }

            if module.nodes.is_empty() {
                output.push_str("*No dependencies match the current filters*\n\n");
                continue;
            }
            for node in &module.nodes {
                self.render_node(output, node);
            }
            output.push('\n');
        }
    }

    fn render_node(&self, output: &mut String, node: &NodeView) {
        let indent = "  ".repeat(node.depth.saturating_sub(1));
        output.push_str(&format!("{}- {}", indent, node.name));
        if let Some(scope) = &node.scope {
            output.push_str(&format!(" [{}]", scope));
        }
        if node.issue_count > 0 {
            output.push_str(&format!(
                " ({})",
                Self::plural(node.issue_count, "issue", "issues")
            ));
        }
        if let Some(severity) = node.top_severity {
            output.push_str(&format!(" **{}**", severity));
        }
        output.push('\n');
    }

    fn render_issues(&self, output: &mut String, issues: &[IssueView]) {
        output.push_str("## Issues\n\n");
        if issues.is_empty() {
            output.push_str("*No issues match the current filters*\n\n");
            return;
        }

        output.push_str(ISSUE_TABLE_HEADER);
        output.push_str(ISSUE_TABLE_SEPARATOR);
        for issue in issues {
            let fixed = if issue.fixed_versions.is_empty() {
                "N/A".to_string()
            } else {
                issue.fixed_versions.join(", ")
            };
            output.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                issue.severity,
                Self::escape_markdown_table_cell(&issue.component),
                Self::escape_markdown_table_cell(&issue.summary),
                Self::escape_markdown_table_cell(issue.id.as_deref().unwrap_or("N/A")),
                Self::escape_markdown_table_cell(&fixed)
            ));
        }
        output.push('\n');
    }

    fn render_licenses(&self, output: &mut String, licenses: &[LicenseView]) {
        output.push_str("## Licenses\n\n");
        if licenses.is_empty() {
            output.push_str("*No licenses reported*\n");
            return;
        }

        output.push_str(LICENSE_TABLE_HEADER);
        output.push_str(LICENSE_TABLE_SEPARATOR);
        for license in licenses {
            let name = match &license.url {
                Some(url) => format!(
                    "[{}]({})",
                    Self::escape_markdown_table_cell(&license.name),
                    url
                ),
                None => Self::escape_markdown_table_cell(&license.name),
            };
            output.push_str(&format!(
                "| {} | {} |\n",
                name,
                Self::escape_markdown_table_cell(license.full_name.as_deref().unwrap_or(""))
            ));
        }
    }
}

impl ReportFormatter for MarkdownFormatter {
    fn format(&self, report: &ScanReport) -> Result<String> {
        let mut output = String::new();
        self.render_header(&mut output, report);
        self.render_summary(&mut output, &report.summary);
        self.render_modules(&mut output, &report.modules);
        self.render_issues(&mut output, &report.issues);
        self.render_licenses(&mut output, &report.licenses);
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::read_models::ReportMetadataView;
    use crate::scan_engine::domain::{IssueKind, Severity};
    use std::collections::BTreeMap;

    fn report() -> ScanReport {
        ScanReport {
            metadata: ReportMetadataView {
                workspace: "/ws".to_string(),
                generated_at: "2024-01-15T10:30:00Z".to_string(),
                tool_name: "workspace-scan".to_string(),
                tool_version: "0.1.0".to_string(),
            },
            modules: vec![ModuleView {
                ecosystem: "npm".to_string(),
                name: "web".to_string(),
                path: Some("/ws/web".to_string()),
                error: None,
                nodes: vec![
                    NodeView {
                        depth: 1,
                        name: "express:4.17.1".to_string(),
                        scope: None,
                        issue_count: 1,
                        top_severity: None,
                        licenses: vec!["MIT".to_string()],
                    },
                    NodeView {
                        depth: 2,
                        name: "qs:6.7.0".to_string(),
                        scope: Some("prod".to_string()),
                        issue_count: 1,
                        top_severity: Some(Severity::High),
                        licenses: vec!["BSD-3-Clause".to_string()],
                    },
                ],
                issue_count: 1,
            }],
            issues: vec![IssueView {
                id: Some("CVE-2022-24999".to_string()),
                severity: Severity::High,
                kind: IssueKind::Security,
                summary: "Prototype | pollution".to_string(),
                component: "qs:6.7.0".to_string(),
                ecosystem: "npm".to_string(),
                fixed_versions: vec!["6.7.3".to_string(), "6.10.3".to_string()],
            }],
            licenses: vec![
                LicenseView {
                    name: "BSD-3-Clause".to_string(),
                    full_name: None,
                    url: None,
                },
                LicenseView {
                    name: "MIT".to_string(),
                    full_name: Some("MIT License".to_string()),
                    url: Some("https://opensource.org/licenses/MIT".to_string()),
                },
            ],
            summary: SummaryView {
                modules: 1,
                failed_modules: 0,
                components: 2,
                issues: 1,
                by_severity: BTreeMap::from([(Severity::High, 1)]),
            },
        }
    }

    #[test]
    fn test_format_renders_all_sections() {
        let output = MarkdownFormatter::new().format(&report()).unwrap();
        assert!(output.starts_with("# Workspace Scan Report"));
        assert!(output.contains("## Summary"));
        assert!(output.contains("**Found 1 issue in 2 components across 1 module.**"));
        assert!(output.contains("- High: 1"));
        assert!(output.contains("### web (npm) - 1 issue"));
        assert!(output.contains("## Issues"));
        assert!(output.contains("## Licenses"));
    }

    #[test]
    fn test_format_indents_tree_by_depth() {
        let output = MarkdownFormatter::new().format(&report()).unwrap();
        assert!(output.contains("\n- express:4.17.1 (1 issue)\n"));
        assert!(output.contains("\n  - qs:6.7.0 [prod] (1 issue) **High**\n"));
    }

    #[test]
    fn test_format_issue_row_escapes_cells() {
        let output = MarkdownFormatter::new().format(&report()).unwrap();
        assert!(output.contains(
            "| High | qs:6.7.0 | Prototype \\| pollution | CVE-2022-24999 | 6.7.3, 6.10.3 |"
        ));
    }

    #[test]
    fn test_format_license_links() {
        let output = MarkdownFormatter::new().format(&report()).unwrap();
        assert!(output.contains("| [MIT](https://opensource.org/licenses/MIT) | MIT License |"));
        assert!(output.contains("| BSD-3-Clause |  |"));
    }

    #[test]
    fn test_format_empty_report() {
        let mut empty = report();
        empty.modules.clear();
        empty.issues.clear();
        empty.licenses.clear();
        empty.summary = SummaryView::default();

        let output = MarkdownFormatter::new().format(&empty).unwrap();
        assert!(output.contains("*No modules detected*"));
        assert!(output.contains("*No issues match the current filters*"));
        assert!(output.contains("*No licenses reported*"));
        assert!(output.contains("**Found 0 issues in 0 components across 0 modules.**"));
    }

    #[test]
    fn test_format_failed_module() {
        let mut failed = report();
        failed.modules[0].error = Some("npm: command not found".to_string());
        failed.summary.failed_modules = 1;

        let output = MarkdownFormatter::new().format(&failed).unwrap();
        assert!(output.contains("> ⚠️ Scan failed: npm: command not found"));
        assert!(output.contains("⚠️ 1 module could not be scanned."));
    }
}
