//! Builder for constructing ScanReport from scan manager trees

use super::scan_report::{
    IssueView, LicenseView, ModuleView, NodeView, ReportMetadataView, ScanReport, SummaryView,
};
use crate::application::scan::EcosystemScanManager;
use crate::scan_engine::domain::{DependencyTree, Ecosystem, FilterSelection, Issue, IssueKey, NodeId};
use crate::scan_engine::services::FilterEngine;
use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One manager's tree as input of the builder
#[derive(Debug, Clone)]
pub struct TreeSource {
    pub ecosystem: Ecosystem,
    pub root: PathBuf,
    pub tree: DependencyTree,
    pub error: Option<String>,
}

impl TreeSource {
    pub fn from_manager(manager: &EcosystemScanManager) -> Self {
        Self {
            ecosystem: manager.ecosystem(),
            root: manager.root().to_path_buf(),
            tree: manager.tree_snapshot(),
            error: manager.last_error(),
        }
    }
}

/// Builder for constructing ScanReport from dependency trees
pub struct ScanReportBuilder;

impl ScanReportBuilder {
    pub fn from_managers(
        workspace: &Path,
        managers: &[Arc<EcosystemScanManager>],
        selection: &FilterSelection,
    ) -> ScanReport {
        let sources: Vec<TreeSource> = managers
            .iter()
            .map(|m| TreeSource::from_manager(m))
            .collect();
        Self::build(workspace, &sources, selection, Utc::now())
    }

    /// Builds the report
    ///
    /// # Arguments
    /// * `sources` - Trees in registry order
    /// * `selection` - Filter selection applied to trees and issues
    /// * `generated_at` - Report timestamp
    pub fn build(
        workspace: &Path,
        sources: &[TreeSource],
        selection: &FilterSelection,
        generated_at: DateTime<Utc>,
    ) -> ScanReport {
        let modules: Vec<ModuleView> = sources
            .iter()
            .flat_map(|source| Self::build_modules(source, selection))
            .collect();
        let issues = Self::build_issues(sources, selection);
        let licenses = Self::build_licenses(sources);

        let mut summary = SummaryView {
            modules: modules.len(),
            failed_modules: modules.iter().filter(|m| m.error.is_some()).count(),
            components: sources.iter().map(|s| s.tree.components().len()).sum(),
            issues: issues.len(),
            ..SummaryView::default()
        };
        for issue in &issues {
            *summary.by_severity.entry(issue.severity).or_insert(0) += 1;
        }

        ScanReport {
            metadata: ReportMetadataView {
                workspace: workspace.display().to_string(),
                generated_at: generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
                tool_name: env!("CARGO_PKG_NAME").to_string(),
                tool_version: env!("CARGO_PKG_VERSION").to_string(),
            },
            modules,
            issues,
            licenses,
            summary,
        }
    }

    /// One view per module root; a manager without any module (its first
    /// build failed) still gets an entry carrying the error
    fn build_modules(source: &TreeSource, selection: &FilterSelection) -> Vec<ModuleView> {
        let tree = &source.tree;
        let visible: HashSet<NodeId> = FilterEngine::visible_nodes(tree, selection)
            .into_iter()
            .collect();

        let roots = tree.module_roots();
        if roots.is_empty() {
            let name = source
                .root
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| source.root.display().to_string());
            return vec![ModuleView {
                ecosystem: source.ecosystem.to_string(),
                name,
                path: Some(source.root.display().to_string()),
                error: source.error.clone(),
                nodes: Vec::new(),
                issue_count: 0,
            }];
        }

        roots
            .into_iter()
            .filter_map(|root| {
                let node = tree.node(root)?;
                let nodes = tree
                    .collect_subtree(root)
                    .into_iter()
                    .skip(1)
                    .filter(|id| visible.contains(id))
                    .filter_map(|id| Self::build_node(tree, id, tree.depth(root)))
                    .collect();
                Some(ModuleView {
                    ecosystem: source.ecosystem.to_string(),
                    name: node.name().to_string(),
                    path: node
                        .info()
                        .and_then(|i| i.path())
                        .map(|p| p.display().to_string()),
                    error: source.error.clone(),
                    nodes,
                    issue_count: tree.count_issues(root),
                })
            })
            .collect()
    }

    fn build_node(tree: &DependencyTree, id: NodeId, root_depth: usize) -> Option<NodeView> {
        let node = tree.node(id)?;
        Some(NodeView {
            depth: tree.depth(id) - root_depth,
            name: node.name().to_string(),
            scope: node.scope().map(|s| s.name().to_string()),
            issue_count: tree.count_issues(id),
            top_severity: node.issues().iter().map(Issue::severity).max(),
            licenses: node.licenses().iter().map(|l| l.name().to_string()).collect(),
        })
    }

    fn build_issues(sources: &[TreeSource], selection: &FilterSelection) -> Vec<IssueView> {
        let mut seen: HashSet<IssueKey> = HashSet::new();
        let mut issues: Vec<Issue> = sources
            .iter()
            .flat_map(|s| FilterEngine::collect_issues(&s.tree, &[], selection))
            .filter(|i| seen.insert(i.key()))
            .collect();
        FilterEngine::sort_issues(&mut issues);

        issues
            .into_iter()
            .map(|issue| IssueView {
                id: issue.id().map(str::to_string),
                severity: issue.severity(),
                kind: issue.kind(),
                summary: issue.summary().to_string(),
                component: issue.component().to_string(),
                ecosystem: issue.component().ecosystem().to_string(),
                fixed_versions: issue.fixed_versions().to_vec(),
            })
            .collect()
    }

    fn build_licenses(sources: &[TreeSource]) -> Vec<LicenseView> {
        let licenses: BTreeSet<_> = sources
            .iter()
            .flat_map(|s| FilterEngine::collect_licenses(&s.tree, s.tree.root()))
            .collect();
        licenses
            .into_iter()
            .map(|l| LicenseView {
                name: l.name().to_string(),
                full_name: l.full_name().map(str::to_string),
                url: l.url().map(str::to_string),
            })
            .collect()
    }
}
