//! Scan report read model
//!
//! A denormalized, formatter-friendly snapshot of every module tree, the
//! filtered issue list and the license union.

use crate::scan_engine::domain::{IssueKind, Severity};
use std::collections::BTreeMap;

/// Main read model for a workspace scan
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    pub metadata: ReportMetadataView,
    pub modules: Vec<ModuleView>,
    /// Deduplicated issues matching the filter selection, most severe first
    pub issues: Vec<IssueView>,
    /// Every license found, independent of the filter selection
    pub licenses: Vec<LicenseView>,
    pub summary: SummaryView,
}

#[derive(Debug, Clone, Default)]
pub struct ReportMetadataView {
    pub workspace: String,
    /// RFC 3339 timestamp
    pub generated_at: String,
    pub tool_name: String,
    pub tool_version: String,
}

/// One module root with its filtered dependency tree
#[derive(Debug, Clone)]
pub struct ModuleView {
    pub ecosystem: String,
    pub name: String,
    pub path: Option<String>,
    /// Error of the manager's last scan, if it failed
    pub error: Option<String>,
    /// Pre-order, module root excluded
    pub nodes: Vec<NodeView>,
    /// Per-occurrence issue count of the whole module subtree
    pub issue_count: usize,
}

#[derive(Debug, Clone)]
pub struct NodeView {
    /// 1 for direct dependencies
    pub depth: usize,
    pub name: String,
    pub scope: Option<String>,
    pub issue_count: usize,
    pub top_severity: Option<Severity>,
    pub licenses: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct IssueView {
    pub id: Option<String>,
    pub severity: Severity,
    pub kind: IssueKind,
    pub summary: String,
    pub component: String,
    pub ecosystem: String,
    pub fixed_versions: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct LicenseView {
    pub name: String,
    pub full_name: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SummaryView {
    pub modules: usize,
    pub failed_modules: usize,
    pub components: usize,
    pub issues: usize,
    pub by_severity: BTreeMap<Severity, usize>,
}

impl SummaryView {
    pub fn highest_severity(&self) -> Option<Severity> {
        self.by_severity
            .iter()
            .rev()
            .find(|(_, count)| **count > 0)
            .map(|(severity, _)| *severity)
    }
}
