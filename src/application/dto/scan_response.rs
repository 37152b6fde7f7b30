use crate::application::read_models::ScanReport;
use crate::application::scan::{ManagerKey, ScanRun};
use crate::scan_engine::domain::{Ecosystem, FilterSelection};
use std::path::PathBuf;

/// Outcome of one manager's scan within a workspace scan
#[derive(Debug, Clone)]
pub struct ManagerRun {
    pub key: ManagerKey,
    pub ecosystem: Ecosystem,
    pub root: PathBuf,
    pub run: ScanRun,
}

/// ScanResponse - Internal response DTO from the workspace scan use case
#[derive(Debug, Clone)]
pub struct ScanResponse {
    pub report: ScanReport,
    /// One entry per manager, in registry order
    pub runs: Vec<ManagerRun>,
    /// Selection after registering the licenses and scopes found by the scan
    pub selection: FilterSelection,
    /// Whether an issue at or above the fail-on severity was reported
    pub has_issues_above_threshold: bool,
}

impl ScanResponse {
    pub fn failed_runs(&self) -> impl Iterator<Item = &ManagerRun> {
        self.runs
            .iter()
            .filter(|r| matches!(r.run, ScanRun::Failed(_)))
    }
}
