use crate::application::dto::{ManagerRun, ScanRequest, ScanResponse};
use crate::application::queries::ScanResultsQuery;
use crate::application::read_models::ScanReportBuilder;
use crate::application::scan::{ScanManagerRegistry, ScanRun, StartScanOutcome};
use crate::ports::inbound::WorkspaceScanPort;
use crate::scan_engine::domain::Severity;
use crate::shared::error::ScanError;
use crate::shared::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

/// ScanWorkspaceUseCase - Runs one complete scan of a workspace
///
/// Starts every scan manager of the registry, waits for all of them, makes
/// the licenses and scopes found known to the filter selection and builds
/// the filtered report. A manager that fails does not fail the use case;
/// its error is carried in the report.
pub struct ScanWorkspaceUseCase {
    registry: Arc<ScanManagerRegistry>,
}

impl ScanWorkspaceUseCase {
    pub fn new(registry: Arc<ScanManagerRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<ScanManagerRegistry> {
        &self.registry
    }

    /// Executes the scan
    ///
    /// # Errors
    /// - `ScanError::Configuration` if no vulnerability service is configured
    /// - `ScanError::Cancelled` if the registry was closed
    /// - an error if a previous scan is still running
    pub async fn execute(&self, request: ScanRequest) -> Result<ScanResponse> {
        let handles = match self.registry.start_scan(request.quick) {
            StartScanOutcome::Started(handles) => handles,
            StartScanOutcome::AlreadyRunning => {
                anyhow::bail!("A previous scan of this workspace is still running")
            }
            StartScanOutcome::NotConfigured => {
                return Err(ScanError::Configuration {
                    reason: "no server URL or credentials".to_string(),
                }
                .into())
            }
            StartScanOutcome::Closed => return Err(ScanError::Cancelled.into()),
        };

        // start_scan hands out one task per manager, in registry order
        let managers = self.registry.managers();
        let runs = ScanManagerRegistry::wait_for(handles).await;
        let runs: Vec<ManagerRun> = managers
            .iter()
            .zip(runs)
            .map(|(manager, run)| ManagerRun {
                key: manager.key(),
                ecosystem: manager.ecosystem(),
                root: manager.root().to_path_buf(),
                run,
            })
            .collect();
        Self::log_runs(&runs);

        let mut selection = request.selection;
        ScanResultsQuery::register_filters(&managers, &mut selection);

        let report =
            ScanReportBuilder::from_managers(self.registry.workspace(), &managers, &selection);
        let has_issues_above_threshold = request
            .fail_on
            .is_some_and(|threshold| Self::exceeds(&report.summary.by_severity, threshold));

        info!(
            modules = report.summary.modules,
            components = report.summary.components,
            issues = report.summary.issues,
            "Workspace scan finished"
        );

        Ok(ScanResponse {
            report,
            runs,
            selection,
            has_issues_above_threshold,
        })
    }

    fn exceeds(
        by_severity: &std::collections::BTreeMap<Severity, usize>,
        threshold: Severity,
    ) -> bool {
        by_severity
            .iter()
            .any(|(severity, count)| *severity >= threshold && *count > 0)
    }

    fn log_runs(runs: &[ManagerRun]) {
        for run in runs {
            match &run.run {
                ScanRun::Failed(reason) => warn!(
                    manager = %run.key,
                    ecosystem = %run.ecosystem,
                    path = %run.root.display(),
                    "Scan failed: {}",
                    reason
                ),
                ScanRun::Cancelled => info!(manager = %run.key, "Scan cancelled"),
                ScanRun::Skipped | ScanRun::Completed(_) => {}
            }
        }
    }
}

#[async_trait]
impl WorkspaceScanPort for ScanWorkspaceUseCase {
    async fn scan_workspace(&self, request: ScanRequest) -> Result<ScanResponse> {
        self.execute(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_exceeds_threshold() {
        let by_severity = BTreeMap::from([(Severity::Medium, 2), (Severity::Low, 1)]);
        assert!(ScanWorkspaceUseCase::exceeds(&by_severity, Severity::Low));
        assert!(ScanWorkspaceUseCase::exceeds(&by_severity, Severity::Medium));
        assert!(!ScanWorkspaceUseCase::exceeds(&by_severity, Severity::High));
        assert!(!ScanWorkspaceUseCase::exceeds(&BTreeMap::new(), Severity::Minimal));
    }
}
