use super::{EcosystemScanManager, ManagerKey, ScanContext, ScanRun};
use crate::ports::outbound::{PackageDirs, ScanEvent};
use crate::scan_engine::domain::Ecosystem;
use crate::shared::error::ScanError;
use futures::future::join_all;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Result of [`ScanManagerRegistry::start_scan`]
#[derive(Debug)]
pub enum StartScanOutcome {
    /// One spawned task per manager, in registry order
    Started(Vec<JoinHandle<ScanRun>>),
    /// A manager was still scanning; nothing was started
    AlreadyRunning,
    /// No vulnerability service is configured
    NotConfigured,
    /// The registry was closed
    Closed,
}

/// Owns the live scan managers of one workspace.
///
/// Managers are keyed by [`ManagerKey`]; refreshing an unchanged workspace
/// hands back the very same manager instances together with their trees.
pub struct ScanManagerRegistry {
    workspace: PathBuf,
    context: Arc<ScanContext>,
    managers: Mutex<Vec<Arc<EcosystemScanManager>>>,
}

impl ScanManagerRegistry {
    /// Creates a registry for `workspace`.
    ///
    /// # Errors
    /// - `ScanError::InvalidWorkspacePath` if the workspace is not a directory
    /// - `ScanError::CacheDirectory` if the result cache location cannot be created
    pub fn new(workspace: &Path, context: ScanContext) -> Result<Self, ScanError> {
        let canonical = workspace
            .canonicalize()
            .map_err(|e| ScanError::InvalidWorkspacePath {
                path: workspace.to_path_buf(),
                reason: format!("Failed to canonicalize path: {}", e),
            })?;
        if !canonical.is_dir() {
            return Err(ScanError::InvalidWorkspacePath {
                path: workspace.to_path_buf(),
                reason: "Not a directory".to_string(),
            });
        }

        context.cache().prepare()?;

        Ok(Self {
            workspace: canonical,
            context: Arc::new(context),
            managers: Mutex::new(Vec::new()),
        })
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    pub fn context(&self) -> &Arc<ScanContext> {
        &self.context
    }

    /// Current managers, in discovery order
    pub fn managers(&self) -> Vec<Arc<EcosystemScanManager>> {
        self.lock_managers().clone()
    }

    pub fn manager(&self, key: ManagerKey) -> Option<Arc<EcosystemScanManager>> {
        self.lock_managers().iter().find(|m| m.key() == key).cloned()
    }

    pub fn is_any_scan_in_progress(&self) -> bool {
        self.lock_managers().iter().any(|m| m.is_scan_in_progress())
    }

    /// Reconciles the manager set with the workspace.
    ///
    /// The package finder searches the workspace root plus every project path
    /// of the known managers. Maven gets one manager per project, rooted at
    /// each `pom.xml` directory without a `pom.xml` ancestor; nested module
    /// poms belong to that root's build. Other ecosystems get one
    /// manager per manifest directory. Existing managers are reused by key,
    /// the rest are dropped.
    pub fn refresh(&self) -> Vec<Arc<EcosystemScanManager>> {
        let existing: HashMap<ManagerKey, Arc<EcosystemScanManager>> = self
            .managers()
            .into_iter()
            .map(|m| (m.key(), m))
            .collect();

        let mut roots = BTreeSet::from([self.workspace.clone()]);
        for manager in existing.values() {
            roots.extend(manager.project_paths());
        }

        let dirs = match self.context.finder().find(&roots, self.context.exclude()) {
            Ok(dirs) => dirs,
            Err(e) => {
                warn!("Package discovery failed: {:#}", e);
                PackageDirs::new()
            }
        };
        debug!(manifests = dirs.total(), "Package discovery finished");

        let mut next: Vec<Arc<EcosystemScanManager>> = Vec::new();
        let mut seen: HashSet<ManagerKey> = HashSet::new();

        for dir in maven_project_roots(&dirs.get(Ecosystem::Maven)) {
            self.add_if_applicable(Ecosystem::Maven, dir, &existing, &mut next, &mut seen);
        }

        for ecosystem in Ecosystem::ALL
            .into_iter()
            .filter(|e| *e != Ecosystem::Maven)
        {
            for dir in dirs.get(ecosystem) {
                self.add_if_applicable(ecosystem, dir, &existing, &mut next, &mut seen);
            }
        }

        let reused = next
            .iter()
            .filter(|m| existing.contains_key(&m.key()))
            .count();
        info!(
            managers = next.len(),
            created = next.len() - reused,
            dropped = existing.len() - reused,
            "Scan managers refreshed"
        );

        *self.lock_managers() = next.clone();
        next
    }

    fn add_if_applicable(
        &self,
        ecosystem: Ecosystem,
        dir: &Path,
        existing: &HashMap<ManagerKey, Arc<EcosystemScanManager>>,
        next: &mut Vec<Arc<EcosystemScanManager>>,
        seen: &mut HashSet<ManagerKey>,
    ) {
        if !EcosystemScanManager::is_applicable(ecosystem, dir, &self.context) {
            return;
        }
        let key = ManagerKey::new(ecosystem, dir);
        if !seen.insert(key) {
            return;
        }
        let manager = existing.get(&key).cloned().unwrap_or_else(|| {
            debug!(%ecosystem, path = %dir.display(), "Creating scan manager");
            Arc::new(EcosystemScanManager::new(
                ecosystem,
                dir.to_path_buf(),
                Arc::clone(&self.context),
            ))
        });
        next.push(manager);
    }

    /// Refreshes and starts a background scan of every manager.
    ///
    /// Does nothing if any manager is still scanning, or if no vulnerability
    /// service is configured. The check is best effort: two callers racing
    /// past it are each still stopped by the per-manager single-flight flag.
    /// Must be called from within a tokio runtime.
    pub fn start_scan(&self, quick: bool) -> StartScanOutcome {
        if self.context.is_cancelled() {
            debug!("Registry closed, not starting a scan");
            return StartScanOutcome::Closed;
        }
        if self.is_any_scan_in_progress() {
            info!("Previous scan still running, skipping");
            return StartScanOutcome::AlreadyRunning;
        }
        if !self.context.is_configured() {
            warn!(
                "{}",
                ScanError::Configuration {
                    reason: "no server URL or credentials".to_string(),
                }
            );
            return StartScanOutcome::NotConfigured;
        }

        let managers = self.refresh();
        self.context.emit(ScanEvent::ComponentsChanged);
        self.context.emit(ScanEvent::IssuesChanged);

        info!(managers = managers.len(), quick, "Starting scan");
        StartScanOutcome::Started(
            managers
                .iter()
                .map(|m| m.async_scan_and_update_results(quick))
                .collect(),
        )
    }

    /// Awaits the tasks returned by [`start_scan`](Self::start_scan)
    pub async fn wait_for(handles: Vec<JoinHandle<ScanRun>>) -> Vec<ScanRun> {
        join_all(handles)
            .await
            .into_iter()
            .map(|joined| {
                joined.unwrap_or_else(|e| ScanRun::Failed(format!("scan task aborted: {}", e)))
            })
            .collect()
    }

    pub fn run_inspections_for_all(&self) {
        for manager in self.managers() {
            manager.run_inspections();
        }
    }

    /// Tells listeners that the embedding application changed the filter
    /// selection
    pub fn filter_changed(&self) {
        self.context.emit(ScanEvent::FilterChanged);
    }

    /// Cancels running scans; no new scan can be started afterwards
    pub fn close(&self) {
        info!("Closing scan registry");
        self.context.cancellation().cancel();
    }

    fn lock_managers(&self) -> MutexGuard<'_, Vec<Arc<EcosystemScanManager>>> {
        self.managers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Maven directories with no other Maven directory above them
fn maven_project_roots<'a>(dirs: &[&'a Path]) -> Vec<&'a Path> {
    dirs.iter()
        .copied()
        .filter(|dir| {
            !dirs
                .iter()
                .any(|other| other != dir && dir.starts_with(other))
        })
        .collect()
}
