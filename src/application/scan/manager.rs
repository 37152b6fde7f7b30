use super::ScanContext;
use crate::ports::outbound::ScanEvent;
use crate::scan_engine::domain::{ComponentAnnotation, ComponentId, DependencyTree, Ecosystem};
use crate::scan_engine::services::TreeBuilder;
use crate::shared::error::ScanError;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Stable registry identity of a scan manager: a name-based UUID over
/// `(ecosystem, canonical root path)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ManagerKey(Uuid);

impl ManagerKey {
    pub fn new(ecosystem: Ecosystem, root: &Path) -> Self {
        let canonical = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
        let name = format!("{}:{}", ecosystem.as_str(), canonical.display());
        Self(Uuid::new_v5(&Uuid::NAMESPACE_URL, name.as_bytes()))
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for ManagerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    Building,
    Scanning,
    Merging,
}

/// Counters of one completed scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub components: usize,
    pub from_cache: usize,
    pub fetched: usize,
    /// Issue count over the whole tree, per occurrence
    pub issues: usize,
}

/// How a background scan ended. Errors stop at the manager boundary and are
/// only reported here as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanRun {
    Completed(ScanSummary),
    /// Another scan of the same manager was already running
    Skipped,
    Cancelled,
    Failed(String),
}

/// Resets the in-progress flag and the state when a scan ends, however it ends
struct InProgressGuard<'a> {
    manager: &'a EcosystemScanManager,
}

impl Drop for InProgressGuard<'_> {
    fn drop(&mut self) {
        self.manager.set_state(ScanState::Idle);
        self.manager.scan_in_progress.store(false, Ordering::Release);
    }
}

/// Scans one module (or, for Maven, one multi-module project) of one
/// ecosystem: builds its dependency tree, looks its components up, and
/// merges the findings back onto the tree.
pub struct EcosystemScanManager {
    key: ManagerKey,
    ecosystem: Ecosystem,
    root: PathBuf,
    context: Arc<ScanContext>,
    tree: RwLock<DependencyTree>,
    state: Mutex<ScanState>,
    scan_in_progress: AtomicBool,
    last_error: Mutex<Option<String>>,
}

impl EcosystemScanManager {
    pub fn new(ecosystem: Ecosystem, root: PathBuf, context: Arc<ScanContext>) -> Self {
        Self {
            key: ManagerKey::new(ecosystem, &root),
            ecosystem,
            root,
            context,
            tree: RwLock::new(DependencyTree::new()),
            state: Mutex::new(ScanState::Idle),
            scan_in_progress: AtomicBool::new(false),
            last_error: Mutex::new(None),
        }
    }

    /// Cheap, side-effect free probe: a manifest of `ecosystem` sits in `dir`
    /// and a resolver is registered for it. Maven also needs `mvn` on the
    /// path; without it Maven is simply not applicable.
    pub fn is_applicable(ecosystem: Ecosystem, dir: &Path, context: &ScanContext) -> bool {
        let Some(resolver) = context.resolver(ecosystem) else {
            return false;
        };
        let has_manifest = ecosystem
            .manifest_files()
            .iter()
            .any(|name| dir.join(name).is_file());
        if !has_manifest {
            return false;
        }
        if ecosystem == Ecosystem::Maven && !resolver.is_tool_available() {
            debug!(path = %dir.display(), "Maven tooling not found, skipping Maven projects");
            return false;
        }
        true
    }

    pub fn key(&self) -> ManagerKey {
        self.key
    }

    pub fn ecosystem(&self) -> Ecosystem {
        self.ecosystem
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn state(&self) -> ScanState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_scan_in_progress(&self) -> bool {
        self.scan_in_progress.load(Ordering::Acquire)
    }

    /// Message of the last failed scan, cleared by the next successful one
    pub fn last_error(&self) -> Option<String> {
        self.lock_last_error().clone()
    }

    /// Module root directories this manager is responsible for
    pub fn project_paths(&self) -> BTreeSet<PathBuf> {
        let tree = self.read_tree();
        let mut paths: BTreeSet<PathBuf> = tree
            .module_roots()
            .into_iter()
            .filter_map(|id| tree.node(id).and_then(|n| n.info()).and_then(|i| i.path()).cloned())
            .collect();
        paths.insert(self.root.clone());
        paths
    }

    /// Read access to the current tree
    pub fn with_tree<R>(&self, f: impl FnOnce(&DependencyTree) -> R) -> R {
        f(&self.read_tree())
    }

    pub fn tree_snapshot(&self) -> DependencyTree {
        self.read_tree().clone()
    }

    /// Spawns [`scan`](Self::scan) on the runtime and returns immediately
    pub fn async_scan_and_update_results(self: &Arc<Self>, quick: bool) -> JoinHandle<ScanRun> {
        let manager = Arc::clone(self);
        tokio::spawn(async move { manager.scan(quick).await })
    }

    /// Full scan: build the tree, then look components up and merge.
    ///
    /// Single-flight: while a scan of this manager runs, further calls
    /// return [`ScanRun::Skipped`] at once.
    pub async fn scan(&self, quick: bool) -> ScanRun {
        let Some(_guard) = self.try_begin() else {
            info!(manager = %self.key, ecosystem = %self.ecosystem, "Scan already in progress, skipping");
            return ScanRun::Skipped;
        };

        let result = async {
            self.build_tree().await?;
            self.scan_and_cache_inner(quick).await
        }
        .await;

        match result {
            Ok(summary) => {
                *self.lock_last_error() = None;
                self.run_inspections();
                info!(
                    manager = %self.key,
                    ecosystem = %self.ecosystem,
                    components = summary.components,
                    cached = summary.from_cache,
                    fetched = summary.fetched,
                    issues = summary.issues,
                    "Scan finished"
                );
                ScanRun::Completed(summary)
            }
            Err(e) if e.is_cancellation() => {
                debug!(manager = %self.key, "Scan cancelled");
                ScanRun::Cancelled
            }
            Err(e) => {
                error!(manager = %self.key, ecosystem = %self.ecosystem, path = %self.root.display(), "{}", e);
                let message = e.to_string();
                *self.lock_last_error() = Some(message.clone());
                ScanRun::Failed(message)
            }
        }
    }

    /// Resolves the module graph and replaces the tree with a freshly built one.
    ///
    /// On failure the previous tree stays in place. Returns the node count.
    pub async fn build_tree(&self) -> Result<usize, ScanError> {
        self.set_state(ScanState::Building);
        self.ensure_not_cancelled()?;

        let resolver = self
            .context
            .resolver(self.ecosystem)
            .cloned()
            .ok_or_else(|| self.discovery_error("no resolver registered".to_string()))?;

        debug!(manager = %self.key, path = %self.root.display(), "Resolving dependencies");
        let graph = resolver
            .resolve(&self.root)
            .await
            .map_err(|e| self.discovery_error(format!("{:#}", e)))?;
        // The resolver ran to completion; drop its output if we were cancelled meanwhile
        self.ensure_not_cancelled()?;

        let tree = TreeBuilder::build(&graph)?;
        let nodes = tree.total_nodes();
        *self.write_tree() = tree;
        self.context.emit(ScanEvent::ComponentsChanged);

        debug!(manager = %self.key, nodes, "Dependency tree built");
        Ok(nodes)
    }

    /// Looks up the tree's components and merges the findings.
    ///
    /// Returns `Ok(None)` without doing anything if a scan of this manager
    /// is already running.
    pub async fn scan_and_cache(&self, quick: bool) -> Result<Option<ScanSummary>, ScanError> {
        let Some(_guard) = self.try_begin() else {
            info!(manager = %self.key, "Scan already in progress, skipping");
            return Ok(None);
        };
        self.scan_and_cache_inner(quick).await.map(Some)
    }

    async fn scan_and_cache_inner(&self, quick: bool) -> Result<ScanSummary, ScanError> {
        self.set_state(ScanState::Scanning);
        let components: Vec<ComponentId> = self.read_tree().components().into_iter().collect();
        let mut summary = ScanSummary {
            components: components.len(),
            ..ScanSummary::default()
        };

        let mut annotations = Vec::with_capacity(components.len());
        let mut misses = Vec::new();
        for component in components {
            let cached = if quick {
                self.context.cache().get(&component)
            } else {
                None
            };
            match cached {
                Some(hit) => {
                    annotations.push(hit.annotation);
                    summary.from_cache += 1;
                }
                None => misses.push(component),
            }
        }

        if misses.is_empty() {
            summary.issues = self.merge(&annotations);
            return Ok(summary);
        }

        let service = self
            .context
            .service()
            .cloned()
            .ok_or_else(|| ScanError::Configuration {
                reason: "no vulnerability service is configured".to_string(),
            })?;

        self.ensure_not_cancelled()?;
        debug!(manager = %self.key, components = misses.len(), "Querying vulnerability service");
        let response = async {
            service.check_compatibility().await?;
            service.scan(&misses).await
        }
        .await;
        self.ensure_not_cancelled()?;

        match response {
            Ok(fresh) => {
                let mut by_component: HashMap<ComponentId, ComponentAnnotation> = fresh
                    .into_iter()
                    .map(|a| (a.component().clone(), a))
                    .collect();
                for component in misses {
                    let annotation = by_component
                        .remove(&component)
                        .unwrap_or_else(|| ComponentAnnotation::clean(component));
                    if let Err(e) = self.context.cache().put(&annotation) {
                        warn!(component = %annotation.component(), "Failed to cache scan result: {:#}", e);
                    }
                    annotations.push(annotation);
                    summary.fetched += 1;
                }
                summary.issues = self.merge(&annotations);
                Ok(summary)
            }
            Err(e) => {
                // Serve whatever the cache still has for the components we failed to fetch
                let mut stale = 0;
                for component in &misses {
                    if let Some(hit) = self.context.cache().get(component) {
                        annotations.push(hit.annotation);
                        stale += 1;
                    }
                }
                warn!(manager = %self.key, stale, "Vulnerability service failed, showing cached results");
                self.merge(&annotations);
                Err(ScanError::Service(e))
            }
        }
    }

    /// Annotates the tree in one write-locked pass and returns the tree's
    /// issue count
    fn merge(&self, annotations: &[ComponentAnnotation]) -> usize {
        self.set_state(ScanState::Merging);
        let issues = {
            let mut tree = self.write_tree();
            tree.begin_merge();
            for annotation in annotations {
                tree.merge_annotation(
                    annotation.component(),
                    annotation.issues(),
                    annotation.licenses(),
                );
            }
            let root = tree.root();
            tree.count_issues(root)
        };
        self.context.emit(ScanEvent::IssuesChanged);
        issues
    }

    /// Hands the merged tree to the inspection runner, if one is configured
    pub fn run_inspections(&self) {
        let Some(runner) = self.context.inspections() else {
            return;
        };
        let tree = self.read_tree();
        if let Err(e) = runner.run_inspections(self.ecosystem, &tree) {
            warn!(manager = %self.key, "Inspections failed: {:#}", e);
        }
    }

    fn try_begin(&self) -> Option<InProgressGuard<'_>> {
        self.scan_in_progress
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InProgressGuard { manager: self })
    }

    fn ensure_not_cancelled(&self) -> Result<(), ScanError> {
        if self.context.is_cancelled() {
            Err(ScanError::Cancelled)
        } else {
            Ok(())
        }
    }

    fn discovery_error(&self, details: String) -> ScanError {
        ScanError::Discovery {
            ecosystem: self.ecosystem.to_string(),
            path: self.root.clone(),
            details,
        }
    }

    fn set_state(&self, state: ScanState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    fn lock_last_error(&self) -> MutexGuard<'_, Option<String>> {
        self.last_error.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_tree(&self) -> RwLockReadGuard<'_, DependencyTree> {
        self.tree.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_tree(&self) -> RwLockWriteGuard<'_, DependencyTree> {
        self.tree.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for EcosystemScanManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EcosystemScanManager")
            .field("key", &self.key)
            .field("ecosystem", &self.ecosystem)
            .field("root", &self.root)
            .field("state", &self.state())
            .finish()
    }
}
