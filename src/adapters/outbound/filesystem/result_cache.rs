use crate::ports::outbound::ResultCache;
use crate::scan_engine::domain::{CachedAnnotation, ComponentAnnotation, ComponentId};
use crate::shared::error::ScanError;
use crate::shared::Result;
use anyhow::Context;
use dashmap::DashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tempfile::NamedTempFile;
use tracing::{debug, warn};
use uuid::Uuid;

/// Maximum size of one cache entry (1 MB)
const MAX_ENTRY_SIZE: u64 = 1024 * 1024;

/// FileSystemResultCache adapter persisting annotations as JSON files
///
/// Layout: `<cache_dir>/<project-key>/<component-uuid>.json`, where both
/// keys are name-based UUIDs. Entries are written to a temporary file in the
/// same directory and renamed into place, so readers never see a partial
/// entry. Access to one entry is serialized through a per-entry lock; distinct
/// entries proceed in parallel. A lock is dropped from the map once no caller
/// holds it.
pub struct FileSystemResultCache {
    project_dir: PathBuf,
    locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl FileSystemResultCache {
    /// Creates a cache for the logical project `project`
    ///
    /// Nothing is touched on disk until [`ResultCache::prepare`] is called.
    pub fn new(cache_dir: &Path, project: &str) -> Self {
        Self {
            project_dir: cache_dir.join(Self::project_key(project).to_string()),
            locks: DashMap::new(),
        }
    }

    pub fn project_key(project: &str) -> Uuid {
        Uuid::new_v5(&Uuid::NAMESPACE_URL, project.as_bytes())
    }

    /// Maven and Gradle share component strings, so the ecosystem is part of the key
    pub fn entry_key(component: &ComponentId) -> Uuid {
        let name = format!(
            "{}/{}",
            component.ecosystem().as_str(),
            component.to_component_string()
        );
        Uuid::new_v5(&Uuid::NAMESPACE_URL, name.as_bytes())
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    fn entry_path(&self, key: Uuid) -> PathBuf {
        self.project_dir.join(format!("{}.json", key))
    }

    fn with_entry_lock<T>(&self, key: Uuid, f: impl FnOnce() -> T) -> T {
        let lock = Arc::clone(self.locks.entry(key).or_default().value());
        let result = {
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            f()
        };
        drop(lock);
        self.locks.remove_if(&key, |_, lock| Arc::strong_count(lock) == 1);
        result
    }

    fn read_entry(&self, path: &Path) -> Result<Option<CachedAnnotation>> {
        let metadata = match fs::symlink_metadata(path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).context("Failed to read cache entry metadata"),
        };
        if !metadata.is_file() {
            anyhow::bail!("{} is not a regular file", path.display());
        }
        if metadata.len() > MAX_ENTRY_SIZE {
            anyhow::bail!(
                "{} is too large ({} bytes). Maximum allowed size is {} bytes.",
                path.display(),
                metadata.len(),
                MAX_ENTRY_SIZE
            );
        }

        let content = fs::read_to_string(path).context("Failed to read cache entry")?;
        let entry: CachedAnnotation =
            serde_json::from_str(&content).context("Failed to parse cache entry")?;
        Ok(Some(entry))
    }

    fn write_entry(&self, path: &Path, entry: &CachedAnnotation) -> Result<()> {
        let json = serde_json::to_vec(entry).context("Failed to serialize cache entry")?;
        let mut file = NamedTempFile::new_in(&self.project_dir)
            .context("Failed to create temporary cache file")?;
        file.write_all(&json)
            .context("Failed to write temporary cache file")?;
        file.persist(path)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to move cache entry into {}", path.display()))?;
        Ok(())
    }
}

impl ResultCache for FileSystemResultCache {
    fn prepare(&self) -> std::result::Result<(), ScanError> {
        fs::create_dir_all(&self.project_dir).map_err(|e| ScanError::CacheDirectory {
            path: self.project_dir.clone(),
            details: e.to_string(),
        })?;
        debug!(path = %self.project_dir.display(), "Result cache ready");
        Ok(())
    }

    fn get(&self, component: &ComponentId) -> Option<CachedAnnotation> {
        let key = Self::entry_key(component);
        let path = self.entry_path(key);

        match self.with_entry_lock(key, || self.read_entry(&path)) {
            Ok(Some(entry)) if entry.annotation.component() == component => Some(entry),
            Ok(Some(_)) => {
                warn!(%component, "Cache entry belongs to another component, ignoring");
                None
            }
            Ok(None) => None,
            Err(e) => {
                warn!(%component, "Unreadable cache entry treated as a miss: {:#}", e);
                None
            }
        }
    }

    fn put(&self, annotation: &ComponentAnnotation) -> Result<()> {
        let key = Self::entry_key(annotation.component());
        let path = self.entry_path(key);

        self.with_entry_lock(key, || {
            self.write_entry(&path, &CachedAnnotation::new(annotation.clone()))
        })
    }
}
