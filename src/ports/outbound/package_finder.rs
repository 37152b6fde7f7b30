use crate::scan_engine::domain::Ecosystem;
use crate::scan_engine::services::ExcludeFilter;
use crate::shared::Result;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Manifest directories found per ecosystem
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageDirs {
    dirs: BTreeMap<Ecosystem, BTreeSet<PathBuf>>,
}

impl PackageDirs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, ecosystem: Ecosystem, dir: PathBuf) {
        self.dirs.entry(ecosystem).or_default().insert(dir);
    }

    /// Directories for one ecosystem, in path order
    pub fn get(&self, ecosystem: Ecosystem) -> Vec<&Path> {
        self.dirs
            .get(&ecosystem)
            .map(|set| set.iter().map(PathBuf::as_path).collect())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.values().all(BTreeSet::is_empty)
    }

    pub fn total(&self) -> usize {
        self.dirs.values().map(BTreeSet::len).sum()
    }
}

/// PackageFinder port for locating ecosystem manifests in a workspace
///
/// Roots may overlap; a directory reachable from several roots is reported
/// once.
pub trait PackageFinder: Send + Sync {
    /// Finds manifest directories under `roots`
    ///
    /// # Arguments
    /// * `roots` - Directories to search
    /// * `exclude` - Directories matching these globs are not entered
    ///
    /// # Errors
    /// Returns an error if none of the roots can be read
    fn find(&self, roots: &BTreeSet<PathBuf>, exclude: &ExcludeFilter) -> Result<PackageDirs>;
}
