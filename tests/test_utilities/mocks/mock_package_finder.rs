use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use workspace_scan::ports::outbound::PackageDirs;
use workspace_scan::prelude::*;

/// Mock PackageFinder reporting a fixed set of manifest directories
///
/// Records the roots of every call so tests can check which paths the
/// registry asked for.
#[derive(Default, Clone)]
pub struct MockPackageFinder {
    dirs: Arc<Mutex<Vec<(Ecosystem, PathBuf)>>>,
    pub searched_roots: Arc<Mutex<Vec<BTreeSet<PathBuf>>>>,
}

impl MockPackageFinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dir(self, ecosystem: Ecosystem, dir: &Path) -> Self {
        self.add_dir(ecosystem, dir);
        self
    }

    pub fn add_dir(&self, ecosystem: Ecosystem, dir: &Path) {
        self.dirs.lock().unwrap().push((ecosystem, dir.to_path_buf()));
    }

    pub fn clear(&self) {
        self.dirs.lock().unwrap().clear();
    }

    pub fn call_count(&self) -> usize {
        self.searched_roots.lock().unwrap().len()
    }
}

impl PackageFinder for MockPackageFinder {
    fn find(&self, roots: &BTreeSet<PathBuf>, exclude: &ExcludeFilter) -> Result<PackageDirs> {
        self.searched_roots.lock().unwrap().push(roots.clone());
        let mut found = PackageDirs::new();
        for (ecosystem, dir) in self.dirs.lock().unwrap().iter() {
            if !exclude.is_excluded(dir) {
                found.insert(*ecosystem, dir.clone());
            }
        }
        Ok(found)
    }
}
