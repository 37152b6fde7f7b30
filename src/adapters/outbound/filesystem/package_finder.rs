use crate::ports::outbound::{PackageDirs, PackageFinder};
use crate::scan_engine::domain::Ecosystem;
use crate::scan_engine::services::ExcludeFilter;
use crate::shared::Result;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Directories never entered, independent of the configured globs
const SKIPPED_DIRS: [&str; 6] = ["node_modules", ".git", ".hg", ".svn", "target", "__pycache__"];

/// Maximum directory depth searched below a root
const MAX_SEARCH_DEPTH: usize = 32;

/// FileSystemPackageFinder adapter locating manifests with a directory walk
///
/// Exclude globs are matched against paths relative to the searched root,
/// so the location of the workspace itself never excludes it.
pub struct FileSystemPackageFinder {
    max_depth: usize,
}

impl FileSystemPackageFinder {
    pub fn new() -> Self {
        Self {
            max_depth: MAX_SEARCH_DEPTH,
        }
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    fn is_skipped(entry: &DirEntry, root: &Path, exclude: &ExcludeFilter) -> bool {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return false;
        }
        let name = entry.file_name().to_string_lossy();
        if SKIPPED_DIRS.contains(&name.as_ref()) {
            return true;
        }
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        exclude.is_excluded(relative)
    }

    fn search_root(&self, root: &Path, exclude: &ExcludeFilter, dirs: &mut PackageDirs) {
        let walker = WalkDir::new(root)
            .max_depth(self.max_depth)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| !Self::is_skipped(e, root, exclude));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(ecosystem) = entry
                .file_name()
                .to_str()
                .and_then(Ecosystem::from_manifest)
            else {
                continue;
            };
            if let Some(parent) = entry.path().parent() {
                dirs.insert(ecosystem, parent.to_path_buf());
            }
        }
    }
}

impl Default for FileSystemPackageFinder {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageFinder for FileSystemPackageFinder {
    fn find(&self, roots: &BTreeSet<PathBuf>, exclude: &ExcludeFilter) -> Result<PackageDirs> {
        let mut dirs = PackageDirs::new();
        let mut searched = 0;

        for root in roots {
            if !root.is_dir() {
                warn!(root = %root.display(), "Search root is not a directory, skipping");
                continue;
            }
            self.search_root(root, exclude, &mut dirs);
            searched += 1;
        }

        if searched == 0 && !roots.is_empty() {
            anyhow::bail!(
                "None of the {} search root(s) could be read",
                roots.len()
            );
        }
        debug!(roots = searched, manifests = dirs.total(), "Workspace search finished");
        Ok(dirs)
    }
}
