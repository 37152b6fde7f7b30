use crate::ports::outbound::FilterStateStore;
use crate::scan_engine::domain::FiltersState;
use crate::shared::Result;
use anyhow::Context;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// File name of the persisted filter selection inside the cache directory
pub const FILTERS_FILE_NAME: &str = "filters.json";

/// FileSystemFilterStateStore adapter keeping the filter selection as JSON
pub struct FileSystemFilterStateStore {
    path: PathBuf,
}

impl FileSystemFilterStateStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl FilterStateStore for FileSystemFilterStateStore {
    fn load(&self) -> FiltersState {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                debug!(path = %self.path.display(), "No saved filter state: {}", e);
                return FiltersState::default();
            }
        };
        serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!(path = %self.path.display(), "Ignoring unreadable filter state: {}", e);
            FiltersState::default()
        })
    }

    fn save(&self, state: &FiltersState) -> Result<()> {
        let dir = self
            .path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Invalid filter state path: {}", self.path.display()))?;
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;

        let json = serde_json::to_string_pretty(state).context("Failed to serialize filter state")?;
        let mut file = NamedTempFile::new_in(dir).context("Failed to create temporary file")?;
        file.write_all(json.as_bytes())
            .context("Failed to write filter state")?;
        file.persist(&self.path)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to save filter state to {}", self.path.display()))?;
        Ok(())
    }
}
