use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use workspace_scan::scan_engine::domain::CachedAnnotation;
use workspace_scan::shared::error::ScanError;
use workspace_scan::prelude::*;

/// In-memory ResultCache
#[derive(Default, Clone)]
pub struct InMemoryResultCache {
    pub entries: Arc<Mutex<HashMap<ComponentId, CachedAnnotation>>>,
    fail_prepare: bool,
}

impl InMemoryResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unwritable_directory() -> Self {
        Self {
            fail_prepare: true,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn contains(&self, component: &ComponentId) -> bool {
        self.entries.lock().unwrap().contains_key(component)
    }
}

impl ResultCache for InMemoryResultCache {
    fn prepare(&self) -> std::result::Result<(), ScanError> {
        if self.fail_prepare {
            return Err(ScanError::CacheDirectory {
                path: "/unwritable".into(),
                details: "Permission denied".to_string(),
            });
        }
        Ok(())
    }

    fn get(&self, component: &ComponentId) -> Option<CachedAnnotation> {
        self.entries.lock().unwrap().get(component).cloned()
    }

    fn put(&self, annotation: &ComponentAnnotation) -> Result<()> {
        self.entries.lock().unwrap().insert(
            annotation.component().clone(),
            CachedAnnotation::new(annotation.clone()),
        );
        Ok(())
    }
}
