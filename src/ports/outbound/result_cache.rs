use crate::scan_engine::domain::{CachedAnnotation, ComponentAnnotation, ComponentId};
use crate::shared::error::ScanError;
use crate::shared::Result;

/// ResultCache port for persisted scan annotations
///
/// An instance is scoped to one logical project. Reads never fail: an entry
/// that cannot be read is a miss.
pub trait ResultCache: Send + Sync {
    /// Makes sure the backing location exists
    ///
    /// # Errors
    /// Returns `ScanError::CacheDirectory` if the location cannot be created
    fn prepare(&self) -> std::result::Result<(), ScanError>;

    fn get(&self, component: &ComponentId) -> Option<CachedAnnotation>;

    /// Stores the latest annotation for its component, replacing any older one
    fn put(&self, annotation: &ComponentAnnotation) -> Result<()>;
}
