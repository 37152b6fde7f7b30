use crate::scan_engine::domain::FiltersState;
use crate::shared::Result;

/// FilterStateStore port for the persisted filter selection
pub trait FilterStateStore {
    /// Loads the last saved state; a missing or unreadable state is the
    /// default (everything selected)
    fn load(&self) -> FiltersState;

    fn save(&self, state: &FiltersState) -> Result<()>;
}
