/// Filesystem adapters: workspace search, persisted state and report output
mod file_writer;
mod filter_state_store;
mod manifest_reader;
mod package_finder;
mod result_cache;

pub use file_writer::{FileSystemWriter, StdoutPresenter};
pub use filter_state_store::{FileSystemFilterStateStore, FILTERS_FILE_NAME};
pub use manifest_reader::ManifestReader;
pub use package_finder::FileSystemPackageFinder;
pub use result_cache::FileSystemResultCache;
