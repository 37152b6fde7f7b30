mod exclude_filter;
mod filter_engine;
mod tree_builder;

pub use exclude_filter::{ExcludeFilter, DEFAULT_EXCLUDE_PATTERNS};
pub use filter_engine::FilterEngine;
pub use tree_builder::TreeBuilder;
