/// Ecosystem tooling adapters: dependency resolvers backed by external tools
mod command;
mod go;
mod gradle;
mod maven;
mod npm;
mod pypi;
mod text_tree;

pub use command::{ToolCommand, ToolOutput, DEFAULT_TOOL_TIMEOUT};
pub use go::GoResolver;
pub use gradle::GradleResolver;
pub use maven::MavenResolver;
pub use npm::NpmResolver;
pub use pypi::PypiResolver;
