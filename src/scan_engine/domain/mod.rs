pub mod annotation;
pub mod component;
pub mod dependency_graph;
pub mod dependency_tree;
pub mod filter_selection;
pub mod issue;
pub mod license;

pub use annotation::{CachedAnnotation, ComponentAnnotation};
pub use component::{ComponentId, Ecosystem, GeneralInfo, Scope};
pub use dependency_graph::{DependencyGraph, ResolvedModule};
pub use dependency_tree::{DependencyTree, Node, NodeId};
pub use filter_selection::{FilterSelection, FiltersState};
pub use issue::{Issue, IssueKey, IssueKind, Severity};
pub use license::License;
