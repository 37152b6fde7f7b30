use crate::scan_engine::domain::{
    ComponentId, DependencyGraph, DependencyTree, NodeId, ResolvedModule,
};
use crate::shared::error::TreeError;
use std::collections::HashSet;
use tracing::{debug, warn};

/// TreeBuilder service turning resolver output into a dependency tree
///
/// Pure business logic: no I/O, no knowledge of where the graph came from.
/// Identical edges are dropped per parent so a diamond dependency appears once
/// under each of its parents. Edges pointing back at an ancestor are cut.
pub struct TreeBuilder;

impl TreeBuilder {
    /// Maximum recursion depth to prevent stack overflow on hostile graphs
    const MAX_RECURSION_DEPTH: usize = 100;

    /// Upper bound on nodes per tree; very wide diamond graphs expand
    /// combinatorially once unfolded per position
    const MAX_TREE_NODES: usize = 200_000;

    /// Builds a tree with one module root per resolved module.
    ///
    /// Modules whose identity is already present under the super-root are
    /// skipped with a warning.
    pub fn build(graph: &DependencyGraph) -> Result<DependencyTree, TreeError> {
        let mut tree = DependencyTree::new();
        let root = tree.root();

        for module in graph.modules() {
            let module_node = tree.create_module_node(module.name(), module.info().clone());
            match tree.add_child(root, module_node) {
                Ok(()) => {}
                Err(TreeError::DuplicateChild { child, .. }) => {
                    warn!(module = %child, "Skipping module reported twice by the resolver");
                    continue;
                }
                Err(e) => return Err(e),
            }

            let mut path = HashSet::new();
            path.insert(module.id().clone());
            let mut budget = Self::MAX_TREE_NODES.saturating_sub(tree.total_nodes());
            Self::attach_children(
                &mut tree,
                module,
                module_node,
                module.id(),
                &mut path,
                &mut budget,
                0,
            )?;
        }

        Ok(tree)
    }

    /// Recursively attaches the dependencies of `parent_id` under `parent_node`
    ///
    /// # Arguments
    /// * `path` - Identities on the way from the module root (cycle detection)
    /// * `budget` - Remaining node allowance for this module
    /// * `depth` - Current recursion depth (for DoS prevention)
    fn attach_children(
        tree: &mut DependencyTree,
        module: &ResolvedModule,
        parent_node: NodeId,
        parent_id: &ComponentId,
        path: &mut HashSet<ComponentId>,
        budget: &mut usize,
        depth: usize,
    ) -> Result<(), TreeError> {
        if depth >= Self::MAX_RECURSION_DEPTH {
            warn!(
                module = module.name(),
                component = %parent_id,
                "Maximum dependency depth ({}) reached, tree may be truncated",
                Self::MAX_RECURSION_DEPTH
            );
            return Ok(());
        }

        let mut seen: HashSet<&ComponentId> = HashSet::new();
        for child in module.dependencies_of(parent_id) {
            let child_id = child.id();
            if !seen.insert(child_id) {
                continue;
            }
            if path.contains(child_id) {
                debug!(component = %child_id, "Dependency cycle cut");
                continue;
            }
            if *budget == 0 {
                warn!(
                    module = module.name(),
                    "Dependency tree exceeds {} nodes, remaining edges dropped",
                    Self::MAX_TREE_NODES
                );
                return Ok(());
            }
            *budget -= 1;

            let node = tree.create_node(child.clone());
            tree.add_child(parent_node, node)?;

            path.insert(child_id.clone());
            Self::attach_children(tree, module, node, child_id, path, budget, depth + 1)?;
            path.remove(child_id);
        }
        Ok(())
    }
}
