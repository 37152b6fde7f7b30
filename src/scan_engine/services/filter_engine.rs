use crate::scan_engine::domain::{
    DependencyTree, FilterSelection, Issue, IssueKey, License, Node, NodeId,
};
use std::collections::{BTreeSet, HashMap, HashSet};

/// FilterEngine answers visibility and aggregation queries over a tree
///
/// Stateless; the only input besides the tree is the caller-owned
/// [`FilterSelection`].
pub struct FilterEngine;

impl FilterEngine {
    /// A node is visible if it matches the selection itself or if any
    /// descendant is visible, so ancestors of a visible node are never pruned.
    pub fn is_visible(tree: &DependencyTree, node: NodeId, selection: &FilterSelection) -> bool {
        tree.collect_subtree(node).into_iter().any(|id| {
            tree.node(id)
                .is_some_and(|n| Self::matches_selection(n, selection))
        })
    }

    /// Own-annotation match, ignoring descendants
    fn matches_selection(node: &Node, selection: &FilterSelection) -> bool {
        // The synthetic super-root carries nothing to match on
        if node.info().is_none() {
            return false;
        }

        let license_ok = if node.licenses().is_empty() {
            selection.all_licenses_selected()
        } else {
            node.licenses()
                .iter()
                .any(|l| selection.is_license_selected(l.name()))
        };

        let severity_ok = node.issues().is_empty()
            || node
                .issues()
                .iter()
                .any(|i| selection.is_severity_selected(i.severity()));

        license_ok && severity_ok && Self::scope_selected(node, selection)
    }

    fn scope_selected(node: &Node, selection: &FilterSelection) -> bool {
        node.scope()
            .is_none_or(|s| selection.is_scope_selected(s.name()))
    }

    /// Pre-order list of the nodes that survive filtering, super-root excluded
    pub fn visible_nodes(tree: &DependencyTree, selection: &FilterSelection) -> Vec<NodeId> {
        let order = tree.collect_subtree(tree.root());
        let mut visible: HashMap<NodeId, bool> = HashMap::with_capacity(order.len());

        // Reverse pre-order visits every descendant before its ancestors
        for id in order.iter().rev() {
            let Some(node) = tree.node(*id) else {
                continue;
            };
            let any_child = node
                .children()
                .iter()
                .any(|c| visible.get(c).copied().unwrap_or(false));
            visible.insert(*id, any_child || Self::matches_selection(node, selection));
        }

        order
            .into_iter()
            .skip(1)
            .filter(|id| visible.get(id).copied().unwrap_or(false))
            .collect()
    }

    /// Issues under the selected nodes, deduplicated by (summary, component).
    ///
    /// An empty selection means the whole tree. Only issues whose severity is
    /// selected, found on nodes whose scope is selected, are returned; the
    /// result is ordered by severity (most severe first) then summary.
    pub fn collect_issues(
        tree: &DependencyTree,
        selected: &[NodeId],
        selection: &FilterSelection,
    ) -> Vec<Issue> {
        let roots: Vec<NodeId> = if selected.is_empty() {
            vec![tree.root()]
        } else {
            selected.to_vec()
        };

        let mut seen: HashSet<IssueKey> = HashSet::new();
        let mut issues = Vec::new();
        for root in roots {
            for id in tree.collect_subtree(root) {
                let Some(node) = tree.node(id) else {
                    continue;
                };
                if !Self::scope_selected(node, selection) {
                    continue;
                }
                for issue in node.issues() {
                    if selection.is_severity_selected(issue.severity()) && seen.insert(issue.key())
                    {
                        issues.push(issue.clone());
                    }
                }
            }
        }

        Self::sort_issues(&mut issues);
        issues
    }

    pub fn sort_issues(issues: &mut [Issue]) {
        issues.sort_by(|a, b| {
            b.severity()
                .cmp(&a.severity())
                .then_with(|| a.summary().cmp(b.summary()))
                .then_with(|| a.component().cmp(b.component()))
        });
    }

    /// Every license in the subtree, regardless of the selection
    pub fn collect_licenses(tree: &DependencyTree, node: NodeId) -> BTreeSet<License> {
        tree.collect_subtree(node)
            .into_iter()
            .filter_map(|id| tree.node(id))
            .flat_map(|n| n.licenses().iter().cloned())
            .collect()
    }
}
