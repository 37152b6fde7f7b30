use crate::application::scan::{EcosystemScanManager, ManagerKey};
use crate::scan_engine::domain::{FilterSelection, Issue, IssueKey, License, NodeId};
use crate::scan_engine::services::FilterEngine;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

/// A tree node addressed across managers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef {
    pub manager: ManagerKey,
    pub node: NodeId,
}

impl NodeRef {
    pub fn new(manager: ManagerKey, node: NodeId) -> Self {
        Self { manager, node }
    }
}

/// Answers issue and license queries over every manager of a registry.
///
/// Each manager's tree answers for the part of the selection that addresses
/// it; the results are merged with the same identity and ordering rules as
/// a single tree.
pub struct ScanResultsQuery;

impl ScanResultsQuery {
    /// Issues under the selected nodes; an empty selection means every tree
    pub fn collect_issues(
        managers: &[Arc<EcosystemScanManager>],
        selected: &[NodeRef],
        selection: &FilterSelection,
    ) -> Vec<Issue> {
        let mut seen: HashSet<IssueKey> = HashSet::new();
        let mut issues = Vec::new();

        for manager in managers {
            let nodes: Vec<NodeId> = selected
                .iter()
                .filter(|r| r.manager == manager.key())
                .map(|r| r.node)
                .collect();
            if !selected.is_empty() && nodes.is_empty() {
                continue;
            }

            let found = manager.with_tree(|tree| FilterEngine::collect_issues(tree, &nodes, selection));
            issues.extend(found.into_iter().filter(|i| seen.insert(i.key())));
        }

        FilterEngine::sort_issues(&mut issues);
        issues
    }

    pub fn collect_licenses(managers: &[Arc<EcosystemScanManager>]) -> BTreeSet<License> {
        managers
            .iter()
            .flat_map(|m| m.with_tree(|tree| FilterEngine::collect_licenses(tree, tree.root())))
            .collect()
    }

    /// Sum of the per-occurrence issue counts of every tree
    pub fn count_issues(managers: &[Arc<EcosystemScanManager>]) -> usize {
        managers
            .iter()
            .map(|m| m.with_tree(|tree| tree.count_issues(tree.root())))
            .sum()
    }

    /// Makes every license and scope present in the trees known to the
    /// selection, so parked persisted values get applied
    pub fn register_filters(managers: &[Arc<EcosystemScanManager>], selection: &mut FilterSelection) {
        for manager in managers {
            manager.with_tree(|tree| {
                selection.register_licenses(&FilterEngine::collect_licenses(tree, tree.root()));
                selection.register_scopes(&tree.scopes());
            });
        }
    }
}
