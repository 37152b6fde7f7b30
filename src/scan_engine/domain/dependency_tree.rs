//! Arena-backed dependency tree.
//!
//! Nodes live in a single `Vec` and are addressed by [`NodeId`]. Children are
//! ordered id lists; the parent index is kept for navigation only and never
//! used for traversal. Module roots of one manager are siblings under a
//! synthetic super-root which is never displayed.

use super::{ComponentId, GeneralInfo, Issue, License, Scope};
use crate::shared::error::TreeError;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

/// Display name of the synthetic super-root
const SUPER_ROOT_NAME: &str = "All";

/// Stable index of a node inside one [`DependencyTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    name: String,
    info: Option<GeneralInfo>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    issues: Vec<Issue>,
    licenses: BTreeSet<License>,
    module_root: bool,
    generation: u64,
}

impl Node {
    fn new(name: String, info: Option<GeneralInfo>, module_root: bool) -> Self {
        Self {
            name,
            info,
            parent: None,
            children: Vec::new(),
            issues: Vec::new(),
            licenses: BTreeSet::new(),
            module_root,
            generation: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `None` only for the synthetic super-root
    pub fn info(&self) -> Option<&GeneralInfo> {
        self.info.as_ref()
    }

    pub fn component(&self) -> Option<&ComponentId> {
        self.info.as_ref().map(|i| i.id())
    }

    pub fn scope(&self) -> Option<&Scope> {
        self.info.as_ref().and_then(|i| i.scope())
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn licenses(&self) -> &BTreeSet<License> {
        &self.licenses
    }

    pub fn is_module_root(&self) -> bool {
        self.module_root
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Ordered multi-child tree of component descriptors plus scan annotations
#[derive(Debug, Clone, PartialEq)]
pub struct DependencyTree {
    nodes: Vec<Node>,
    index: HashMap<ComponentId, Vec<NodeId>>,
    sealed: bool,
    generation: u64,
}

impl Default for DependencyTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DependencyTree {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(SUPER_ROOT_NAME.to_string(), None, false)],
            index: HashMap::new(),
            sealed: false,
            generation: 0,
        }
    }

    /// The synthetic super-root
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Number of attached nodes, super-root excluded
    pub fn total_nodes(&self) -> usize {
        self.collect_subtree(self.root()).len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.nodes[0].children.is_empty()
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Creates a detached dependency node labelled by its coordinates
    pub fn create_node(&mut self, info: GeneralInfo) -> NodeId {
        let name = info.id().to_string();
        self.push(Node::new(name, Some(info), false))
    }

    /// Creates a detached node representing a discovered package manifest
    pub fn create_module_node(&mut self, name: impl Into<String>, info: GeneralInfo) -> NodeId {
        self.push(Node::new(name.into(), Some(info), true))
    }

    fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    /// Attaches `child` (and its subtree) as the last child of `parent`.
    ///
    /// Fails if an identity-equal child already sits directly under `parent`,
    /// if the tree has been sealed by a merge, or if the edge would break the
    /// single-owner invariant.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        if self.sealed {
            return Err(TreeError::Sealed);
        }
        self.check(parent)?;
        self.check(child)?;
        if child == self.root() || self.nodes[child.0].parent.is_some() {
            return Err(TreeError::AlreadyAttached(self.nodes[child.0].name.clone()));
        }
        if self.ancestors_inclusive(parent).contains(&child) {
            return Err(TreeError::Cycle(self.nodes[child.0].name.clone()));
        }
        if let Some(child_id) = self.nodes[child.0].component() {
            let duplicate = self.nodes[parent.0]
                .children
                .iter()
                .any(|c| self.nodes[c.0].component() == Some(child_id));
            if duplicate {
                return Err(TreeError::DuplicateChild {
                    parent: self.nodes[parent.0].name.clone(),
                    child: self.nodes[child.0].name.clone(),
                });
            }
        }

        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        if self.is_attached(parent) {
            for id in self.collect_subtree(child) {
                if let Some(component) = self.nodes[id.0].component().cloned() {
                    self.index.entry(component).or_default().push(id);
                }
            }
        }
        Ok(())
    }

    fn check(&self, id: NodeId) -> Result<(), TreeError> {
        if id.0 < self.nodes.len() {
            Ok(())
        } else {
            Err(TreeError::UnknownNode(id.0))
        }
    }

    /// `id` followed by its ancestors; empty for an unknown id
    fn ancestors_inclusive(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut current = self.nodes.get(id.0).map(|_| id);
        while let Some(p) = current {
            chain.push(p);
            current = self.nodes[p.0].parent;
        }
        chain
    }

    fn is_attached(&self, id: NodeId) -> bool {
        self.ancestors_inclusive(id).last() == Some(&self.root())
    }

    /// Parent lookup for navigation (never used for ownership)
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|n| n.parent)
    }

    /// Number of edges between the super-root and `id`; 0 for an unknown id
    pub fn depth(&self, id: NodeId) -> usize {
        self.ancestors_inclusive(id).len().saturating_sub(1)
    }

    /// All attached nodes carrying `identity`
    pub fn find(&self, identity: &ComponentId) -> &[NodeId] {
        self.index.get(identity).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn module_roots(&self) -> Vec<NodeId> {
        self.nodes[0]
            .children
            .iter()
            .copied()
            .filter(|id| self.nodes[id.0].module_root)
            .collect()
    }

    /// Starts a new merge generation and seals the structure.
    pub fn begin_merge(&mut self) -> u64 {
        self.sealed = true;
        self.generation += 1;
        self.generation
    }

    /// Annotates every node matching `identity`.
    ///
    /// Within one merge generation annotations accumulate; a node still
    /// carrying a previous generation's annotation has it replaced. Each
    /// node's sets are swapped in a single assignment. Returns the number of
    /// annotated nodes.
    pub fn merge_annotation(
        &mut self,
        identity: &ComponentId,
        issues: &[Issue],
        licenses: &[License],
    ) -> usize {
        if self.generation == 0 {
            self.begin_merge();
        }
        let generation = self.generation;
        let targets = self.find(identity).to_vec();

        for id in &targets {
            let node = &mut self.nodes[id.0];
            let (mut merged_issues, mut merged_licenses) = if node.generation == generation {
                (node.issues.clone(), node.licenses.clone())
            } else {
                (Vec::new(), BTreeSet::new())
            };

            let mut seen: HashSet<_> = merged_issues.iter().map(Issue::key).collect();
            for issue in issues {
                if seen.insert(issue.key()) {
                    merged_issues.push(issue.clone());
                }
            }
            merged_licenses.extend(licenses.iter().cloned());

            node.issues = merged_issues;
            node.licenses = merged_licenses;
            node.generation = generation;
        }
        targets.len()
    }

    /// Pre-order traversal of the subtree rooted at `id`.
    ///
    /// Returns a materialized list; an unknown id yields an empty list.
    pub fn collect_subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if self.check(id).is_err() {
            return out;
        }
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            for child in self.nodes[current.0].children.iter().rev() {
                stack.push(*child);
            }
        }
        out
    }

    /// Issue count of the subtree, counted per tree occurrence.
    pub fn count_issues(&self, id: NodeId) -> usize {
        self.collect_subtree(id)
            .iter()
            .map(|n| self.nodes[n.0].issues.len())
            .sum()
    }

    /// Unique component set submitted for scanning (module roots excluded)
    pub fn components(&self) -> BTreeSet<ComponentId> {
        self.collect_subtree(self.root())
            .into_iter()
            .filter(|id| !self.nodes[id.0].module_root)
            .filter_map(|id| self.nodes[id.0].component().cloned())
            .collect()
    }

    /// Every scope name present in the tree
    pub fn scopes(&self) -> BTreeSet<Scope> {
        self.collect_subtree(self.root())
            .into_iter()
            .filter_map(|id| self.nodes[id.0].scope().cloned())
            .collect()
    }
}
