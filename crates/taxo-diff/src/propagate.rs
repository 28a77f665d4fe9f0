//! Change propagation: fold child and resource verdicts into their parent.
//!
//! The diff tree is built bottom-up by a pure recursive function: each
//! node's children are diffed and aggregated before the node reads them, so
//! every aggregate is final when its parent consumes it.

use serde::Serialize;

use taxo_types::{NodeId, TaxonomyNode};

use crate::field::{diff_node, diff_resource, Changed, DiffType, NodeDiff, ResourceDiff};
use crate::resolve::{resolve_resources, resource_membership_equal, Resolution};
use crate::summary::DiffSummary;

/// A node diff together with its diffed children and resources.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffNode {
    #[serde(flatten)]
    pub diff: NodeDiff,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<ResourceDiff>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DiffNode>,
}

impl DiffNode {
    pub fn id(&self) -> &NodeId {
        &self.diff.node_id
    }

    /// Whether this node or anything beneath it changed.
    pub fn has_changes(&self) -> bool {
        self.diff.has_changes()
    }

    /// Depth-first, pre-order iteration over this node and its descendants.
    pub fn iter(&self) -> DiffNodeIter<'_> {
        DiffNodeIter { stack: vec![self] }
    }

    /// Find a node by id in this subtree.
    pub fn find(&self, id: &NodeId) -> Option<&DiffNode> {
        self.iter().find(|n| n.id() == id)
    }
}

/// Pre-order iterator over a [`DiffNode`] subtree.
pub struct DiffNodeIter<'a> {
    stack: Vec<&'a DiffNode>,
}

impl<'a> Iterator for DiffNodeIter<'a> {
    type Item = &'a DiffNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// The fully propagated comparison of two trees.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DiffTree {
    pub root: DiffNode,
}

impl DiffTree {
    /// Returns `true` if nothing changed anywhere in the tree.
    pub fn is_identical(&self) -> bool {
        !self.root.has_changes()
    }

    /// Number of node identities in the tree.
    pub fn len(&self) -> usize {
        self.root.iter().count()
    }

    /// Always `false`: the tree holds at least its root.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> DiffNodeIter<'_> {
        self.root.iter()
    }

    pub fn find(&self, id: &NodeId) -> Option<&DiffNode> {
        self.root.find(id)
    }

    pub fn summary(&self) -> DiffSummary {
        DiffSummary::from_nodes(self.iter())
    }
}

/// Build the propagated diff tree from a resolution.
pub fn propagate(resolution: &Resolution<'_>) -> DiffTree {
    DiffTree {
        root: build_node(resolution, resolution.root()),
    }
}

fn build_node(resolution: &Resolution<'_>, id: &NodeId) -> DiffNode {
    let pair = resolution.pair(id);

    let children: Vec<DiffNode> = resolution
        .children_of(id)
        .iter()
        .map(|child| build_node(resolution, child))
        .collect();

    let resources: Vec<ResourceDiff> = resolve_resources(pair.original, pair.other)
        .into_iter()
        .map(|(rid, original, other)| diff_resource(&rid, original, other))
        .collect();

    let mut diff = diff_node(id, pair.original, pair.other);

    if diff.node_type.has_children() {
        let verdicts = children.iter().flat_map(|c| c.diff.verdicts());
        diff.children_changed = Some(Changed::new(DiffType::aggregate(
            verdicts,
            resolution.child_membership_equal(id),
        )));
    }

    if carries_resources(pair.original) || carries_resources(pair.other) {
        let verdicts = resources.iter().map(|r| r.changed.diff_type);
        diff.resources_changed = Some(Changed::new(DiffType::aggregate(
            verdicts,
            resource_membership_equal(pair.original, pair.other),
        )));
    }

    DiffNode {
        diff,
        resources,
        children,
    }
}

fn carries_resources(node: Option<&TaxonomyNode>) -> bool {
    node.is_some_and(|n| n.node_type.carries_resources() || !n.resources.is_empty())
}
