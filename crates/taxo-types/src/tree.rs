//! One version's materialized subtree.
//!
//! A [`TaxonomyTree`] is a root node plus every descendant, flattened into an
//! ordered sequence linked by `parent_id`. Trees are produced by the loader and
//! consumed read-only by the diff engine.
//!
//! # Invariants (checked by [`TaxonomyTree::validate`])
//!
//! - Node ids are unique within the tree, root included.
//! - Every non-root node's `parent_id` resolves to a node in the same tree.
//! - Resource ids are unique within their owning node.
//! - Subjects carry no resources.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{TypeError, TypeResult};
use crate::id::{Language, NodeId};
use crate::node::TaxonomyNode;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyTree {
    pub root: TaxonomyNode,
    #[serde(default)]
    pub nodes: Vec<TaxonomyNode>,
}

impl TaxonomyTree {
    pub fn new(root: TaxonomyNode, nodes: Vec<TaxonomyNode>) -> Self {
        Self { root, nodes }
    }

    /// A tree consisting of the root alone.
    pub fn leaf(root: TaxonomyNode) -> Self {
        Self::new(root, Vec::new())
    }

    /// Build the subtree rooted at `root_id` from a flat node list.
    ///
    /// Nodes outside the subtree are dropped. Descendants are emitted in
    /// depth-first order, siblings keeping their relative input order.
    pub fn from_nodes(
        root_id: &NodeId,
        nodes: impl IntoIterator<Item = TaxonomyNode>,
    ) -> TypeResult<Self> {
        let mut by_id: HashMap<NodeId, TaxonomyNode> = HashMap::new();
        let mut children: HashMap<NodeId, Vec<NodeId>> = HashMap::new();

        for node in nodes {
            if by_id.contains_key(&node.id) {
                return Err(TypeError::DuplicateNode(node.id));
            }
            if let Some(parent) = &node.parent_id {
                children.entry(parent.clone()).or_default().push(node.id.clone());
            }
            by_id.insert(node.id.clone(), node);
        }

        let root = by_id
            .remove(root_id)
            .ok_or_else(|| TypeError::RootNotFound(root_id.clone()))?;

        let mut descendants = Vec::new();
        let mut stack: Vec<NodeId> = children
            .get(root_id)
            .map(|ids| ids.iter().rev().cloned().collect())
            .unwrap_or_default();

        while let Some(id) = stack.pop() {
            // A cycle back through the root leaves `id` already taken.
            let Some(node) = by_id.remove(&id) else {
                continue;
            };
            if let Some(kids) = children.get(&id) {
                stack.extend(kids.iter().rev().cloned());
            }
            descendants.push(node);
        }

        Ok(Self::new(root, descendants))
    }

    /// Number of nodes including the root.
    pub fn len(&self) -> usize {
        self.nodes.len() + 1
    }

    /// Always `false`: a tree has at least its root.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterate the root followed by every descendant.
    pub fn iter(&self) -> impl Iterator<Item = &TaxonomyNode> {
        std::iter::once(&self.root).chain(self.nodes.iter())
    }

    /// Find a node (root included) by id.
    pub fn get(&self, id: &NodeId) -> Option<&TaxonomyNode> {
        self.iter().find(|n| &n.id == id)
    }

    /// Direct children of `id`, in tree order.
    pub fn children_of<'a>(&'a self, id: &'a NodeId) -> impl Iterator<Item = &'a TaxonomyNode> {
        self.nodes
            .iter()
            .filter(move |n| n.parent_id.as_ref() == Some(id))
    }

    /// Check the structural invariants listed in the module docs.
    pub fn validate(&self) -> TypeResult<()> {
        let mut seen: HashSet<&NodeId> = HashSet::new();
        for node in self.iter() {
            if !seen.insert(&node.id) {
                return Err(TypeError::DuplicateNode(node.id.clone()));
            }
        }

        for node in &self.nodes {
            let parent = node
                .parent_id
                .as_ref()
                .ok_or_else(|| TypeError::MissingParent(node.id.clone()))?;
            if !seen.contains(parent) {
                return Err(TypeError::DanglingParent {
                    node: node.id.clone(),
                    parent: parent.clone(),
                });
            }
        }

        for node in self.iter() {
            if !node.resources.is_empty() && !node.node_type.carries_resources() {
                return Err(TypeError::ResourcesNotAllowed(node.id.clone()));
            }
            let mut resource_ids = HashSet::new();
            for resource in &node.resources {
                if !resource_ids.insert(&resource.id) {
                    return Err(TypeError::DuplicateResource {
                        node: node.id.clone(),
                        resource: resource.id.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Apply `language` translations to every node in the tree.
    pub fn localized(self, language: &Language) -> Self {
        Self {
            root: self.root.localized(language),
            nodes: self
                .nodes
                .into_iter()
                .map(|n| n.localized(language))
                .collect(),
        }
    }
}
