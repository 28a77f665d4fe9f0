//! Identity resolution: match nodes of two independently built trees by id.
//!
//! Each tree is flattened into an id-keyed index. The union of identities is
//! laid out in one merged hierarchy: a node sits under its parent in the
//! other version when it exists there, otherwise under its parent in the
//! original version. Siblings keep the other version's order, with nodes that
//! only the original has slotted in after their preceding original sibling.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use tracing::warn;

use taxo_types::{NodeId, Resource, ResourceId, TaxonomyNode, TaxonomyTree};

/// Id-keyed view of one version's tree.
#[derive(Debug)]
pub struct VersionIndex<'a> {
    root: &'a NodeId,
    nodes: HashMap<&'a NodeId, &'a TaxonomyNode>,
    children: HashMap<&'a NodeId, Vec<&'a NodeId>>,
}

impl<'a> VersionIndex<'a> {
    pub fn new(tree: &'a TaxonomyTree) -> Self {
        let mut nodes = HashMap::with_capacity(tree.len());
        let mut children: HashMap<&NodeId, Vec<&NodeId>> = HashMap::new();
        nodes.insert(&tree.root.id, &tree.root);
        for node in &tree.nodes {
            nodes.insert(&node.id, node);
            if let Some(parent) = &node.parent_id {
                children.entry(parent).or_default().push(&node.id);
            }
        }
        Self {
            root: &tree.root.id,
            nodes,
            children,
        }
    }

    pub fn get(&self, id: &NodeId) -> Option<&'a TaxonomyNode> {
        self.nodes.get(id).copied()
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Parent of `id` within this version; `None` for the root.
    pub fn parent_of(&self, id: &NodeId) -> Option<&'a NodeId> {
        if id == self.root {
            return None;
        }
        self.get(id).and_then(|n| n.parent_id.as_ref())
    }

    /// Direct children of `id` in this version, in tree order.
    pub fn children_of(&self, id: &NodeId) -> &[&'a NodeId] {
        self.children.get(id).map(Vec::as_slice).unwrap_or_default()
    }
}

/// The (original, other) sides of one identity.
#[derive(Clone, Copy, Debug)]
pub struct IdentityPair<'a> {
    pub original: Option<&'a TaxonomyNode>,
    pub other: Option<&'a TaxonomyNode>,
}

/// The union of both trees' identities in one merged hierarchy.
#[derive(Debug)]
pub struct Resolution<'a> {
    root: NodeId,
    original: VersionIndex<'a>,
    other: VersionIndex<'a>,
    order: Vec<NodeId>,
    children: HashMap<NodeId, Vec<NodeId>>,
}

impl<'a> Resolution<'a> {
    pub fn root(&self) -> &NodeId {
        &self.root
    }

    /// Every identity in depth-first order of the merged hierarchy.
    pub fn order(&self) -> &[NodeId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn pair(&self, id: &NodeId) -> IdentityPair<'a> {
        IdentityPair {
            original: self.original.get(id),
            other: self.other.get(id),
        }
    }

    /// Children of `id` in the merged hierarchy.
    pub fn children_of(&self, id: &NodeId) -> &[NodeId] {
        self.children.get(id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Whether `id` has the same set of direct children in both versions.
    ///
    /// Membership only: order and rank are not considered.
    pub fn child_membership_equal(&self, id: &NodeId) -> bool {
        let original: HashSet<&NodeId> = self.original.children_of(id).iter().copied().collect();
        let other: HashSet<&NodeId> = self.other.children_of(id).iter().copied().collect();
        original == other
    }

    /// Iterate identities with both sides, in depth-first order.
    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, IdentityPair<'a>)> + '_ {
        self.order.iter().map(move |id| (id, self.pair(id)))
    }
}

/// Resolve the identities of two trees into one merged hierarchy.
///
/// The merged root is the other version's root. Identities not reachable
/// from it (a mismatched original root, or a parent that resolves in neither
/// tree) are attached directly beneath the root so none are dropped.
pub fn resolve_identities<'a>(
    original: &'a TaxonomyTree,
    other: &'a TaxonomyTree,
) -> Resolution<'a> {
    let original_index = VersionIndex::new(original);
    let other_index = VersionIndex::new(other);
    let root = other.root.id.clone();

    // Union of identities: other's tree order, then original-only nodes.
    let mut union: Vec<&NodeId> = other.iter().map(|n| &n.id).collect();
    union.extend(
        original
            .iter()
            .map(|n| &n.id)
            .filter(|id| !other_index.contains(id)),
    );

    let effective_parent = |id: &NodeId| -> Option<&'a NodeId> {
        if *id == root {
            None
        } else if other_index.contains(id) {
            other_index.parent_of(id)
        } else {
            original_index.parent_of(id)
        }
    };

    let mut children: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
    let mut parents: HashSet<&NodeId> = HashSet::new();
    for id in union.iter().copied() {
        if let Some(parent) = effective_parent(id) {
            parents.insert(parent);
        }
    }
    for parent in parents {
        let from_other: Vec<&NodeId> = other_index.children_of(parent).to_vec();
        let from_original: Vec<&NodeId> = original_index
            .children_of(parent)
            .iter()
            .copied()
            .filter(|c| effective_parent(*c) == Some(parent))
            .collect();
        let merged = merge_ordered(&from_original, &from_other);
        children.insert(parent.clone(), merged.into_iter().cloned().collect());
    }

    let mut order = Vec::with_capacity(union.len());
    let mut visited: HashSet<NodeId> = HashSet::with_capacity(union.len());
    walk(&root, &children, &mut visited, &mut order);

    let orphans: Vec<NodeId> = union
        .iter()
        .filter(|id| !visited.contains(**id))
        .map(|id| (*id).clone())
        .collect();
    if !orphans.is_empty() {
        warn!(count = orphans.len(), root = %root, "identities unreachable from root; attaching to root");
        for orphan in &orphans {
            if visited.contains(orphan) {
                continue;
            }
            children.entry(root.clone()).or_default().push(orphan.clone());
            walk(orphan, &children, &mut visited, &mut order);
        }
    }

    Resolution {
        root,
        original: original_index,
        other: other_index,
        order,
        children,
    }
}

fn walk(
    id: &NodeId,
    children: &HashMap<NodeId, Vec<NodeId>>,
    visited: &mut HashSet<NodeId>,
    order: &mut Vec<NodeId>,
) {
    if !visited.insert(id.clone()) {
        return;
    }
    order.push(id.clone());
    if let Some(kids) = children.get(id) {
        for kid in kids {
            walk(kid, children, visited, order);
        }
    }
}

/// The (original, other) sides of one attached resource.
pub type ResourcePair<'a> = (ResourceId, Option<&'a Resource>, Option<&'a Resource>);

/// Resolve the resources attached to one node identity across versions.
pub fn resolve_resources<'a>(
    original: Option<&'a TaxonomyNode>,
    other: Option<&'a TaxonomyNode>,
) -> Vec<ResourcePair<'a>> {
    let original_resources: &[Resource] = original.map(|n| n.resources.as_slice()).unwrap_or_default();
    let other_resources: &[Resource] = other.map(|n| n.resources.as_slice()).unwrap_or_default();

    let original_ids: Vec<&ResourceId> = original_resources.iter().map(|r| &r.id).collect();
    let other_ids: Vec<&ResourceId> = other_resources.iter().map(|r| &r.id).collect();

    merge_ordered(&original_ids, &other_ids)
        .into_iter()
        .map(|id| {
            let find = |list: &'a [Resource]| list.iter().find(|r| &r.id == id);
            (id.clone(), find(original_resources), find(other_resources))
        })
        .collect()
}

/// Whether a node has the same set of resource ids in both versions.
pub fn resource_membership_equal(
    original: Option<&TaxonomyNode>,
    other: Option<&TaxonomyNode>,
) -> bool {
    let ids = |n: Option<&TaxonomyNode>| -> HashSet<ResourceId> {
        n.map(|n| n.resources.iter().map(|r| r.id.clone()).collect())
            .unwrap_or_default()
    };
    ids(original) == ids(other)
}

/// Merge two ordered id lists, keeping `other`'s order.
///
/// Entries only in `original` are inserted directly after the closest
/// preceding `original` entry already placed, or at the front.
fn merge_ordered<T: Copy + Eq + Hash>(original: &[T], other: &[T]) -> Vec<T> {
    let mut merged: Vec<T> = Vec::with_capacity(original.len() + other.len());
    let mut placed: HashSet<T> = HashSet::with_capacity(original.len() + other.len());
    for id in other {
        if placed.insert(*id) {
            merged.push(*id);
        }
    }

    let mut cursor = 0;
    for id in original {
        if placed.contains(id) {
            if let Some(pos) = merged.iter().position(|m| m == id) {
                cursor = pos + 1;
            }
        } else {
            merged.insert(cursor, *id);
            placed.insert(*id);
            cursor += 1;
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use taxo_types::NodeType;

    fn subject() -> TaxonomyNode {
        TaxonomyNode::new("urn:subject:1", NodeType::Subject, "S1")
    }

    fn topic(n: u32, parent: &TaxonomyNode) -> TaxonomyNode {
        TaxonomyNode::new(format!("urn:topic:{n}"), NodeType::Topic, format!("T{n}")).under(parent)
    }

    fn ids(order: &[NodeId]) -> Vec<&str> {
        order.iter().map(|id| id.as_str()).collect()
    }

    #[test]
    fn merge_keeps_other_order_and_slots_removed_entries() {
        assert_eq!(merge_ordered(&[1, 2, 3], &[1, 3]), vec![1, 2, 3]);
        assert_eq!(merge_ordered(&[1, 2], &[3, 1]), vec![3, 1, 2]);
        assert_eq!(merge_ordered(&[9, 1], &[1, 4]), vec![9, 1, 4]);
        assert_eq!(merge_ordered::<u8>(&[], &[]), Vec::<u8>::new());
        assert_eq!(merge_ordered(&[5, 6], &[]), vec![5, 6]);
    }

    #[test]
    fn union_covers_both_sides_once() {
        let s = subject();
        let t1 = topic(1, &s);
        let t2 = topic(2, &s);
        let t3 = topic(3, &s);
        let original = TaxonomyTree::new(s.clone(), vec![t1.clone(), t2]);
        let other = TaxonomyTree::new(s, vec![t1, t3]);

        let resolution = resolve_identities(&original, &other);
        assert_eq!(
            ids(resolution.order()),
            vec!["urn:subject:1", "urn:topic:1", "urn:topic:2", "urn:topic:3"]
        );

        let deleted = resolution.pair(&NodeId::new("urn:topic:2"));
        assert!(deleted.original.is_some() && deleted.other.is_none());
        let added = resolution.pair(&NodeId::new("urn:topic:3"));
        assert!(added.original.is_none() && added.other.is_some());
        assert!(!resolution.child_membership_equal(resolution.root()));
    }

    #[test]
    fn moved_node_follows_other_parent() {
        let s = subject();
        let t1 = topic(1, &s);
        let t2 = topic(2, &s);
        let t10_in_t1 = topic(10, &t1);
        let t10_in_t2 = topic(10, &t2);

        let original = TaxonomyTree::new(s.clone(), vec![t1.clone(), t10_in_t1, t2.clone()]);
        let other = TaxonomyTree::new(s, vec![t1.clone(), t2.clone(), t10_in_t2]);

        let resolution = resolve_identities(&original, &other);
        assert_eq!(resolution.len(), 4);
        assert!(resolution.children_of(&t1.id).is_empty());
        assert_eq!(ids(resolution.children_of(&t2.id)), vec!["urn:topic:10"]);
        assert!(!resolution.child_membership_equal(&t1.id));
        assert!(!resolution.child_membership_equal(&t2.id));
    }

    #[test]
    fn deleted_subtree_keeps_original_shape() {
        let s = subject();
        let t1 = topic(1, &s);
        let t11 = topic(11, &t1);
        let t12 = topic(12, &t1);
        let original = TaxonomyTree::new(s.clone(), vec![t1.clone(), t11, t12]);
        let other = TaxonomyTree::leaf(s);

        let resolution = resolve_identities(&original, &other);
        assert_eq!(
            ids(resolution.order()),
            vec!["urn:subject:1", "urn:topic:1", "urn:topic:11", "urn:topic:12"]
        );
        assert_eq!(resolution.children_of(&t1.id).len(), 2);
    }

    #[test]
    fn mismatched_original_root_is_not_dropped() {
        let s = subject();
        let other_root = TaxonomyNode::new("urn:subject:2", NodeType::Subject, "S2");
        let t1 = topic(1, &s);
        let original = TaxonomyTree::new(s, vec![t1]);
        let other = TaxonomyTree::leaf(other_root);

        let resolution = resolve_identities(&original, &other);
        assert_eq!(
            ids(resolution.order()),
            vec!["urn:subject:2", "urn:subject:1", "urn:topic:1"]
        );
    }

    #[test]
    fn identical_trees_have_equal_membership_everywhere() {
        let s = subject();
        let t1 = topic(1, &s);
        let t11 = topic(11, &t1);
        let tree = TaxonomyTree::new(s, vec![t1, t11]);

        let resolution = resolve_identities(&tree, &tree);
        assert_eq!(resolution.len(), 3);
        for (id, pair) in resolution.iter() {
            assert!(pair.original.is_some() && pair.other.is_some());
            assert!(resolution.child_membership_equal(id));
        }
    }

    #[test]
    fn resources_resolved_per_node() {
        let a = TaxonomyNode::new("urn:topic:1", NodeType::Topic, "T")
            .with_resource(Resource::new("urn:resource:1", "R1"))
            .with_resource(Resource::new("urn:resource:2", "R2"));
        let b = TaxonomyNode::new("urn:topic:1", NodeType::Topic, "T")
            .with_resource(Resource::new("urn:resource:2", "R2"))
            .with_resource(Resource::new("urn:resource:3", "R3"));

        let pairs = resolve_resources(Some(&a), Some(&b));
        let resolved: Vec<(&str, bool, bool)> = pairs
            .iter()
            .map(|(id, o, t)| (id.as_str(), o.is_some(), t.is_some()))
            .collect();
        assert_eq!(
            resolved,
            vec![
                ("urn:resource:1", true, false),
                ("urn:resource:2", true, true),
                ("urn:resource:3", false, true),
            ]
        );
        assert!(!resource_membership_equal(Some(&a), Some(&b)));
        assert!(resource_membership_equal(Some(&a), Some(&a)));
        assert!(resource_membership_equal(None, None));
    }
}
