//! Diff engine for taxonomy versions.
//!
//! Compares two snapshots of the same root node, each fetched for a different
//! version hash, and reports per node whether it was added, deleted or
//! modified, and whether anything beneath it changed.
//!
//! The engine is a pure, synchronous function over two immutable trees:
//!
//! 1. [`resolve_identities`] matches nodes across versions by id and lays the
//!    union out in one merged hierarchy.
//! 2. [`diff_node`] / [`diff_resource`] compare tracked fields per identity.
//! 3. [`propagate`] aggregates child and resource verdicts bottom-up.
//! 4. [`project`] prunes and linearizes for rendering.
//!
//! # Key Types
//!
//! - [`DiffType`] / [`FieldPair`] / [`NodeDiff`] -- per-identity verdicts
//! - [`DiffNode`] / [`DiffTree`] -- the propagated comparison
//! - [`DiffView`] / [`ViewOptions`] -- projected output for renderers

pub mod error;
pub mod field;
pub mod highlight;
pub mod propagate;
pub mod resolve;
pub mod summary;
pub mod view;

use tracing::debug;

use taxo_types::TaxonomyTree;

pub use error::{DiffError, DiffResult};
pub use field::{
    diff_node, diff_resource, Changed, DiffType, FieldPair, NodeDiff, ResourceDiff, TrackedField,
};
pub use highlight::{highlighted_fields, highlighted_resource_fields, text_delta, TextSegment};
pub use propagate::{propagate, DiffNode, DiffTree};
pub use resolve::{resolve_identities, IdentityPair, Resolution};
pub use summary::DiffSummary;
pub use view::{
    flatten, project, remove_unchanged_from_tree, DiffView, FlatDiffNode, NodeView, ViewMode,
    ViewOptions,
};

/// Compare two versions of a tree and propagate every verdict.
///
/// Both trees are expected to be rooted at the same node id and to satisfy
/// [`TaxonomyTree::validate`].
pub fn compare_trees(original: &TaxonomyTree, other: &TaxonomyTree) -> DiffTree {
    let resolution = resolve_identities(original, other);
    debug!(
        original = original.len(),
        other = other.len(),
        identities = resolution.len(),
        "resolved identities"
    );

    let tree = propagate(&resolution);
    debug!(identical = tree.is_identical(), "propagated diff tree");
    tree
}

/// Compare two versions of a tree and project the result for rendering.
pub fn diff_trees(
    original: &TaxonomyTree,
    other: &TaxonomyTree,
    options: &ViewOptions,
) -> DiffView {
    project(compare_trees(original, other), options)
}
