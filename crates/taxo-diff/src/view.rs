//! View projection: shape a propagated diff tree for rendering.
//!
//! Tree mode keeps the nested structure; flat mode linearizes it depth-first.
//! With [`NodeView::Changed`] subtrees without any change are pruned. The root
//! is always kept, and a comparison without any change is reported as
//! [`DiffView::Identical`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use taxo_types::NodeId;

use crate::error::DiffError;
use crate::field::{NodeDiff, ResourceDiff};
use crate::propagate::{DiffNode, DiffTree};

/// Nested or linear presentation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Tree,
    Flat,
}

impl FromStr for ViewMode {
    type Err = DiffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tree" => Ok(Self::Tree),
            "flat" => Ok(Self::Flat),
            other => Err(DiffError::InvalidViewOption {
                option: "view",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tree => write!(f, "tree"),
            Self::Flat => write!(f, "flat"),
        }
    }
}

/// Which nodes survive projection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeView {
    /// Keep only nodes that changed or contain a change.
    #[default]
    Changed,
    /// Keep every node.
    All,
}

impl FromStr for NodeView {
    type Err = DiffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "changed" => Ok(Self::Changed),
            "all" => Ok(Self::All),
            other => Err(DiffError::InvalidViewOption {
                option: "nodeView",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for NodeView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Changed => write!(f, "changed"),
            Self::All => write!(f, "all"),
        }
    }
}

/// Projection options, mirroring the comparison page's query parameters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewOptions {
    #[serde(default)]
    pub view: ViewMode,
    #[serde(default)]
    pub node_view: NodeView,
    /// Renderer-only field filter; never removes nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_view: Option<String>,
}

impl ViewOptions {
    pub fn new(view: ViewMode, node_view: NodeView) -> Self {
        Self {
            view,
            node_view,
            field_view: None,
        }
    }

    pub fn with_field_view(mut self, field_view: impl Into<String>) -> Self {
        self.field_view = Some(field_view.into());
        self
    }
}

/// One entry of the flat view.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatDiffNode {
    /// Distance from the root; the root is 0.
    pub depth: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<NodeId>,
    #[serde(flatten)]
    pub diff: NodeDiff,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<ResourceDiff>,
}

/// A projected diff ready for rendering.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "camelCase")]
pub enum DiffView {
    /// Nothing changed anywhere; carries the full, unpruned root.
    Identical { root: DiffNode },
    Tree(DiffNode),
    Flat(Vec<FlatDiffNode>),
}

impl DiffView {
    pub fn is_identical(&self) -> bool {
        matches!(self, Self::Identical { .. })
    }
}

/// Drop every node that neither changed nor contains a change.
///
/// Survival is decided bottom-up: a node is kept when any of its own verdicts
/// is not `NONE` or when any of its children survives. Surviving nodes have
/// their children pruned the same way. Applying it twice is a no-op.
pub fn remove_unchanged_from_tree(children: &[DiffNode]) -> Vec<DiffNode> {
    children
        .iter()
        .filter_map(|child| {
            let kept = remove_unchanged_from_tree(&child.children);
            if child.has_changes() || !kept.is_empty() {
                Some(DiffNode {
                    diff: child.diff.clone(),
                    resources: child.resources.clone(),
                    children: kept,
                })
            } else {
                None
            }
        })
        .collect()
}

/// Project a propagated diff tree according to `options`.
pub fn project(tree: DiffTree, options: &ViewOptions) -> DiffView {
    if tree.is_identical() {
        return DiffView::Identical { root: tree.root };
    }

    let mut root = tree.root;
    if options.node_view == NodeView::Changed {
        root.children = remove_unchanged_from_tree(&root.children);
    }

    match options.view {
        ViewMode::Tree => DiffView::Tree(root),
        ViewMode::Flat => DiffView::Flat(flatten(root)),
    }
}

/// Linearize a diff subtree depth-first, root first.
pub fn flatten(root: DiffNode) -> Vec<FlatDiffNode> {
    let mut out = Vec::new();
    let mut stack: Vec<(DiffNode, usize, Option<NodeId>)> = vec![(root, 0, None)];
    while let Some((node, depth, parent_id)) = stack.pop() {
        let DiffNode {
            diff,
            resources,
            children,
        } = node;
        let own_id = diff.node_id.clone();
        for child in children.into_iter().rev() {
            stack.push((child, depth + 1, Some(own_id.clone())));
        }
        out.push(FlatDiffNode {
            depth,
            parent_id,
            diff,
            resources,
        });
    }
    out
}
