//! Change counts over a diff tree.

use serde::Serialize;

use crate::field::DiffType;
use crate::propagate::DiffNode;

/// Counts of node and resource verdicts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffSummary {
    pub nodes_added: usize,
    pub nodes_deleted: usize,
    pub nodes_modified: usize,
    pub resources_added: usize,
    pub resources_deleted: usize,
    pub resources_modified: usize,
}

impl DiffSummary {
    pub fn from_nodes<'a>(nodes: impl IntoIterator<Item = &'a DiffNode>) -> Self {
        let mut summary = Self::default();
        for node in nodes {
            match node.diff.changed.diff_type {
                DiffType::Added => summary.nodes_added += 1,
                DiffType::Deleted => summary.nodes_deleted += 1,
                DiffType::Modified => summary.nodes_modified += 1,
                DiffType::None => {}
            }
            for resource in &node.resources {
                match resource.changed.diff_type {
                    DiffType::Added => summary.resources_added += 1,
                    DiffType::Deleted => summary.resources_deleted += 1,
                    DiffType::Modified => summary.resources_modified += 1,
                    DiffType::None => {}
                }
            }
        }
        summary
    }

    /// Total number of changed nodes and resources.
    pub fn total(&self) -> usize {
        self.nodes_added
            + self.nodes_deleted
            + self.nodes_modified
            + self.resources_added
            + self.resources_deleted
            + self.resources_modified
    }

    /// Returns `true` if no node or resource changed.
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}
