use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TypeResult;
use crate::id::{NodeId, VersionHash};
use crate::node::TaxonomyNode;
use crate::tree::TaxonomyTree;

/// Lifecycle stage of a taxonomy version.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VersionType {
    #[default]
    Beta,
    Published,
    Archived,
}

impl std::fmt::Display for VersionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Beta => write!(f, "BETA"),
            Self::Published => write!(f, "PUBLISHED"),
            Self::Archived => write!(f, "ARCHIVED"),
        }
    }
}

/// Metadata describing one named, immutable taxonomy version.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    pub hash: VersionHash,
    pub name: String,
    #[serde(default)]
    pub version_type: VersionType,
    #[serde(default)]
    pub locked: bool,
    pub created_at: DateTime<Utc>,
}

impl Version {
    pub fn new(hash: VersionHash, name: impl Into<String>) -> Self {
        Self {
            hash,
            name: name.into(),
            version_type: VersionType::Beta,
            locked: false,
            created_at: Utc::now(),
        }
    }
}

/// A version's metadata together with its full, flat node set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionSnapshot {
    pub version: Version,
    #[serde(default)]
    pub nodes: Vec<TaxonomyNode>,
}

impl VersionSnapshot {
    pub fn new(version: Version, nodes: Vec<TaxonomyNode>) -> Self {
        Self { version, nodes }
    }

    pub fn hash(&self) -> &VersionHash {
        &self.version.hash
    }

    /// Materialize the subtree rooted at `root_id`.
    pub fn tree(&self, root_id: &NodeId) -> TypeResult<TaxonomyTree> {
        TaxonomyTree::from_nodes(root_id, self.nodes.iter().cloned())
    }
}
