use async_trait::async_trait;

use taxo_types::{Language, NodeId, TaxonomyTree, TypeError, Version, VersionHash, VersionSnapshot};

use crate::error::{LoaderError, LoaderResult};

/// Resolves (node id, version hash, language) into a taxonomy tree.
///
/// All implementations must satisfy these invariants:
/// - `fetch_tree` is idempotent and safe to call concurrently, including for
///   the same node under different versions.
/// - Returned trees are localized to the requested language and valid
///   according to [`TaxonomyTree::validate`].
/// - Unknown versions and nodes are reported as errors, never as empty trees.
#[async_trait]
pub trait TreeLoader: Send + Sync {
    /// Fetch the subtree rooted at `node_id` as it exists in `version`.
    async fn fetch_tree(
        &self,
        node_id: &NodeId,
        version: &VersionHash,
        language: &Language,
    ) -> LoaderResult<TaxonomyTree>;

    /// List every known version, oldest first.
    async fn list_versions(&self) -> LoaderResult<Vec<Version>>;

    /// Fetch the same node under two versions concurrently.
    ///
    /// Fails if either fetch fails.
    async fn fetch_pair(
        &self,
        node_id: &NodeId,
        original: &VersionHash,
        other: &VersionHash,
        language: &Language,
    ) -> LoaderResult<(TaxonomyTree, TaxonomyTree)> {
        tokio::try_join!(
            self.fetch_tree(node_id, original, language),
            self.fetch_tree(node_id, other, language),
        )
    }
}

/// Materialize, localize and validate one subtree of a snapshot.
pub fn materialize(
    snapshot: &VersionSnapshot,
    node_id: &NodeId,
    language: &Language,
) -> LoaderResult<TaxonomyTree> {
    let version = snapshot.hash();
    let tree = snapshot.tree(node_id).map_err(|e| match e {
        TypeError::RootNotFound(node) => LoaderError::NodeNotFound {
            node,
            version: version.clone(),
        },
        source => LoaderError::InvalidTree {
            version: version.clone(),
            source,
        },
    })?;

    let tree = tree.localized(language);
    tree.validate().map_err(|source| LoaderError::InvalidTree {
        version: version.clone(),
        source,
    })?;
    Ok(tree)
}
