use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use taxo_types::{Language, NodeId, TaxonomyTree, Version, VersionHash, VersionSnapshot};

use crate::error::{LoaderError, LoaderResult};
use crate::traits::{materialize, TreeLoader};

/// In-memory, HashMap-based tree loader.
///
/// Intended for tests and embedding. Snapshots are held behind a `RwLock`
/// and trees are materialized on every fetch.
pub struct InMemoryTreeLoader {
    snapshots: RwLock<HashMap<VersionHash, VersionSnapshot>>,
}

impl InMemoryTreeLoader {
    pub fn new() -> Self {
        Self {
            snapshots: RwLock::new(HashMap::new()),
        }
    }

    /// Build a loader preloaded with `snapshots`.
    pub fn with_snapshots(snapshots: impl IntoIterator<Item = VersionSnapshot>) -> Self {
        let loader = Self::new();
        for snapshot in snapshots {
            loader.insert(snapshot);
        }
        loader
    }

    /// Add or replace the snapshot for its version hash.
    pub fn insert(&self, snapshot: VersionSnapshot) {
        let mut map = self.snapshots.write().expect("lock poisoned");
        map.insert(snapshot.hash().clone(), snapshot);
    }

    /// Remove a version. Returns `true` if it existed.
    pub fn remove(&self, version: &VersionHash) -> bool {
        self.snapshots
            .write()
            .expect("lock poisoned")
            .remove(version)
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.snapshots.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.read().expect("lock poisoned").is_empty()
    }
}

impl Default for InMemoryTreeLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TreeLoader for InMemoryTreeLoader {
    async fn fetch_tree(
        &self,
        node_id: &NodeId,
        version: &VersionHash,
        language: &Language,
    ) -> LoaderResult<TaxonomyTree> {
        let map = self.snapshots.read().expect("lock poisoned");
        let snapshot = map
            .get(version)
            .ok_or_else(|| LoaderError::VersionNotFound(version.clone()))?;
        materialize(snapshot, node_id, language)
    }

    async fn list_versions(&self) -> LoaderResult<Vec<Version>> {
        let map = self.snapshots.read().expect("lock poisoned");
        let mut versions: Vec<Version> = map.values().map(|s| s.version.clone()).collect();
        versions.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.hash.cmp(&b.hash)));
        Ok(versions)
    }
}

impl std::fmt::Debug for InMemoryTreeLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryTreeLoader")
            .field("version_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taxo_types::{NodeType, TaxonomyNode};

    fn hash(s: &str) -> VersionHash {
        VersionHash::parse(s).unwrap()
    }

    fn snapshot(version: &str, topic_name: &str) -> VersionSnapshot {
        let s = TaxonomyNode::new("urn:subject:1", NodeType::Subject, "Math");
        let t = TaxonomyNode::new("urn:topic:1", NodeType::Topic, topic_name).under(&s);
        VersionSnapshot::new(Version::new(hash(version), version), vec![s, t])
    }

    #[tokio::test]
    async fn fetch_known_version() {
        let loader = InMemoryTreeLoader::with_snapshots([snapshot("v1", "Algebra")]);
        let tree = loader
            .fetch_tree(&NodeId::new("urn:subject:1"), &hash("v1"), &Language::default())
            .await
            .unwrap();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.nodes[0].name, "Algebra");
    }

    #[tokio::test]
    async fn fetch_unknown_version() {
        let loader = InMemoryTreeLoader::new();
        let err = loader
            .fetch_tree(&NodeId::new("urn:subject:1"), &hash("nope"), &Language::default())
            .await
            .unwrap_err();
        assert!(matches!(err, LoaderError::VersionNotFound(_)));
    }

    #[tokio::test]
    async fn fetch_pair_returns_both_versions() {
        let loader = InMemoryTreeLoader::with_snapshots([
            snapshot("v1", "Algebra"),
            snapshot("v2", "Algebra II"),
        ]);
        let (a, b) = loader
            .fetch_pair(
                &NodeId::new("urn:subject:1"),
                &hash("v1"),
                &hash("v2"),
                &Language::default(),
            )
            .await
            .unwrap();
        assert_eq!(a.nodes[0].name, "Algebra");
        assert_eq!(b.nodes[0].name, "Algebra II");
    }

    #[tokio::test]
    async fn fetch_pair_fails_if_either_side_fails() {
        let loader = InMemoryTreeLoader::with_snapshots([snapshot("v1", "Algebra")]);
        let result = loader
            .fetch_pair(
                &NodeId::new("urn:subject:1"),
                &hash("v1"),
                &hash("missing"),
                &Language::default(),
            )
            .await;
        assert!(matches!(result, Err(LoaderError::VersionNotFound(v)) if v.as_str() == "missing"));
    }

    #[tokio::test]
    async fn fetch_is_idempotent() {
        let loader = InMemoryTreeLoader::with_snapshots([snapshot("v1", "Algebra")]);
        let id = NodeId::new("urn:subject:1");
        let first = loader.fetch_tree(&id, &hash("v1"), &Language::default()).await.unwrap();
        let second = loader.fetch_tree(&id, &hash("v1"), &Language::default()).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn list_and_remove_versions() {
        let loader = InMemoryTreeLoader::with_snapshots([snapshot("v1", "A"), snapshot("v2", "B")]);
        assert_eq!(loader.list_versions().await.unwrap().len(), 2);
        assert!(loader.remove(&hash("v1")));
        assert!(!loader.remove(&hash("v1")));
        assert_eq!(loader.len(), 1);
    }
}
