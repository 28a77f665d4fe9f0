//! File-backed loader reading one JSON snapshot per version.
//!
//! Layout: `<root>/<version-hash>.json`, each file a serialized
//! [`VersionSnapshot`]. Files are re-read on every fetch.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, warn};

use taxo_types::{Language, NodeId, TaxonomyTree, Version, VersionHash, VersionSnapshot};

use crate::error::{LoaderError, LoaderResult};
use crate::traits::{materialize, TreeLoader};

#[derive(Clone, Debug)]
pub struct FsTreeLoader {
    root: PathBuf,
}

impl FsTreeLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn snapshot_path(&self, version: &VersionHash) -> PathBuf {
        self.root.join(format!("{}.json", version.as_str()))
    }

    /// Read and decode the snapshot for `version`.
    pub async fn read_snapshot(&self, version: &VersionHash) -> LoaderResult<VersionSnapshot> {
        let path = self.snapshot_path(version);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(LoaderError::VersionNotFound(version.clone()))
            }
            Err(e) => return Err(e.into()),
        };
        let snapshot: VersionSnapshot = serde_json::from_slice(&bytes)
            .map_err(|e| LoaderError::Serialization(format!("{}: {e}", path.display())))?;
        if snapshot.hash() != version {
            return Err(LoaderError::HashMismatch {
                expected: version.clone(),
                found: snapshot.hash().clone(),
            });
        }
        debug!(version = %version, nodes = snapshot.nodes.len(), "snapshot loaded");
        Ok(snapshot)
    }

    /// Write a snapshot to `<root>/<hash>.json`, creating the root if needed.
    pub async fn write_snapshot(&self, snapshot: &VersionSnapshot) -> LoaderResult<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        let json = serde_json::to_vec_pretty(snapshot)
            .map_err(|e| LoaderError::Serialization(e.to_string()))?;
        tokio::fs::write(self.snapshot_path(snapshot.hash()), json).await?;
        Ok(())
    }
}

#[async_trait]
impl TreeLoader for FsTreeLoader {
    async fn fetch_tree(
        &self,
        node_id: &NodeId,
        version: &VersionHash,
        language: &Language,
    ) -> LoaderResult<TaxonomyTree> {
        let snapshot = self.read_snapshot(version).await?;
        materialize(&snapshot, node_id, language)
    }

    async fn list_versions(&self) -> LoaderResult<Vec<Version>> {
        let mut versions = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(hash) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| VersionHash::parse(s).ok())
            else {
                warn!("skipping snapshot with invalid name {:?}", path);
                continue;
            };
            match self.read_snapshot(&hash).await {
                Ok(snapshot) => versions.push(snapshot.version),
                Err(e) => warn!("skipping unreadable snapshot {:?}: {}", path, e),
            }
        }
        versions.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.hash.cmp(&b.hash)));
        Ok(versions)
    }
}
