use taxo_types::{NodeId, TypeError, VersionHash};

/// Errors from tree loading.
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    /// No snapshot exists for the requested version.
    #[error("version not found: {0}")]
    VersionNotFound(VersionHash),

    /// The version exists but does not contain the requested node.
    #[error("node {node} not found in version {version}")]
    NodeNotFound { node: NodeId, version: VersionHash },

    /// The snapshot produced a tree violating structural invariants.
    #[error("invalid tree in version {version}: {source}")]
    InvalidTree {
        version: VersionHash,
        #[source]
        source: TypeError,
    },

    /// A snapshot file declares a different version than its name.
    #[error("snapshot {expected} declares version {found}")]
    HashMismatch {
        expected: VersionHash,
        found: VersionHash,
    },

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for loader operations.
pub type LoaderResult<T> = Result<T, LoaderError>;
