use thiserror::Error;

use crate::id::{NodeId, ResourceId};

/// Errors produced by type construction and tree validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid version hash: {0:?}")]
    InvalidVersionHash(String),

    #[error("invalid language code: {0:?}")]
    InvalidLanguage(String),

    #[error("duplicate node id {0}")]
    DuplicateNode(NodeId),

    #[error("duplicate resource {resource} on node {node}")]
    DuplicateResource { node: NodeId, resource: ResourceId },

    #[error("node {node} references unknown parent {parent}")]
    DanglingParent { node: NodeId, parent: NodeId },

    #[error("non-root node {0} has no parent")]
    MissingParent(NodeId),

    #[error("root node {0} not found")]
    RootNotFound(NodeId),

    #[error("node {0} of type SUBJECT cannot carry resources")]
    ResourcesNotAllowed(NodeId),
}

/// Result alias for type operations.
pub type TypeResult<T> = Result<T, TypeError>;
