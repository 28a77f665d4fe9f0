//! Foundation types for taxonomy version comparison.
//!
//! This crate provides the identity, structural and version types shared by
//! the loader, the diff engine and the outer surfaces. Every other `taxo-*`
//! crate depends on `taxo-types`.
//!
//! # Key Types
//!
//! - [`NodeId`] / [`ResourceId`] — stable identities matched across versions
//! - [`VersionHash`] — opaque selector of one immutable taxonomy snapshot
//! - [`TaxonomyNode`] / [`Resource`] — one version's view of a node and its attachments
//! - [`TaxonomyTree`] — a root node plus its ordered descendant set
//! - [`Version`] / [`VersionSnapshot`] — version metadata and the flat node set it owns

pub mod error;
pub mod id;
pub mod node;
pub mod tree;
pub mod version;

pub use error::{TypeError, TypeResult};
pub use id::{Language, NodeId, ResourceId, VersionHash};
pub use node::{Metadata, NodeType, Resource, TaxonomyNode};
pub use tree::TaxonomyTree;
pub use version::{Version, VersionSnapshot, VersionType};
