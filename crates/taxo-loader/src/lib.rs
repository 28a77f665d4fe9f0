//! Tree loaders for taxonomy version comparison.
//!
//! A loader resolves a version hash and a root node id into a fully
//! materialized [`TaxonomyTree`](taxo_types::TaxonomyTree). The diff engine
//! consumes two such trees; loaders are the only place that performs I/O.
//!
//! # Backends
//!
//! All backends implement the [`TreeLoader`] trait:
//!
//! - [`InMemoryTreeLoader`] -- `HashMap`-based loader for tests and embedding
//! - [`FsTreeLoader`] -- reads `<root>/<version-hash>.json` snapshot files
//!
//! # Design Rules
//!
//! 1. Fetching is idempotent: the same (node, version, language) always yields the same tree.
//! 2. Every returned tree is localized and has passed [`TaxonomyTree::validate`](taxo_types::TaxonomyTree::validate).
//! 3. The two sides of a comparison are fetched concurrently via [`TreeLoader::fetch_pair`].
//! 4. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod fs;
pub mod memory;
pub mod traits;

pub use error::{LoaderError, LoaderResult};
pub use fs::FsTreeLoader;
pub use memory::InMemoryTreeLoader;
pub use traits::{materialize, TreeLoader};
