//! HTTP surface for comparing taxonomy versions.
//!
//! Serves the comparison page's data: both versions of a node's subtree are
//! fetched concurrently through a [`taxo_loader::TreeLoader`], run through
//! the diff engine and returned as JSON.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use handler::{AppState, CompareQuery, CompareResponse};
pub use server::TaxoServer;
