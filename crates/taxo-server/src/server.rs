use std::sync::Arc;

use tokio::net::TcpListener;

use taxo_loader::{FsTreeLoader, TreeLoader};

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::handler::AppState;
use crate::router::build_router;

/// Taxonomy comparison server.
pub struct TaxoServer {
    config: ServerConfig,
    loader: Arc<dyn TreeLoader>,
}

impl TaxoServer {
    /// Serve snapshots from `config.snapshot_root`.
    pub fn new(config: ServerConfig) -> Self {
        let loader = Arc::new(FsTreeLoader::new(config.snapshot_root.clone()));
        Self { config, loader }
    }

    pub fn with_loader(config: ServerConfig, loader: Arc<dyn TreeLoader>) -> Self {
        Self { config, loader }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(AppState::new(
            Arc::clone(&self.loader),
            self.config.default_language.clone(),
        ))
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!(
            snapshots = %self.config.snapshot_root.display(),
            "taxo server listening on {}",
            self.config.bind_addr
        );
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_construction() {
        let server = TaxoServer::new(ServerConfig::default());
        assert_eq!(server.config().bind_addr, "127.0.0.1:9419".parse().unwrap());
    }

    #[test]
    fn router_builds() {
        let server = TaxoServer::new(ServerConfig::default());
        let _router = server.router();
    }
}
