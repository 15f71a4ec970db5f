use axum::Router;
use sess_repo::SessionRepository;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;

/// Session store HTTP server.
pub struct SessionServer {
    config: ServerConfig,
    repo: SessionRepository,
}

impl SessionServer {
    /// Open the configured store and prepare a server over it.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let repo = config.open_repository()?;
        Ok(Self { config, repo })
    }

    /// Serve an existing repository.
    pub fn with_repository(config: ServerConfig, repo: SessionRepository) -> Self {
        Self { config, repo }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> Router {
        build_router(self.repo.clone(), self.config.max_body_bytes)
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!(
            addr = %self.config.bind_addr,
            journal = ?self.config.journal_path,
            "session server listening"
        );
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}
