use std::sync::Arc;

use ims_db::SqliteGateway;
use ims_release::Catalog;
use ims_store::FileBlobStore;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;
use crate::state::AppState;

/// IMS release server.
pub struct ImsServer {
    state: AppState,
}

/// Open the SQLite database and image directory named by `config`.
pub fn open_catalog(config: &ServerConfig) -> ServerResult<Catalog> {
    config.validate()?;
    std::fs::create_dir_all(&config.image_directory)?;
    let gateway = SqliteGateway::open(&config.database_path)?;
    let blobs = FileBlobStore::new(config.image_directory.clone());
    Ok(
        Catalog::new(Arc::new(gateway), Arc::new(blobs), config.scanlator.clone())
            .with_thumbnail_bounds(config.thumbnail),
    )
}

impl ImsServer {
    pub fn open(config: ServerConfig) -> ServerResult<Self> {
        let catalog = open_catalog(&config)?;
        Ok(Self::with_catalog(catalog, config))
    }

    /// Serve an already assembled catalog (useful for testing).
    pub fn with_catalog(catalog: Catalog, config: ServerConfig) -> Self {
        Self {
            state: AppState::new(catalog, config),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.state.config
    }

    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone())
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let addr = self.state.config.bind_addr;
        let app = self.router();
        let listener = TcpListener::bind(addr).await?;
        tracing::info!(%addr, scanlator = %self.state.config.scanlator, "IMS release server listening");
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}
