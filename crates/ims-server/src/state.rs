use std::sync::Arc;

use ims_release::{Catalog, CatalogResult};

use crate::config::ServerConfig;
use crate::error::{ApiError, ApiResult};

/// Shared handler state: the catalog and the server configuration.
#[derive(Clone, Debug)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(catalog: Catalog, config: ServerConfig) -> Self {
        Self {
            catalog: Arc::new(catalog),
            config: Arc::new(config),
        }
    }

    /// Run a catalog call on the blocking pool. Gateway and blob store
    /// calls are synchronous I/O.
    pub async fn run<T, F>(&self, f: F) -> ApiResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Catalog) -> CatalogResult<T> + Send + 'static,
    {
        let catalog = Arc::clone(&self.catalog);
        tokio::task::spawn_blocking(move || f(&catalog))
            .await
            .map_err(|e| ApiError::internal(format!("task failed: {e}")))?
            .map_err(ApiError::from)
    }
}
