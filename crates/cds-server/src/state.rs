use std::path::PathBuf;
use std::sync::Arc;

use cds_store::{ContentId, PackageStore};

/// Default request body limit for uploads.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 512 * 1024 * 1024;

/// Settings of the HTTP surface.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    base_path: String,
    pub static_dir: Option<PathBuf>,
    pub max_upload_bytes: usize,
}

impl ServerConfig {
    pub fn new() -> Self {
        Self {
            base_path: String::new(),
            static_dir: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    /// Mount point of all routes. `""` and `"/"` mount at the root;
    /// anything else is normalized to `/segment[/segment...]`.
    pub fn with_base_path(mut self, base_path: &str) -> Self {
        let trimmed = base_path.trim_matches('/');
        self.base_path = if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{trimmed}")
        };
        self
    }

    pub fn with_static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = Some(dir.into());
        self
    }

    pub fn with_max_upload_bytes(mut self, limit: usize) -> Self {
        self.max_upload_bytes = limit;
        self
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared application state passed to all route handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    store: Arc<PackageStore>,
    config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(store: Arc<PackageStore>, config: ServerConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    pub fn store(&self) -> &Arc<PackageStore> {
        &self.store
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Public URL of a package archive.
    pub fn package_url(&self, id: &ContentId) -> String {
        format!("{}/{id}", self.config.base_path)
    }
}
