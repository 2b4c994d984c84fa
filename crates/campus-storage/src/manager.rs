//! Storage manager: owns the configured provider and the retry policy for
//! blob deletes.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use campus_core::config::StorageConfig;
use campus_core::error::AppError;
use campus_core::result::AppResult;
use campus_core::traits::storage::StorageProvider;

use crate::providers::{LocalStorageProvider, MemoryStorageProvider};

/// Delay between blob delete attempts.
const DELETE_RETRY_DELAY: Duration = Duration::from_millis(25);

/// Handle to the active blob store.
#[derive(Debug, Clone)]
pub struct StorageManager {
    provider: Arc<dyn StorageProvider>,
    delete_retries: u32,
}

impl StorageManager {
    /// Wrap a provider with the given number of delete retries.
    pub fn new(provider: Arc<dyn StorageProvider>, delete_retries: u32) -> Self {
        Self {
            provider,
            delete_retries,
        }
    }

    /// Build the provider named in configuration.
    pub async fn from_config(config: &StorageConfig) -> AppResult<Self> {
        let provider: Arc<dyn StorageProvider> = match config.provider.as_str() {
            "local" => Arc::new(LocalStorageProvider::new(&config.local.root_path).await?),
            "memory" => Arc::new(MemoryStorageProvider::new()),
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown storage provider '{other}'"
                )));
            }
        };
        info!(
            provider = provider.provider_type(),
            delete_retries = config.delete_retries,
            "Storage provider ready"
        );
        Ok(Self::new(provider, config.delete_retries))
    }

    /// The active provider.
    pub fn provider(&self) -> &Arc<dyn StorageProvider> {
        &self.provider
    }

    /// Delete a blob, retrying failures up to the configured count.
    ///
    /// Returns the last error if every attempt failed.
    pub async fn delete_with_retries(&self, path: &str) -> AppResult<()> {
        let attempts = self.delete_retries.max(1);
        let mut attempt = 1;
        loop {
            match self.provider.delete(path).await {
                Ok(()) => return Ok(()),
                Err(e) if attempt >= attempts => return Err(e),
                Err(e) => {
                    warn!(path, attempt, error = %e, "Blob delete failed; retrying");
                    tokio::time::sleep(DELETE_RETRY_DELAY * attempt).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Delete several blobs, returning the refs that could not be removed.
    pub async fn delete_all(&self, paths: &[String]) -> Vec<String> {
        let mut leftovers = Vec::new();
        for path in paths {
            if self.delete_with_retries(path).await.is_err() {
                leftovers.push(path.clone());
            }
        }
        leftovers
    }

    /// Check provider health.
    pub async fn health_check(&self) -> bool {
        self.provider.health_check().await.unwrap_or(false)
    }
}
