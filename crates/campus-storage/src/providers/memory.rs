//! In-memory storage provider.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use campus_core::error::AppError;
use campus_core::result::AppResult;
use campus_core::traits::storage::{ByteStream, StorageProvider};

/// Keeps blobs in a map. Used by tests and the `memory` storage provider.
///
/// Writes and deletes can be made to fail on demand.
#[derive(Debug, Default)]
pub struct MemoryStorageProvider {
    blobs: RwLock<HashMap<String, Bytes>>,
    fail_writes: AtomicBool,
    failing_deletes: AtomicU32,
}

impl MemoryStorageProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make the next `count` deletes fail.
    pub fn fail_next_deletes(&self, count: u32) {
        self.failing_deletes.store(count, Ordering::SeqCst);
    }

    /// Number of stored blobs.
    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    /// Whether no blob is stored.
    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }

    /// Paths of every stored blob, sorted.
    pub async fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.blobs.read().await.keys().cloned().collect();
        paths.sort();
        paths
    }

    fn take_delete_fault(&self) -> bool {
        self.failing_deletes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl StorageProvider for MemoryStorageProvider {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn write(&self, path: &str, data: Bytes) -> AppResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::storage(format!("Injected write failure: {path}")));
        }
        self.blobs.write().await.insert(path.to_string(), data);
        Ok(())
    }

    async fn read(&self, path: &str) -> AppResult<ByteStream> {
        let data = self.read_bytes(path).await?;
        Ok(Box::pin(futures::stream::once(async move {
            Ok::<_, std::io::Error>(data)
        })))
    }

    async fn read_bytes(&self, path: &str) -> AppResult<Bytes> {
        self.blobs
            .read()
            .await
            .get(path)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Blob not found: {path}")))
    }

    async fn delete(&self, path: &str) -> AppResult<()> {
        if self.take_delete_fault() {
            return Err(AppError::storage(format!("Injected delete failure: {path}")));
        }
        self.blobs.write().await.remove(path);
        Ok(())
    }

    async fn exists(&self, path: &str) -> AppResult<bool> {
        Ok(self.blobs.read().await.contains_key(path))
    }
}
