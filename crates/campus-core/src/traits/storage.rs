//! Storage provider trait for pluggable blob storage backends.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

use crate::result::AppResult;

/// A boxed stream of blob chunks.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Trait for attachment blob storage backends.
///
/// Paths are opaque `storage_ref` strings produced by the attachment
/// handler. Implementations live in `campus-storage` (local filesystem and
/// in-memory).
#[async_trait]
pub trait StorageProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g. `"local"`, `"memory"`).
    fn provider_type(&self) -> &str;

    /// Check whether the provider is healthy and reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Write bytes to the given path, replacing any existing blob.
    async fn write(&self, path: &str, data: Bytes) -> AppResult<()>;

    /// Open a blob as a chunk stream. A missing blob is `NotFound`.
    async fn read(&self, path: &str) -> AppResult<ByteStream>;

    /// Read a blob into memory.
    async fn read_bytes(&self, path: &str) -> AppResult<Bytes>;

    /// Delete the blob at the given path. Deleting a missing blob succeeds.
    async fn delete(&self, path: &str) -> AppResult<()>;

    /// Check whether a blob exists at the given path.
    async fn exists(&self, path: &str) -> AppResult<bool>;
}
