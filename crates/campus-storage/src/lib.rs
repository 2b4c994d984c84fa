//! # campus-storage
//!
//! Blob storage for attachments. The local filesystem provider is a cache
//! of uploaded bytes, never the system of record; attachment metadata in
//! the database is authoritative.

pub mod manager;
pub mod providers;

pub use manager::StorageManager;
pub use providers::{LocalStorageProvider, MemoryStorageProvider};
