//! Cache partition storage abstraction
//!
//! Provides a trait for partition operations that can be implemented by
//! different backends (in-memory for tests and embedding, on-disk for the CLI).
//! Implementations serialize conflicting writes themselves; callers hold no
//! locks across calls.

use crate::cache::request::{RequestKey, Response};
use crate::error::RecymResult;
use async_trait::async_trait;

/// Abstract partition store
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Open a partition, creating it if absent
    async fn open(&self, name: &str) -> RecymResult<()>;

    /// Check whether a partition exists
    async fn has(&self, name: &str) -> RecymResult<bool>;

    /// List partition names in creation order
    async fn keys(&self) -> RecymResult<Vec<String>>;

    /// Delete a partition and all its entries. Returns false if absent.
    async fn delete(&self, name: &str) -> RecymResult<bool>;

    /// Look up an entry in one partition. A missing partition is a miss.
    async fn get(&self, name: &str, key: &RequestKey) -> RecymResult<Option<Response>>;

    /// Store an entry, creating the partition if needed
    async fn put(&self, name: &str, key: &RequestKey, response: &Response) -> RecymResult<()>;

    /// List the keys stored in a partition
    async fn entries(&self, name: &str) -> RecymResult<Vec<RequestKey>>;

    /// Get the human-readable backend name for display
    fn backend_name(&self) -> &'static str;

    /// Look up an entry across all partitions, oldest partition first
    async fn match_any(&self, key: &RequestKey) -> RecymResult<Option<Response>> {
        for name in self.keys().await? {
            if let Some(response) = self.get(&name, key).await? {
                return Ok(Some(response));
            }
        }
        Ok(None)
    }
}
