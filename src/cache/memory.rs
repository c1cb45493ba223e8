//! In-memory partition storage

use crate::cache::request::{RequestKey, Response};
use crate::cache::storage::CacheStorage;
use crate::error::{RecymError, RecymResult};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

type Partition = BTreeMap<RequestKey, Response>;

/// Partition store held entirely in memory. Partitions keep creation order.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    partitions: RwLock<Vec<(String, Partition)>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStorage for MemoryStorage {
    async fn open(&self, name: &str) -> RecymResult<()> {
        let mut partitions = self.partitions.write().await;
        if !partitions.iter().any(|(n, _)| n == name) {
            partitions.push((name.to_string(), Partition::new()));
        }
        Ok(())
    }

    async fn has(&self, name: &str) -> RecymResult<bool> {
        Ok(self.partitions.read().await.iter().any(|(n, _)| n == name))
    }

    async fn keys(&self) -> RecymResult<Vec<String>> {
        Ok(self
            .partitions
            .read()
            .await
            .iter()
            .map(|(n, _)| n.clone())
            .collect())
    }

    async fn delete(&self, name: &str) -> RecymResult<bool> {
        let mut partitions = self.partitions.write().await;
        let before = partitions.len();
        partitions.retain(|(n, _)| n != name);
        Ok(partitions.len() != before)
    }

    async fn get(&self, name: &str, key: &RequestKey) -> RecymResult<Option<Response>> {
        Ok(self
            .partitions
            .read()
            .await
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, p)| p.get(key).cloned()))
    }

    async fn put(&self, name: &str, key: &RequestKey, response: &Response) -> RecymResult<()> {
        let mut partitions = self.partitions.write().await;
        match partitions.iter_mut().find(|(n, _)| n == name) {
            Some((_, partition)) => {
                partition.insert(key.clone(), response.clone());
            }
            None => {
                let mut partition = Partition::new();
                partition.insert(key.clone(), response.clone());
                partitions.push((name.to_string(), partition));
            }
        }
        Ok(())
    }

    async fn entries(&self, name: &str) -> RecymResult<Vec<RequestKey>> {
        self.partitions
            .read()
            .await
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, p)| p.keys().cloned().collect())
            .ok_or_else(|| RecymError::PartitionNotFound(name.to_string()))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::request::Method;

    fn key(path: &str) -> RequestKey {
        RequestKey {
            method: Method::Get,
            url: format!("http://localhost:8080{}", path),
        }
    }

    #[tokio::test]
    async fn open_is_idempotent() {
        let storage = MemoryStorage::new();
        storage.open("a").await.unwrap();
        storage.open("a").await.unwrap();
        assert_eq!(storage.keys().await.unwrap(), vec!["a"]);
    }

    #[tokio::test]
    async fn keys_keep_creation_order() {
        let storage = MemoryStorage::new();
        storage.open("b").await.unwrap();
        storage.open("a").await.unwrap();
        storage.put("c", &key("/"), &Response::new(200, "x")).await.unwrap();
        assert_eq!(storage.keys().await.unwrap(), vec!["b", "a", "c"]);
    }

    #[tokio::test]
    async fn put_get_delete() {
        let storage = MemoryStorage::new();
        let response = Response::new(200, "hello");
        storage.put("p", &key("/a"), &response).await.unwrap();

        assert_eq!(storage.get("p", &key("/a")).await.unwrap(), Some(response));
        assert_eq!(storage.get("p", &key("/b")).await.unwrap(), None);
        assert_eq!(storage.get("missing", &key("/a")).await.unwrap(), None);

        assert!(storage.delete("p").await.unwrap());
        assert!(!storage.delete("p").await.unwrap());
        assert!(!storage.has("p").await.unwrap());
    }

    #[tokio::test]
    async fn match_any_searches_oldest_first() {
        let storage = MemoryStorage::new();
        storage.put("old", &key("/a"), &Response::new(200, "old")).await.unwrap();
        storage.put("new", &key("/a"), &Response::new(200, "new")).await.unwrap();
        storage.put("new", &key("/b"), &Response::new(200, "b")).await.unwrap();

        let hit = storage.match_any(&key("/a")).await.unwrap().unwrap();
        assert_eq!(hit.text(), "old");
        let hit = storage.match_any(&key("/b")).await.unwrap().unwrap();
        assert_eq!(hit.text(), "b");
        assert!(storage.match_any(&key("/c")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn entries_of_missing_partition() {
        let storage = MemoryStorage::new();
        let err = storage.entries("nope").await.unwrap_err();
        assert!(matches!(err, RecymError::PartitionNotFound(_)));
    }
}
