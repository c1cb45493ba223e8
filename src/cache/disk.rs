//! On-disk partition storage
//!
//! Layout under the store root:
//!
//! ```text
//! <root>/<partition>/.partition.json   marker with creation time
//! <root>/<partition>/<digest>.entry    metadata line, then the raw body
//! ```
//!
//! The digest is the SHA256 of the request key. An entry is one file: a line
//! of compact JSON (key, status, headers) followed by the body bytes. Every
//! write goes to a fresh temp file in the partition and is renamed into
//! place, so readers see either the old entry or the new one, never a mix.
//! Concurrent puts of one key resolve to whichever rename lands last.

use crate::cache::request::{RequestKey, Response};
use crate::cache::storage::CacheStorage;
use crate::error::{RecymError, RecymResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::fs;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

const MARKER: &str = ".partition.json";
const ENTRY_EXT: &str = "entry";

#[derive(Debug, Serialize, Deserialize)]
struct PartitionMarker {
    name: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct EntryMeta {
    key: RequestKey,
    status: u16,
    headers: Vec<(String, String)>,
    stored_at: DateTime<Utc>,
}

/// How [`DiskStorage::persist`] treats an existing target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Persist {
    Replace,
    KeepExisting,
}

/// Partition store backed by a directory tree
#[derive(Debug, Clone)]
pub struct DiskStorage {
    root: PathBuf,
}

impl DiskStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn partition_dir(&self, name: &str) -> RecymResult<PathBuf> {
        if name.is_empty()
            || name.starts_with('.')
            || name.contains(['/', '\\'])
            || name.contains("..")
        {
            return Err(RecymError::PartitionName(name.to_string()));
        }
        Ok(self.root.join(name))
    }

    fn entry_path(dir: &Path, key: &RequestKey) -> PathBuf {
        dir.join(format!("{}.{}", key.digest(), ENTRY_EXT))
    }

    async fn read_marker(path: &Path) -> Option<PartitionMarker> {
        let content = fs::read_to_string(path.join(MARKER)).await.ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Write `content` to a unique temp file next to `target`, then move it
    /// over `target`. Returns false when `mode` is `KeepExisting` and the
    /// target was already there.
    async fn persist(
        partition: &str,
        target: PathBuf,
        content: Vec<u8>,
        mode: Persist,
    ) -> RecymResult<bool> {
        let dir = target
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| RecymError::storage(partition, "entry path has no parent"))?;

        let written = tokio::task::spawn_blocking(move || -> io::Result<bool> {
            let mut tmp = NamedTempFile::new_in(&dir)?;
            tmp.write_all(&content)?;
            tmp.as_file().sync_data()?;

            match mode {
                Persist::Replace => tmp.persist(&target).map(|_| true).map_err(|e| e.error),
                Persist::KeepExisting => match tmp.persist_noclobber(&target) {
                    Ok(_) => Ok(true),
                    Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => Ok(false),
                    Err(e) => Err(e.error),
                },
            }
        })
        .await
        .map_err(|e| RecymError::storage(partition, format!("write task failed: {}", e)))?;

        written.map_err(|e| RecymError::io(format!("writing into partition {}", partition), e))
    }

    /// Split an entry file into its metadata line and body
    fn decode_entry(partition: &str, path: &Path, raw: Vec<u8>) -> RecymResult<(EntryMeta, Vec<u8>)> {
        let split = raw
            .iter()
            .position(|&b| b == b'\n')
            .ok_or_else(|| RecymError::storage(partition, format!("corrupt entry {}", path.display())))?;

        let meta: EntryMeta = serde_json::from_slice(&raw[..split]).map_err(|e| {
            RecymError::storage(partition, format!("corrupt entry {}: {}", path.display(), e))
        })?;

        Ok((meta, raw[split + 1..].to_vec()))
    }
}

#[async_trait]
impl CacheStorage for DiskStorage {
    async fn open(&self, name: &str) -> RecymResult<()> {
        let dir = self.partition_dir(name)?;
        if dir.join(MARKER).exists() {
            return Ok(());
        }

        fs::create_dir_all(&dir)
            .await
            .map_err(|e| RecymError::io(format!("creating partition {}", dir.display()), e))?;

        let marker = PartitionMarker {
            name: name.to_string(),
            created_at: Utc::now(),
        };
        let content = serde_json::to_vec_pretty(&marker)?;

        // Losing the race to another opener is fine: its marker stands
        if Self::persist(name, dir.join(MARKER), content, Persist::KeepExisting).await? {
            debug!("Created partition {} at {}", name, dir.display());
        }
        Ok(())
    }

    async fn has(&self, name: &str) -> RecymResult<bool> {
        Ok(self.partition_dir(name)?.join(MARKER).exists())
    }

    async fn keys(&self) -> RecymResult<Vec<String>> {
        if !self.root.exists() {
            return Ok(vec![]);
        }

        let mut found = vec![];
        let mut entries = fs::read_dir(&self.root)
            .await
            .map_err(|e| RecymError::io("reading store directory", e))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| RecymError::io("reading store entry", e))?
        {
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            match Self::read_marker(&path).await {
                Some(marker) => found.push(marker),
                None => debug!("Skipping unmarked directory {}", path.display()),
            }
        }

        found.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.name.cmp(&b.name))
        });

        Ok(found.into_iter().map(|m| m.name).collect())
    }

    async fn delete(&self, name: &str) -> RecymResult<bool> {
        let dir = self.partition_dir(name)?;
        if !dir.exists() {
            return Ok(false);
        }

        fs::remove_dir_all(&dir)
            .await
            .map_err(|e| RecymError::io(format!("deleting partition {}", dir.display()), e))?;
        Ok(true)
    }

    async fn get(&self, name: &str, key: &RequestKey) -> RecymResult<Option<Response>> {
        let path = Self::entry_path(&self.partition_dir(name)?, key);

        let raw = match fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(RecymError::io(format!("reading entry {}", path.display()), e));
            }
        };
        let (meta, body) = Self::decode_entry(name, &path, raw)?;

        if &meta.key != key {
            warn!("Digest collision in {} for {}", name, key);
            return Ok(None);
        }

        Ok(Some(Response {
            status: meta.status,
            headers: meta.headers,
            body,
        }))
    }

    async fn put(&self, name: &str, key: &RequestKey, response: &Response) -> RecymResult<()> {
        self.open(name).await?;

        let meta = EntryMeta {
            key: key.clone(),
            status: response.status,
            headers: response.headers.clone(),
            stored_at: Utc::now(),
        };
        let mut content = serde_json::to_vec(&meta)?;
        content.push(b'\n');
        content.extend_from_slice(&response.body);

        let path = Self::entry_path(&self.partition_dir(name)?, key);
        Self::persist(name, path, content, Persist::Replace).await?;
        Ok(())
    }

    async fn entries(&self, name: &str) -> RecymResult<Vec<RequestKey>> {
        let dir = self.partition_dir(name)?;
        if !dir.join(MARKER).exists() {
            return Err(RecymError::PartitionNotFound(name.to_string()));
        }

        let mut keys = vec![];
        let mut entries = fs::read_dir(&dir)
            .await
            .map_err(|e| RecymError::io(format!("reading partition {}", name), e))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| RecymError::io("reading partition entry", e))?
        {
            let path = entry.path();
            if !path.extension().is_some_and(|ext| ext == ENTRY_EXT) {
                continue;
            }

            // Only the metadata line is needed
            let Ok(file) = fs::File::open(&path).await else {
                continue;
            };
            let mut line = Vec::new();
            if BufReader::new(file).read_until(b'\n', &mut line).await.is_err() {
                continue;
            }
            match serde_json::from_slice::<EntryMeta>(line.trim_ascii_end()) {
                Ok(meta) => keys.push(meta.key),
                Err(e) => warn!("Skipping corrupt entry {}: {}", path.display(), e),
            }
        }

        keys.sort();
        Ok(keys)
    }

    fn backend_name(&self) -> &'static str {
        "disk"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::request::Method;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn key(path: &str) -> RequestKey {
        RequestKey {
            method: Method::Get,
            url: format!("http://localhost:8080{}", path),
        }
    }

    #[tokio::test]
    async fn empty_store_has_no_partitions() {
        let dir = TempDir::new().unwrap();
        let storage = DiskStorage::new(dir.path().join("missing"));
        assert!(storage.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn put_and_get_roundtrip() {
        let dir = TempDir::new().unwrap();
        let storage = DiskStorage::new(dir.path());
        let response = Response::new(200, vec![0u8, 159, 146, 150]).with_header("content-type", "model/gltf-binary");

        storage.put("recym-static-v1.0.0", &key("/Assets/rack3.glb"), &response).await.unwrap();

        let loaded = storage
            .get("recym-static-v1.0.0", &key("/Assets/rack3.glb"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded, response);
        assert!(storage.has("recym-static-v1.0.0").await.unwrap());
    }

    #[tokio::test]
    async fn put_overwrites() {
        let dir = TempDir::new().unwrap();
        let storage = DiskStorage::new(dir.path());

        storage.put("p", &key("/a"), &Response::new(200, "one")).await.unwrap();
        storage.put("p", &key("/a"), &Response::new(200, "two")).await.unwrap();

        let loaded = storage.get("p", &key("/a")).await.unwrap().unwrap();
        assert_eq!(loaded.text(), "two");
        assert_eq!(storage.entries("p").await.unwrap(), vec![key("/a")]);
    }

    #[tokio::test]
    async fn keys_ignore_stray_directories() {
        let dir = TempDir::new().unwrap();
        let storage = DiskStorage::new(dir.path());
        std::fs::create_dir_all(dir.path().join("not-a-partition")).unwrap();
        storage.open("recym-dynamic-v1.0.0").await.unwrap();

        assert_eq!(storage.keys().await.unwrap(), vec!["recym-dynamic-v1.0.0"]);
    }

    #[tokio::test]
    async fn delete_removes_partition() {
        let dir = TempDir::new().unwrap();
        let storage = DiskStorage::new(dir.path());
        storage.put("old", &key("/a"), &Response::new(200, "x")).await.unwrap();

        assert!(storage.delete("old").await.unwrap());
        assert!(!storage.delete("old").await.unwrap());
        assert!(storage.get("old", &key("/a")).await.unwrap().is_none());
        assert!(storage.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejects_path_traversal() {
        let dir = TempDir::new().unwrap();
        let storage = DiskStorage::new(dir.path());
        assert!(storage.open("../escape").await.is_err());
        assert!(storage.open(".hidden").await.is_err());
        assert!(storage.open("a/b").await.is_err());
    }

    #[tokio::test]
    async fn reopen_keeps_entries() {
        let dir = TempDir::new().unwrap();
        let storage = DiskStorage::new(dir.path());
        storage.put("p", &key("/a"), &Response::new(200, "x")).await.unwrap();
        storage.open("p").await.unwrap();

        let reopened = DiskStorage::new(dir.path());
        assert!(reopened.get("p", &key("/a")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn corrupt_entry_is_storage_error() {
        let dir = TempDir::new().unwrap();
        let storage = DiskStorage::new(dir.path());
        storage.open("p").await.unwrap();
        let path = DiskStorage::entry_path(&dir.path().join("p"), &key("/a"));
        std::fs::write(&path, b"no metadata line").unwrap();

        let err = storage.get("p", &key("/a")).await.unwrap_err();
        assert!(matches!(err, RecymError::Storage { .. }));
        assert!(storage.entries("p").await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_puts_to_one_key_stay_consistent() {
        let dir = TempDir::new().unwrap();
        let storage = Arc::new(DiskStorage::new(dir.path()));

        for round in 0..20 {
            let partition = format!("p{}", round);
            let handles: Vec<_> = (0..8u16)
                .map(|i| {
                    let storage = Arc::clone(&storage);
                    let partition = partition.clone();
                    tokio::spawn(async move {
                        let response = Response::new(200 + i, format!("body-{}", i));
                        storage.put(&partition, &key("/shared"), &response).await
                    })
                })
                .collect();

            for handle in handles {
                handle.await.unwrap().unwrap();
            }

            let stored = storage.get(&partition, &key("/shared")).await.unwrap().unwrap();
            assert_eq!(stored.text(), format!("body-{}", stored.status - 200));
            assert_eq!(storage.entries(&partition).await.unwrap(), vec![key("/shared")]);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_puts_to_fresh_partition_are_all_stored() {
        let dir = TempDir::new().unwrap();
        let storage = Arc::new(DiskStorage::new(dir.path()));

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let storage = Arc::clone(&storage);
                tokio::spawn(async move {
                    let path = format!("/api/item{}", i);
                    storage
                        .put("recym-dynamic-v1.0.0", &key(&path), &Response::new(200, path.clone()))
                        .await
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(storage.keys().await.unwrap(), vec!["recym-dynamic-v1.0.0"]);
        assert_eq!(storage.entries("recym-dynamic-v1.0.0").await.unwrap().len(), 16);
        for i in 0..16 {
            let path = format!("/api/item{}", i);
            let stored = storage
                .get("recym-dynamic-v1.0.0", &key(&path))
                .await
                .unwrap()
                .unwrap();
            assert_eq!(stored.text(), path);
        }
    }
}
