//! Object storage collaborator.
//!
//! Attachment bytes live outside the database; this core stores only
//! the returned key. Keys carry a random unique suffix so concurrent
//! uploads never collide. Storage failures are best-effort: they are
//! logged and never roll back the owning database transaction.

use async_trait::async_trait;
use rand::distributions::{Alphanumeric, DistString};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("object not found: {0}")]
    NotFound(String),
}

/// Result of persisting an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub url: String,
}

/// Derives a collision-free storage key from a client-supplied filename.
pub fn unique_key(filename: &str) -> String {
    let suffix = Alphanumeric.sample_string(&mut rand::thread_rng(), 12);
    match filename.rsplit_once('.') {
        Some((stem, ext)) => format!("{stem}-{suffix}.{ext}"),
        None => format!("{filename}-{suffix}"),
    }
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, bytes: Vec<u8>, key: &str) -> Result<StoredObject, StorageError>;
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}

/// Deletes an object, logging failures instead of propagating them.
pub async fn delete_best_effort(store: &dyn ObjectStore, key: &str) {
    if let Err(err) = store.delete(key).await {
        warn!(key, error = %err, "failed to delete stored object");
    }
}

/// In-memory object store used by tests and local development.
#[derive(Default)]
pub struct InMemoryObjectStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn put(&self, bytes: Vec<u8>, key: &str) -> Result<StoredObject, StorageError> {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), bytes);
        Ok(StoredObject {
            key: key.to_string(),
            url: format!("memory://{key}"),
        })
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.objects
            .lock()
            .unwrap()
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }
}

/// Filesystem-backed object store for single-node deployments.
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn put(&self, bytes: Vec<u8>, key: &str) -> Result<StoredObject, StorageError> {
        let path = self.root.join(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        Ok(StoredObject {
            key: key.to_string(),
            url: format!("file://{}", path.display()),
        })
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let path = self.root.join(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }
}

pub type SharedObjectStore = Arc<dyn ObjectStore>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_key_keeps_extension_and_differs() {
        let a = unique_key("invoice.png");
        let b = unique_key("invoice.png");
        assert!(a.starts_with("invoice-"));
        assert!(a.ends_with(".png"));
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn in_memory_put_and_delete() {
        let store = InMemoryObjectStore::new();
        let stored = store.put(b"bytes".to_vec(), "a/b.png").await.unwrap();
        assert_eq!(stored.key, "a/b.png");
        assert!(store.contains("a/b.png"));

        store.delete("a/b.png").await.unwrap();
        assert!(!store.contains("a/b.png"));
        assert!(matches!(
            store.delete("a/b.png").await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn fs_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::new(dir.path());
        store.put(b"data".to_vec(), "img/x.jpg").await.unwrap();
        assert!(dir.path().join("img/x.jpg").exists());
        store.delete("img/x.jpg").await.unwrap();
        assert!(!dir.path().join("img/x.jpg").exists());
    }
}
