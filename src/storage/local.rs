use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::storage::{validate_key, BlobStore, StorageError};

/// Blob store backed by a directory on the local filesystem
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        Ok(self.root.join(validate_key(key)?))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        tokio::fs::create_dir_all(&self.root).await?;

        // Readers never see a partial file. Same-key writers each get their
        // own temp file; the last rename wins with identical bytes.
        let tmp = self.root.join(format!(".{}.{}.tmp", key, uuid::Uuid::new_v4().simple()));
        if let Err(e) = write_then_rename(&tmp, &path, bytes).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        debug!(key, size = bytes.len(), "stored blob");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StorageError::NotFound(key.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!(key, "deleted blob");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

async fn write_then_rename(tmp: &Path, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    tokio::fs::write(tmp, bytes).await?;
    tokio::fs::rename(tmp, path).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> LocalBlobStore {
        let dir = std::env::temp_dir().join(format!("portfolio-blobs-{}", uuid::Uuid::new_v4().simple()));
        LocalBlobStore::new(dir)
    }

    #[tokio::test]
    async fn put_get_delete() {
        let store = temp_store();
        store.put("abc.png", b"image-bytes").await.unwrap();
        assert_eq!(store.get("abc.png").await.unwrap(), b"image-bytes");

        store.delete("abc.png").await.unwrap();
        assert!(matches!(store.get("abc.png").await, Err(StorageError::NotFound(_))));

        // second delete is a no-op
        store.delete("abc.png").await.unwrap();
        let _ = std::fs::remove_dir_all(store.root());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_puts_of_one_key_all_succeed() {
        let store = temp_store();
        let bytes = vec![7u8; 512 * 1024];

        for _ in 0..10 {
            let puts: Vec<_> = (0..8)
                .map(|_| {
                    let store = store.clone();
                    let bytes = bytes.clone();
                    tokio::spawn(async move { store.put("abcdef0123456789.png", &bytes).await })
                })
                .collect();
            for put in puts {
                put.await.unwrap().unwrap();
            }
        }

        assert_eq!(store.get("abcdef0123456789.png").await.unwrap(), bytes);
        let leftovers: Vec<_> = std::fs::read_dir(store.root())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
        let _ = std::fs::remove_dir_all(store.root());
    }

    #[tokio::test]
    async fn rejects_keys_outside_root() {
        let store = temp_store();
        let err = store.put("../escape.png", b"x").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey(_)));
    }
}
