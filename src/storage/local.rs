//! Local filesystem storage backend.

use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;

use super::backend::{validate_key, StorageBackend, StorageError, StorageResult};

/// Local filesystem storage backend.
///
/// Stores objects in a directory structure:
/// ```text
/// {base_path}/
///   {namespace}/     # e.g. objects/{id}/files
///     {key}          # original (de-duplicated) file name
/// ```
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    /// Create a new local storage backend
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn namespace_path(&self, namespace: &str) -> PathBuf {
        self.base_path.join(namespace)
    }

    /// Get the full path for a key
    fn key_path(&self, namespace: &str, key: &str) -> StorageResult<PathBuf> {
        validate_key(key)?;
        Ok(self.namespace_path(namespace).join(key))
    }

    /// Ensure parent directory exists
    async fn ensure_parent(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for LocalStorage {
    async fn get(&self, namespace: &str, key: &str) -> StorageResult<Bytes> {
        let path = self.key_path(namespace, key)?;
        let data = fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::NotFound(format!("{}/{}", namespace, key))
            } else {
                StorageError::Io(e)
            }
        })?;
        Ok(Bytes::from(data))
    }

    async fn put(&self, namespace: &str, key: &str, data: Bytes) -> StorageResult<()> {
        let path = self.key_path(namespace, key)?;
        self.ensure_parent(&path).await?;
        fs::write(&path, &data).await?;
        Ok(())
    }

    async fn delete(&self, namespace: &str, key: &str) -> StorageResult<()> {
        let path = self.key_path(namespace, key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()), // Already deleted
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    async fn exists(&self, namespace: &str, key: &str) -> StorageResult<bool> {
        let path = self.key_path(namespace, key)?;
        Ok(fs::try_exists(&path).await?)
    }

    async fn list(&self, namespace: &str) -> StorageResult<Vec<String>> {
        let ns_path = self.namespace_path(namespace);
        let mut entries = match fs::read_dir(&ns_path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::Io(e)),
        };

        let mut keys = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                keys.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        keys.sort();

        Ok(keys)
    }

    async fn delete_namespace(&self, namespace: &str) -> StorageResult<()> {
        match fs::remove_dir_all(self.namespace_path(namespace)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_local_storage_basic() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().to_path_buf());

        // Put and get
        let data = Bytes::from("hello world");
        storage.put("objects/1/files", "notes.txt", data.clone()).await.unwrap();

        let retrieved = storage.get("objects/1/files", "notes.txt").await.unwrap();
        assert_eq!(retrieved, data);

        // Exists
        assert!(storage.exists("objects/1/files", "notes.txt").await.unwrap());
        assert!(!storage.exists("objects/1/files", "missing.txt").await.unwrap());

        // Delete twice is fine
        storage.delete("objects/1/files", "notes.txt").await.unwrap();
        storage.delete("objects/1/files", "notes.txt").await.unwrap();
        assert!(!storage.exists("objects/1/files", "notes.txt").await.unwrap());

        let err = storage.get("objects/1/files", "notes.txt").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_local_storage_list_and_delete_namespace() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().to_path_buf());

        assert!(storage.list("objects/2/files").await.unwrap().is_empty());

        storage.put("objects/2/files", "b.pdf", Bytes::from("2")).await.unwrap();
        storage.put("objects/2/files", "a.pdf", Bytes::from("1")).await.unwrap();
        storage.put("objects/2/image", "logo.png", Bytes::from("3")).await.unwrap();

        let keys = storage.list("objects/2/files").await.unwrap();
        assert_eq!(keys, vec!["a.pdf", "b.pdf"]);

        storage.delete_namespace("objects/2").await.unwrap();
        assert!(storage.list("objects/2/files").await.unwrap().is_empty());
        assert!(storage.list("objects/2/image").await.unwrap().is_empty());

        // Missing namespace is not an error
        storage.delete_namespace("objects/2").await.unwrap();
    }

    #[tokio::test]
    async fn test_local_storage_rejects_traversal() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().to_path_buf());

        let result = storage.put("objects/3/files", "../escape.txt", Bytes::from("x")).await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }
}
