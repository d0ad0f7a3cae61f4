//! Storage backend trait definition.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Storage error types
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    Io(std::io::Error),
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::NotFound {
            StorageError::NotFound(e.to_string())
        } else {
            StorageError::Io(e)
        }
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Storage backend trait for pluggable storage.
///
/// Keys are flat file names grouped by namespace (e.g. `objects/{id}/files`).
/// A key never contains a path separator.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Get an object by namespace and key
    async fn get(&self, namespace: &str, key: &str) -> StorageResult<Bytes>;

    /// Put an object by namespace and key, replacing any previous content
    async fn put(&self, namespace: &str, key: &str, data: Bytes) -> StorageResult<()>;

    /// Delete an object; deleting a missing key is not an error
    async fn delete(&self, namespace: &str, key: &str) -> StorageResult<()>;

    /// Check if an object exists
    async fn exists(&self, namespace: &str, key: &str) -> StorageResult<bool>;

    /// List all keys in a namespace, sorted
    async fn list(&self, namespace: &str) -> StorageResult<Vec<String>>;

    /// Remove a namespace and everything below it
    async fn delete_namespace(&self, namespace: &str) -> StorageResult<()>;
}

/// Reject keys that could escape their namespace
pub(crate) fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty()
        || key == "."
        || key == ".."
        || key.contains('/')
        || key.contains('\\')
        || key.contains('\0')
    {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// Storage namespaces
pub mod namespaces {
    use uuid::Uuid;

    /// Documents attached to an object
    pub fn object_files(object_id: Uuid) -> String {
        format!("objects/{}/files", object_id)
    }

    /// The single image of an object
    pub fn object_image(object_id: Uuid) -> String {
        format!("objects/{}/image", object_id)
    }

    /// Root of everything stored for an object
    pub fn object_root(object_id: Uuid) -> String {
        format!("objects/{}", object_id)
    }

    /// The single image of a product
    pub fn product_image(product_id: Uuid) -> String {
        format!("products/{}/image", product_id)
    }

    /// Root of everything stored for a product
    pub fn product_root(product_id: Uuid) -> String {
        format!("products/{}", product_id)
    }
}
