//! De-duplicating file store used for object documents and entity images.

use bytes::Bytes;
use sha2::{Digest, Sha256};
use std::sync::Arc;

use super::backend::{StorageBackend, StorageError, StorageResult};

/// Upper bound on `name(n).ext` probes for one upload
const MAX_NAME_SUFFIX: usize = 10_000;

/// Outcome of a de-duplicated save
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    /// Name the content is stored under
    pub name: String,
    /// True when byte-identical content already existed under `name`
    pub reused: bool,
}

/// File store layered over a storage backend
#[derive(Clone)]
pub struct FileStore {
    backend: Arc<dyn StorageBackend>,
}

impl FileStore {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// Save `data` under `file_name`, skipping byte-identical duplicates.
    ///
    /// Probes `name.ext`, `name(1).ext`, `name(2).ext`, ... The first probe
    /// that is free gets written; a probe holding the same checksum is
    /// returned as-is without writing.
    pub async fn save_deduplicated(
        &self,
        namespace: &str,
        file_name: &str,
        data: Bytes,
    ) -> StorageResult<SavedFile> {
        let base_name = sanitize_file_name(file_name);
        let digest = checksum(&data);

        for attempt in 0..MAX_NAME_SUFFIX {
            let candidate = numbered_name(&base_name, attempt);

            if !self.backend.exists(namespace, &candidate).await? {
                self.backend.put(namespace, &candidate, data).await?;
                tracing::debug!("Stored {}/{}", namespace, candidate);
                return Ok(SavedFile { name: candidate, reused: false });
            }

            let existing = self.backend.get(namespace, &candidate).await?;
            if checksum(&existing) == digest {
                tracing::debug!("Skipped duplicate upload {}/{}", namespace, candidate);
                return Ok(SavedFile { name: candidate, reused: true });
            }
        }

        Err(StorageError::InvalidKey(format!(
            "too many stored copies of {}",
            base_name
        )))
    }

    /// Replace whatever is stored in `namespace` with a single file
    pub async fn replace_single(
        &self,
        namespace: &str,
        file_name: &str,
        data: Bytes,
    ) -> StorageResult<String> {
        let name = sanitize_file_name(file_name);
        self.backend.delete_namespace(namespace).await?;
        self.backend.put(namespace, &name, data).await?;
        Ok(name)
    }

    /// Fetch the single file stored in `namespace`
    pub async fn get_single(&self, namespace: &str) -> StorageResult<(String, Bytes)> {
        let name = self
            .backend
            .list(namespace)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StorageError::NotFound(namespace.to_string()))?;
        let data = self.backend.get(namespace, &name).await?;
        Ok((name, data))
    }

    pub async fn get(&self, namespace: &str, key: &str) -> StorageResult<Bytes> {
        self.backend.get(namespace, key).await
    }

    pub async fn delete(&self, namespace: &str, key: &str) -> StorageResult<()> {
        self.backend.delete(namespace, key).await
    }

    pub async fn delete_namespace(&self, namespace: &str) -> StorageResult<()> {
        self.backend.delete_namespace(namespace).await
    }
}

fn checksum(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Strip any client-supplied directory part from an upload name
pub fn sanitize_file_name(raw: &str) -> String {
    let name = raw
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default()
        .trim()
        .replace('\0', "");
    if name.is_empty() || name == "." || name == ".." {
        "file".to_string()
    } else {
        name
    }
}

/// `report.pdf` -> `report(2).pdf`; attempt 0 keeps the name unchanged
fn numbered_name(name: &str, attempt: usize) -> String {
    if attempt == 0 {
        return name.to_string();
    }
    match name.rfind('.') {
        Some(dot) if dot > 0 => format!("{}({}){}", &name[..dot], attempt, &name[dot..]),
        _ => format!("{}({})", name, attempt),
    }
}

/// Guess content type from file extension
pub fn guess_content_type(name: &str) -> &'static str {
    let ext = name.rsplit('.').next().map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("pdf") => "application/pdf",
        Some("json") => "application/json",
        Some("txt") => "text/plain; charset=utf-8",
        Some("csv") => "text/csv; charset=utf-8",
        Some("doc") => "application/msword",
        Some("docx") => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        Some("xls") => "application/vnd.ms-excel",
        Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::LocalStorage;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> FileStore {
        FileStore::new(Arc::new(LocalStorage::new(dir.path().to_path_buf())))
    }

    #[test]
    fn test_numbered_name() {
        assert_eq!(numbered_name("report.pdf", 0), "report.pdf");
        assert_eq!(numbered_name("report.pdf", 1), "report(1).pdf");
        assert_eq!(numbered_name("archive.tar.gz", 2), "archive.tar(2).gz");
        assert_eq!(numbered_name("README", 1), "README(1)");
        assert_eq!(numbered_name(".env", 1), ".env(1)");
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("plan.png"), "plan.png");
        assert_eq!(sanitize_file_name("C:\\Users\\me\\plan.png"), "plan.png");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("dir/"), "file");
        assert_eq!(sanitize_file_name(".."), "file");
    }

    #[tokio::test]
    async fn test_identical_upload_is_reused() {
        let dir = TempDir::new().unwrap();
        let files = store(&dir);

        let first = files
            .save_deduplicated("objects/a/files", "plan.pdf", Bytes::from("same bytes"))
            .await
            .unwrap();
        let second = files
            .save_deduplicated("objects/a/files", "plan.pdf", Bytes::from("same bytes"))
            .await
            .unwrap();

        assert_eq!(first, SavedFile { name: "plan.pdf".into(), reused: false });
        assert_eq!(second, SavedFile { name: "plan.pdf".into(), reused: true });
    }

    #[tokio::test]
    async fn test_different_content_gets_suffix() {
        let dir = TempDir::new().unwrap();
        let files = store(&dir);

        files
            .save_deduplicated("objects/a/files", "plan.pdf", Bytes::from("v1"))
            .await
            .unwrap();
        let second = files
            .save_deduplicated("objects/a/files", "plan.pdf", Bytes::from("v2"))
            .await
            .unwrap();
        assert_eq!(second.name, "plan(1).pdf");
        assert!(!second.reused);

        // Re-uploading v2 finds the suffixed copy
        let third = files
            .save_deduplicated("objects/a/files", "plan.pdf", Bytes::from("v2"))
            .await
            .unwrap();
        assert_eq!(third, SavedFile { name: "plan(1).pdf".into(), reused: true });

        let stored = files.get("objects/a/files", "plan(1).pdf").await.unwrap();
        assert_eq!(stored, Bytes::from("v2"));
    }

    #[tokio::test]
    async fn test_replace_single() {
        let dir = TempDir::new().unwrap();
        let files = store(&dir);

        files
            .replace_single("products/p/image", "old.png", Bytes::from("old"))
            .await
            .unwrap();
        files
            .replace_single("products/p/image", "new.jpg", Bytes::from("new"))
            .await
            .unwrap();

        let (name, data) = files.get_single("products/p/image").await.unwrap();
        assert_eq!(name, "new.jpg");
        assert_eq!(data, Bytes::from("new"));

        files.delete_namespace("products/p").await.unwrap();
        assert!(matches!(
            files.get_single("products/p/image").await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[test]
    fn test_guess_content_type() {
        assert_eq!(guess_content_type("a.PNG"), "image/png");
        assert_eq!(guess_content_type("a.pdf"), "application/pdf");
        assert_eq!(guess_content_type("blob"), "application/octet-stream");
    }
}
