//! File storage for uploaded object documents and images.
//!
//! `StorageBackend` abstracts where bytes live; `LocalStorage` keeps them on
//! disk and `FileStore` adds checksum-based de-duplication on top.

mod backend;
mod files;
mod local;

pub use backend::{namespaces, StorageError};
pub use files::{guess_content_type, FileStore};
pub use local::LocalStorage;
