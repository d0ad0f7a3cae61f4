//! HTTP boundary: shared state, router and handlers.

mod routes;
pub mod types;


use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::storage::{FileStore, LocalStorage};

pub use routes::create_router;

/// State shared by every handler
pub struct AppState {
    pub db: DatabaseConnection,
    pub files: FileStore,
    pub config: AppConfig,
}

impl AppState {
    /// Build state with files kept under the configured storage path
    pub fn new(config: AppConfig, db: DatabaseConnection) -> Self {
        let backend = LocalStorage::new(config.storage_path.join("files"));
        Self {
            db,
            files: FileStore::new(Arc::new(backend)),
            config,
        }
    }

    /// Public URL of an object's image
    pub fn object_image_url(&self, object_id: uuid::Uuid) -> String {
        format!("{}/objects/{}/image", self.config.api_url, object_id)
    }

    /// Public URL of a product's image
    pub fn product_image_url(&self, product_id: uuid::Uuid) -> String {
        format!("{}/products/{}/image", self.config.api_url, product_id)
    }
}
