//! Route table for the JSON API.

mod association_handlers;
mod category_handlers;
mod chain_handlers;
mod file_handlers;
mod object_handlers;
mod product_handlers;
mod project_handlers;
mod tree_handlers;
mod utils;

use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Json, Router,
};

use super::types::HealthResponse;
use super::AppState;
use association_handlers::*;
use category_handlers::*;
use chain_handlers::*;
use file_handlers::*;
use object_handlers::*;
use product_handlers::*;
use project_handlers::*;
use tree_handlers::*;

/// Create the API router
pub fn create_router() -> Router<Arc<AppState>> {
    Router::new()
        // ================================================================
        // Projects
        // ================================================================
        .route("/projects", get(list_projects).post(create_project))
        .route(
            "/projects/:id",
            get(get_project).put(update_project).delete(delete_project),
        )
        .route("/projects/:id/objects", get(list_project_objects))
        // ================================================================
        // Categories
        // ================================================================
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/:id",
            get(get_category).put(update_category).delete(delete_category),
        )
        .route("/categories/:id/children", get(list_children))
        // ================================================================
        // Objects
        // ================================================================
        .route("/objects", get(list_objects).post(create_object))
        .route("/objects/form", post(create_object_form))
        .route(
            "/objects/:id",
            get(get_object).put(update_object).delete(delete_object),
        )
        .route("/objects/:id/branches", get(list_branches))
        .route("/objects/:id/files", post(upload_object_files))
        .route(
            "/objects/:id/files/:name",
            get(download_object_file).delete(delete_object_file),
        )
        .route(
            "/objects/:id/image",
            get(get_object_image).post(upload_object_image),
        )
        // ================================================================
        // Products
        // ================================================================
        .route("/products", get(list_products).post(create_product))
        .route("/products/ids", post(get_products_by_ids))
        .route(
            "/products/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route(
            "/products/:id/image",
            get(get_product_image).post(upload_product_image),
        )
        .route(
            "/products/project/:project_id/filtered",
            post(filtered_project_products),
        )
        // ================================================================
        // Chains
        // ================================================================
        .route("/chains", get(list_chains).post(create_chain))
        .route(
            "/chains/:id",
            get(get_chain).put(update_chain).delete(delete_chain),
        )
        .route("/chains/by-product/:product_id", get(chains_by_product))
        .route(
            "/chains/objects/by_product/:product_id",
            get(objects_by_product),
        )
        // ================================================================
        // Trees
        // ================================================================
        .route("/tree/all", get(all_trees))
        .route("/tree/:category_id", get(category_tree))
        .route("/tree/project/:project_id", get(project_trees))
        .route(
            "/tree/project/:project_id/filtered",
            post(project_trees_filtered),
        )
        // ================================================================
        // Associations
        // ================================================================
        .route("/associations", post(create_association))
        .route(
            "/associations/by-object/:object_id",
            get(associations_by_object),
        )
        .route(
            "/associations/by-category/:category_id",
            get(associations_by_category),
        )
        .route("/associations/:id", delete(delete_association))
        .route("/associations/products", post(create_product_association))
        .route(
            "/associations/products/by-product/:product_id",
            get(product_associations_by_product),
        )
        .route(
            "/associations/products/by-category/:category_id",
            get(product_associations_by_category),
        )
        .route(
            "/associations/products/:id",
            delete(delete_product_association),
        )
        .route("/associations/projects", post(create_project_association))
        .route(
            "/associations/projects/by-project/:project_id",
            get(project_associations_by_project),
        )
        .route(
            "/associations/projects/by-category/:category_id",
            get(project_associations_by_category),
        )
        .route(
            "/associations/projects/:id",
            delete(delete_project_association),
        )
        .route("/health", get(health))
}

/// GET /health
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}
