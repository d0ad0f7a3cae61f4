//! Product handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use sea_orm::TransactionTrait;
use uuid::Uuid;

use super::utils::require_categories;
use crate::api::types::*;
use crate::api::AppState;
use crate::db::repositories::{
    CategoryRepository, NewProduct, ProductCategoryRepository, ProductPatch, ProductRepository,
    ProjectRepository,
};
use crate::error::{OptionExt, Result, ServerError};
use crate::storage::namespaces;
use crate::tree::{collect_filtered_products, ProductFilter};

/// GET /products
pub async fn list_products(State(state): State<Arc<AppState>>) -> Result<Json<ProductsResponse>> {
    let products = ProductRepository::new(&state.db).get_all().await?;
    if products.is_empty() {
        return Err(ServerError::NotFound("Products".to_string()));
    }
    Ok(Json(ProductsResponse {
        products: products.into_iter().map(ProductResponse::from).collect(),
    }))
}

/// GET /products/:id - the product with its categories
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProductWithCategoriesResponse>> {
    let repo = ProductRepository::new(&state.db);
    let product = repo.get_by_id(id).await?.or_not_found("Product")?;
    let categories = repo.get_categories(id).await?;
    Ok(Json(ProductWithCategoriesResponse {
        product: product.into(),
        categories: categories.into_iter().map(CategoryResponse::from).collect(),
    }))
}

/// POST /products/ids - products for a list of ids; unknown ids are skipped
pub async fn get_products_by_ids(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProductIdsRequest>,
) -> Result<Json<ProductsResponse>> {
    let products = ProductRepository::new(&state.db).get_by_ids(&req.ids).await?;
    Ok(Json(ProductsResponse {
        products: products.into_iter().map(ProductResponse::from).collect(),
    }))
}

/// POST /products
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateProductRequest>,
) -> Result<Json<ProductResponse>> {
    let txn = state.db.begin().await?;
    let category_ids = require_categories(&txn, &req.categories).await?;

    let product = ProductRepository::new(&txn)
        .create(NewProduct {
            name: req.name,
            description: req.description,
            image: req.image,
            country: req.country,
        })
        .await?;
    let assocs = ProductCategoryRepository::new(&txn);
    for category_id in category_ids {
        assocs.create(product.id, category_id).await?;
    }

    txn.commit().await?;
    Ok(Json(product.into()))
}

/// PUT /products/:id
pub async fn update_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(patch): Json<ProductPatch>,
) -> Result<Json<ProductResponse>> {
    let repo = ProductRepository::new(&state.db);
    let product = repo.get_by_id(id).await?.or_not_found("Product")?;
    let product = repo.update(product, patch).await?;
    Ok(Json(product.into()))
}

/// DELETE /products/:id
pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<DetailResponse>> {
    let txn = state.db.begin().await?;
    let repo = ProductRepository::new(&txn);
    repo.get_by_id(id).await?.or_not_found("Product")?;
    repo.delete(id).await?;
    txn.commit().await?;

    if let Err(e) = state
        .files
        .delete_namespace(&namespaces::product_root(id))
        .await
    {
        tracing::warn!("Failed to remove image of product {}: {}", id, e);
    }

    Ok(Json(DetailResponse::new("Product deleted")))
}

/// POST /products/project/:project_id/filtered - every matching product
/// under the project's categories, flattened
pub async fn filtered_project_products(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<Uuid>,
    Json(filter): Json<ProductFilter>,
) -> Result<Json<ProductsResponse>> {
    let projects = ProjectRepository::new(&state.db);
    projects.get_by_id(project_id).await?.or_not_found("Project")?;
    let roots = projects.get_categories(project_id).await?;

    let forest = CategoryRepository::new(&state.db).load_forest().await?;
    let filter = (!filter.is_empty()).then_some(filter);
    let products = roots
        .iter()
        .flat_map(|category| collect_filtered_products(&forest, category.id, filter.as_ref()))
        .map(ProductResponse::from)
        .collect();

    Ok(Json(ProductsResponse { products }))
}
