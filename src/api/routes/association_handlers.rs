//! Association handlers for the object, product and project category links.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::api::types::*;
use crate::api::AppState;
use crate::db::repositories::{
    CategoryRepository, ObjectCategoryRepository, ObjectRepository, ProductCategoryRepository,
    ProductRepository, ProjectCategoryRepository, ProjectRepository,
};
use crate::error::{OptionExt, Result};

// ============================================================================
// Object Associations
// ============================================================================

/// POST /associations
pub async fn create_association(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateAssociationRequest>,
) -> Result<Json<AssociationResponse>> {
    ObjectRepository::new(&state.db)
        .get_by_id(req.object_id)
        .await?
        .or_not_found("Object")?;
    CategoryRepository::new(&state.db)
        .get_by_id(req.category_id)
        .await?
        .or_not_found("Category")?;

    let assoc = ObjectCategoryRepository::new(&state.db)
        .create(req.object_id, req.category_id)
        .await?;
    tracing::info!("Linked object {} to category {}", assoc.object_id, assoc.category_id);
    Ok(Json(assoc.into()))
}

/// GET /associations/by-object/:object_id
pub async fn associations_by_object(
    State(state): State<Arc<AppState>>,
    Path(object_id): Path<Uuid>,
) -> Result<Json<AssociationsByObjectResponse>> {
    let object = ObjectRepository::new(&state.db)
        .get_by_id(object_id)
        .await?
        .or_not_found("Object")?;
    let categories = ObjectCategoryRepository::new(&state.db)
        .get_by_object(object_id)
        .await?
        .into_iter()
        .map(|(_, category)| CategoryResponse::from(category))
        .collect();
    Ok(Json(AssociationsByObjectResponse {
        object: object.into(),
        categories,
    }))
}

/// GET /associations/by-category/:category_id
pub async fn associations_by_category(
    State(state): State<Arc<AppState>>,
    Path(category_id): Path<Uuid>,
) -> Result<Json<AssociationsByCategoryResponse>> {
    let category = CategoryRepository::new(&state.db)
        .get_by_id(category_id)
        .await?
        .or_not_found("Category")?;
    let objects = ObjectCategoryRepository::new(&state.db)
        .get_by_category(category_id)
        .await?
        .into_iter()
        .map(|(_, object)| ObjectResponse::from(object))
        .collect();
    Ok(Json(AssociationsByCategoryResponse {
        category: category.into(),
        objects,
    }))
}

/// DELETE /associations/:id
pub async fn delete_association(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<DetailResponse>> {
    let repo = ObjectCategoryRepository::new(&state.db);
    repo.get_by_id(id).await?.or_not_found("Association")?;
    repo.delete(id).await?;
    Ok(Json(DetailResponse::new("Association deleted")))
}

// ============================================================================
// Product Associations
// ============================================================================

/// POST /associations/products
pub async fn create_product_association(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateProductAssociationRequest>,
) -> Result<Json<ProductAssociationResponse>> {
    ProductRepository::new(&state.db)
        .get_by_id(req.product_id)
        .await?
        .or_not_found("Product")?;
    CategoryRepository::new(&state.db)
        .get_by_id(req.category_id)
        .await?
        .or_not_found("Category")?;

    let assoc = ProductCategoryRepository::new(&state.db)
        .create(req.product_id, req.category_id)
        .await?;
    tracing::info!("Linked product {} to category {}", assoc.product_id, assoc.category_id);
    Ok(Json(assoc.into()))
}

/// GET /associations/products/by-product/:product_id
pub async fn product_associations_by_product(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<Uuid>,
) -> Result<Json<ProductAssociationsByProductResponse>> {
    let product = ProductRepository::new(&state.db)
        .get_by_id(product_id)
        .await?
        .or_not_found("Product")?;
    let categories = ProductCategoryRepository::new(&state.db)
        .get_by_product(product_id)
        .await?
        .into_iter()
        .map(|(_, category)| CategoryResponse::from(category))
        .collect();
    Ok(Json(ProductAssociationsByProductResponse {
        product: product.into(),
        categories,
    }))
}

/// GET /associations/products/by-category/:category_id
pub async fn product_associations_by_category(
    State(state): State<Arc<AppState>>,
    Path(category_id): Path<Uuid>,
) -> Result<Json<ProductAssociationsByCategoryResponse>> {
    let category = CategoryRepository::new(&state.db)
        .get_by_id(category_id)
        .await?
        .or_not_found("Category")?;
    let products = ProductCategoryRepository::new(&state.db)
        .get_by_category(category_id)
        .await?
        .into_iter()
        .map(|(_, product)| ProductResponse::from(product))
        .collect();
    Ok(Json(ProductAssociationsByCategoryResponse {
        category: category.into(),
        products,
    }))
}

/// DELETE /associations/products/:id
pub async fn delete_product_association(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<DetailResponse>> {
    let repo = ProductCategoryRepository::new(&state.db);
    repo.get_by_id(id).await?.or_not_found("Association")?;
    repo.delete(id).await?;
    Ok(Json(DetailResponse::new("Association deleted")))
}

// ============================================================================
// Project Associations
// ============================================================================

/// POST /associations/projects
pub async fn create_project_association(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateProjectAssociationRequest>,
) -> Result<Json<ProjectAssociationResponse>> {
    ProjectRepository::new(&state.db)
        .get_by_id(req.project_id)
        .await?
        .or_not_found("Project")?;
    CategoryRepository::new(&state.db)
        .get_by_id(req.category_id)
        .await?
        .or_not_found("Category")?;

    let assoc = ProjectCategoryRepository::new(&state.db)
        .create(req.project_id, req.category_id)
        .await?;
    tracing::info!("Linked project {} to category {}", assoc.project_id, assoc.category_id);
    Ok(Json(assoc.into()))
}

/// GET /associations/projects/by-project/:project_id
pub async fn project_associations_by_project(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<ProjectAssociationsByProjectResponse>> {
    let project = ProjectRepository::new(&state.db)
        .get_by_id(project_id)
        .await?
        .or_not_found("Project")?;
    let categories = ProjectCategoryRepository::new(&state.db)
        .get_by_project(project_id)
        .await?
        .into_iter()
        .map(|(_, category)| CategoryResponse::from(category))
        .collect();
    Ok(Json(ProjectAssociationsByProjectResponse {
        project: project.into(),
        categories,
    }))
}

/// GET /associations/projects/by-category/:category_id
pub async fn project_associations_by_category(
    State(state): State<Arc<AppState>>,
    Path(category_id): Path<Uuid>,
) -> Result<Json<ProjectAssociationsByCategoryResponse>> {
    let category = CategoryRepository::new(&state.db)
        .get_by_id(category_id)
        .await?
        .or_not_found("Category")?;
    let projects = ProjectCategoryRepository::new(&state.db)
        .get_by_category(category_id)
        .await?
        .into_iter()
        .map(|(_, project)| ProjectResponse::from(project))
        .collect();
    Ok(Json(ProjectAssociationsByCategoryResponse {
        category: category.into(),
        projects,
    }))
}

/// DELETE /associations/projects/:id
pub async fn delete_project_association(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<DetailResponse>> {
    let repo = ProjectCategoryRepository::new(&state.db);
    repo.get_by_id(id).await?.or_not_found("Association")?;
    repo.delete(id).await?;
    Ok(Json(DetailResponse::new("Association deleted")))
}
