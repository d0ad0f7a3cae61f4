//! Category handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use sea_orm::{ConnectionTrait, TransactionTrait};
use uuid::Uuid;

use super::utils::{require_category_parent, require_project};
use crate::api::types::*;
use crate::api::AppState;
use crate::db::entities::category;
use crate::db::repositories::{
    CategoryPatch, CategoryRepository, NewCategory, ObjectCategoryRepository,
    ProjectCategoryRepository,
};
use crate::error::{OptionExt, Result, ServerError};

async fn with_objects<C: ConnectionTrait>(
    db: &C,
    model: category::Model,
) -> Result<CategoryWithObjectsResponse> {
    let objects = ObjectCategoryRepository::new(db)
        .get_by_category(model.id)
        .await?
        .into_iter()
        .map(|(_, object)| ObjectResponse::from(object))
        .collect();
    Ok(CategoryWithObjectsResponse {
        category: model.into(),
        objects,
    })
}

/// GET /categories
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CategoriesWithObjectsResponse>> {
    let models = CategoryRepository::new(&state.db).get_all().await?;
    if models.is_empty() {
        return Err(ServerError::NotFound("Categories".to_string()));
    }

    let mut categories = Vec::with_capacity(models.len());
    for model in models {
        categories.push(with_objects(&state.db, model).await?);
    }
    Ok(Json(CategoriesWithObjectsResponse { categories }))
}

/// GET /categories/:id
pub async fn get_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<CategoryWithObjectsResponse>> {
    let category = CategoryRepository::new(&state.db)
        .get_by_id(id)
        .await?
        .or_not_found("Category")?;
    Ok(Json(with_objects(&state.db, category).await?))
}

/// GET /categories/:id/children
pub async fn list_children(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<CategoriesResponse>> {
    let repo = CategoryRepository::new(&state.db);
    repo.get_by_id(id).await?.or_not_found("Category")?;
    let children = repo.get_children(id).await?;
    Ok(Json(CategoriesResponse {
        categories: children.into_iter().map(CategoryResponse::from).collect(),
    }))
}

/// POST /categories
pub async fn create_category(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<Json<CategoryResponse>> {
    let txn = state.db.begin().await?;
    let repo = CategoryRepository::new(&txn);
    if repo.get_by_name(&req.name).await?.is_some() {
        return Err(ServerError::Conflict(format!(
            "category {} already exists",
            req.name
        )));
    }
    require_category_parent(&txn, None, req.parent_id).await?;
    require_project(&txn, req.project_id).await?;

    let category = repo
        .create(NewCategory {
            name: req.name,
            parent_id: req.parent_id,
        })
        .await?;
    if let Some(project_id) = req.project_id {
        ProjectCategoryRepository::new(&txn)
            .create(project_id, category.id)
            .await?;
    }

    txn.commit().await?;
    Ok(Json(category.into()))
}

/// PUT /categories/:id
pub async fn update_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(patch): Json<CategoryPatch>,
) -> Result<Json<CategoryResponse>> {
    let txn = state.db.begin().await?;
    let repo = CategoryRepository::new(&txn);
    let category = repo.get_by_id(id).await?.or_not_found("Category")?;

    if let Some(parent_id) = patch.parent_id {
        require_category_parent(&txn, Some(id), parent_id).await?;
    }
    let category = repo.update(category, patch).await?;

    txn.commit().await?;
    Ok(Json(category.into()))
}

/// DELETE /categories/:id
pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<DetailResponse>> {
    let txn = state.db.begin().await?;
    let repo = CategoryRepository::new(&txn);
    repo.get_by_id(id).await?.or_not_found("Category")?;
    let deleted = repo.delete(id).await?;
    txn.commit().await?;

    Ok(Json(DetailResponse::new(format!(
        "Category deleted with {} subcategories",
        deleted.len() - 1
    ))))
}
