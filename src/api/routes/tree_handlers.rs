//! Category tree handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::api::types::*;
use crate::api::AppState;
use crate::db::repositories::{CategoryRepository, ProjectRepository};
use crate::error::{OptionExt, Result, ServerError};
use crate::tree::{build_filtered_tree, build_full_tree, ProductFilter};

/// GET /tree/all - full trees of every root category
pub async fn all_trees(State(state): State<Arc<AppState>>) -> Result<Json<TreesResponse>> {
    let forest = CategoryRepository::new(&state.db).load_forest().await?;
    if forest.roots().is_empty() {
        return Err(ServerError::NotFound("Categories".to_string()));
    }

    let categories = forest
        .roots()
        .iter()
        .filter_map(|root| build_full_tree(&forest, *root))
        .map(TreeResponse::from)
        .collect();
    Ok(Json(TreesResponse { categories }))
}

/// GET /tree/:category_id
pub async fn category_tree(
    State(state): State<Arc<AppState>>,
    Path(category_id): Path<Uuid>,
) -> Result<Json<TreeResponse>> {
    let forest = CategoryRepository::new(&state.db).load_forest().await?;
    let tree = build_full_tree(&forest, category_id).or_not_found("Category")?;
    Ok(Json(tree.into()))
}

/// GET /tree/project/:project_id
pub async fn project_trees(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<TreesResponse>> {
    let projects = ProjectRepository::new(&state.db);
    projects.get_by_id(project_id).await?.or_not_found("Project")?;
    let roots = projects.get_categories(project_id).await?;

    let forest = CategoryRepository::new(&state.db).load_forest().await?;
    let categories = roots
        .iter()
        .filter_map(|root| build_full_tree(&forest, root.id))
        .map(TreeResponse::from)
        .collect();
    Ok(Json(TreesResponse { categories }))
}

/// POST /tree/project/:project_id/filtered - trees keeping only matching
/// products; categories left empty are dropped
pub async fn project_trees_filtered(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<Uuid>,
    Json(filter): Json<ProductFilter>,
) -> Result<Json<TreesResponse>> {
    let projects = ProjectRepository::new(&state.db);
    projects.get_by_id(project_id).await?.or_not_found("Project")?;
    let roots = projects.get_categories(project_id).await?;

    let forest = CategoryRepository::new(&state.db).load_forest().await?;
    let filter = (!filter.is_empty()).then_some(filter);
    let categories = roots
        .iter()
        .filter_map(|root| build_filtered_tree(&forest, root.id, filter.as_ref()))
        .map(TreeResponse::from)
        .collect();
    Ok(Json(TreesResponse { categories }))
}
