//! Project handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use sea_orm::{ConnectionTrait, TransactionTrait};
use uuid::Uuid;

use super::utils::require_categories;
use crate::api::types::*;
use crate::api::AppState;
use crate::db::entities::project;
use crate::db::repositories::{NewProject, ObjectRepository, ProjectRepository};
use crate::error::{OptionExt, Result};

async fn with_categories<C: ConnectionTrait>(
    db: &C,
    model: project::Model,
) -> Result<ProjectWithCategoriesResponse> {
    let categories = ProjectRepository::new(db).get_categories(model.id).await?;
    Ok(ProjectWithCategoriesResponse {
        project: model.into(),
        categories: categories.into_iter().map(CategoryResponse::from).collect(),
    })
}

/// GET /projects
pub async fn list_projects(State(state): State<Arc<AppState>>) -> Result<Json<ProjectsResponse>> {
    let projects = ProjectRepository::new(&state.db).get_all().await?;
    Ok(Json(ProjectsResponse {
        projects: projects.into_iter().map(ProjectResponse::from).collect(),
    }))
}

/// GET /projects/:id
pub async fn get_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProjectWithCategoriesResponse>> {
    let project = ProjectRepository::new(&state.db)
        .get_by_id(id)
        .await?
        .or_not_found("Project")?;
    Ok(Json(with_categories(&state.db, project).await?))
}

/// POST /projects
pub async fn create_project(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateProjectRequest>,
) -> Result<Json<ProjectWithCategoriesResponse>> {
    let txn = state.db.begin().await?;
    let category_ids = require_categories(&txn, &req.category_ids).await?;

    let repo = ProjectRepository::new(&txn);
    let project = repo
        .create(NewProject {
            name: req.name,
            description: req.description,
        })
        .await?;
    repo.set_categories(project.id, &category_ids).await?;

    let response = with_categories(&txn, project).await?;
    txn.commit().await?;
    Ok(Json(response))
}

/// PUT /projects/:id
pub async fn update_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProjectRequest>,
) -> Result<Json<ProjectWithCategoriesResponse>> {
    let txn = state.db.begin().await?;
    let repo = ProjectRepository::new(&txn);
    let project = repo.get_by_id(id).await?.or_not_found("Project")?;

    if let Some(ids) = &req.category_ids {
        let category_ids = require_categories(&txn, ids).await?;
        repo.set_categories(id, &category_ids).await?;
    }
    let project = repo.update(project, req.patch).await?;

    let response = with_categories(&txn, project).await?;
    txn.commit().await?;
    Ok(Json(response))
}

/// DELETE /projects/:id
pub async fn delete_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    let txn = state.db.begin().await?;
    let repo = ProjectRepository::new(&txn);
    repo.get_by_id(id).await?.or_not_found("Project")?;
    repo.delete(id).await?;
    txn.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /projects/:id/objects
pub async fn list_project_objects(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ObjectsResponse>> {
    ProjectRepository::new(&state.db)
        .get_by_id(id)
        .await?
        .or_not_found("Project")?;
    let objects = ObjectRepository::new(&state.db).get_by_project(id).await?;
    Ok(Json(objects.into()))
}
