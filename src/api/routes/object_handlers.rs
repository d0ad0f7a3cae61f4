//! Object handlers, including multipart creation.

use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use sea_orm::{ConnectionTrait, TransactionTrait};
use uuid::Uuid;

use super::utils::{
    multipart_error, require_categories, require_object_parent, require_project, Upload,
};
use crate::api::types::*;
use crate::api::AppState;
use crate::db::entities::object;
use crate::db::repositories::ObjectRepository;
use crate::error::{OptionExt, Result, ServerError};
use crate::storage::namespaces;

async fn with_categories<C: ConnectionTrait>(
    db: &C,
    model: object::Model,
) -> Result<ObjectWithCategoriesResponse> {
    let repo = ObjectRepository::new(db);
    let categories = repo.get_categories(model.id).await?;
    let branches = repo.get_branches(model.id).await?;
    Ok(ObjectWithCategoriesResponse {
        object: model.into(),
        categories: categories.into_iter().map(CategoryResponse::from).collect(),
        branches: branches.into_iter().map(ObjectResponse::from).collect(),
    })
}

/// Validate references and insert the object with its categories
async fn insert_object<C: ConnectionTrait>(
    db: &C,
    req: CreateObjectRequest,
) -> Result<object::Model> {
    let category_ids = require_categories(db, &req.categories).await?;
    require_object_parent(db, None, req.object.parent_id).await?;
    require_project(db, req.object.project_id).await?;

    let repo = ObjectRepository::new(db);
    let object = repo.create(req.object).await?;
    repo.set_categories(object.id, &category_ids).await?;
    Ok(object)
}

/// GET /objects
pub async fn list_objects(State(state): State<Arc<AppState>>) -> Result<Json<ObjectsResponse>> {
    let objects = ObjectRepository::new(&state.db).get_all().await?;
    if objects.is_empty() {
        return Err(ServerError::NotFound("Objects".to_string()));
    }
    Ok(Json(objects.into()))
}

/// GET /objects/:id
pub async fn get_object(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ObjectWithCategoriesResponse>> {
    let object = ObjectRepository::new(&state.db)
        .get_by_id(id)
        .await?
        .or_not_found("Object")?;
    Ok(Json(with_categories(&state.db, object).await?))
}

/// GET /objects/:id/branches
pub async fn list_branches(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ObjectsResponse>> {
    let repo = ObjectRepository::new(&state.db);
    repo.get_by_id(id).await?.or_not_found("Object")?;
    Ok(Json(repo.get_branches(id).await?.into()))
}

/// POST /objects
pub async fn create_object(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateObjectRequest>,
) -> Result<Json<ObjectWithCategoriesResponse>> {
    let txn = state.db.begin().await?;
    let object = insert_object(&txn, req).await?;
    let response = with_categories(&txn, object).await?;
    txn.commit().await?;
    Ok(Json(response))
}

/// POST /objects/form - multipart with a JSON `data` field, an optional
/// `image` file and any number of other files
pub async fn create_object_form(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ObjectWithCategoriesResponse>> {
    let mut data: Option<String> = None;
    let mut image: Option<Upload> = None;
    let mut files: Vec<Upload> = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        match file_name {
            None if field_name == "data" => {
                data = Some(field.text().await.map_err(multipart_error)?);
            }
            None => {
                tracing::debug!("Ignoring form field {}", field_name);
            }
            Some(file_name) => {
                let upload = Upload {
                    file_name,
                    data: field.bytes().await.map_err(multipart_error)?,
                };
                if field_name == "image" {
                    image = Some(upload);
                } else {
                    files.push(upload);
                }
            }
        }
    }

    let data = data.ok_or_else(|| ServerError::Validation("missing data field".to_string()))?;
    let req: CreateObjectRequest = serde_json::from_str(&data)
        .map_err(|e| ServerError::Validation(format!("data field is not valid JSON: {}", e)))?;

    let txn = state.db.begin().await?;
    let mut object = insert_object(&txn, req).await?;
    let repo = ObjectRepository::new(&txn);

    if !files.is_empty() {
        let namespace = namespaces::object_files(object.id);
        let mut stored = object.stored_files();
        for upload in files {
            let saved = state
                .files
                .save_deduplicated(&namespace, &upload.file_name, upload.data)
                .await?;
            if !stored.contains(&saved.name) {
                stored.push(saved.name);
            }
        }
        object = repo.set_file_storage(object, &stored).await?;
    }

    if let Some(upload) = image {
        state
            .files
            .replace_single(&namespaces::object_image(object.id), &upload.file_name, upload.data)
            .await?;
        let url = state.object_image_url(object.id);
        object = repo.set_image(object, Some(url)).await?;
    }

    let response = with_categories(&txn, object).await?;
    txn.commit().await?;
    Ok(Json(response))
}

/// PUT /objects/:id
pub async fn update_object(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateObjectRequest>,
) -> Result<Json<ObjectWithCategoriesResponse>> {
    let txn = state.db.begin().await?;
    let repo = ObjectRepository::new(&txn);
    let object = repo.get_by_id(id).await?.or_not_found("Object")?;

    if let Some(parent_id) = req.patch.parent_id {
        require_object_parent(&txn, Some(id), parent_id).await?;
    }
    if let Some(project_id) = req.patch.project_id {
        require_project(&txn, project_id).await?;
    }
    if let Some(ids) = &req.categories {
        let category_ids = require_categories(&txn, ids).await?;
        repo.set_categories(id, &category_ids).await?;
    }
    let object = repo.update(object, req.patch).await?;

    let response = with_categories(&txn, object).await?;
    txn.commit().await?;
    Ok(Json(response))
}

/// DELETE /objects/:id - removes branches, chains and stored files too
pub async fn delete_object(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<DetailResponse>> {
    let txn = state.db.begin().await?;
    let repo = ObjectRepository::new(&txn);
    repo.get_by_id(id).await?.or_not_found("Object")?;
    let deleted = repo.delete(id).await?;
    txn.commit().await?;

    for object_id in &deleted {
        if let Err(e) = state
            .files
            .delete_namespace(&namespaces::object_root(*object_id))
            .await
        {
            tracing::warn!("Failed to remove files of object {}: {}", object_id, e);
        }
    }

    Ok(Json(DetailResponse::new("Object deleted")))
}
