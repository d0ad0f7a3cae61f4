//! Uploaded documents and images of objects and products.

use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    response::Response,
    Json,
};
use sea_orm::TransactionTrait;
use uuid::Uuid;

use super::utils::{file_response, read_single_upload, read_uploads};
use crate::api::types::*;
use crate::api::AppState;
use crate::db::repositories::{ObjectRepository, ProductRepository};
use crate::error::{OptionExt, Result, ServerError};
use crate::storage::{namespaces, StorageError};

/// POST /objects/:id/files - store documents, skipping identical re-uploads
pub async fn upload_object_files(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<ObjectResponse>> {
    let txn = state.db.begin().await?;
    let repo = ObjectRepository::new(&txn);
    let object = repo.get_by_id(id).await?.or_not_found("Object")?;

    let uploads = read_uploads(&mut multipart).await?;
    if uploads.is_empty() {
        return Err(ServerError::Validation("no files in request".to_string()));
    }

    let namespace = namespaces::object_files(id);
    let mut stored = object.stored_files();
    for upload in uploads {
        let saved = state
            .files
            .save_deduplicated(&namespace, &upload.file_name, upload.data)
            .await?;
        if saved.reused {
            tracing::info!("Object {} already holds {}", id, saved.name);
        }
        if !stored.contains(&saved.name) {
            stored.push(saved.name);
        }
    }

    let object = repo.set_file_storage(object, &stored).await?;
    txn.commit().await?;
    Ok(Json(object.into()))
}

/// GET /objects/:id/files/:name
pub async fn download_object_file(
    State(state): State<Arc<AppState>>,
    Path((id, name)): Path<(Uuid, String)>,
) -> Result<Response> {
    let object = ObjectRepository::new(&state.db)
        .get_by_id(id)
        .await?
        .or_not_found("Object")?;
    if !object.stored_files().contains(&name) {
        return Err(ServerError::NotFound(format!("File {}", name)));
    }

    let data = state.files.get(&namespaces::object_files(id), &name).await?;
    Ok(file_response(&name, data))
}

/// DELETE /objects/:id/files/:name
pub async fn delete_object_file(
    State(state): State<Arc<AppState>>,
    Path((id, name)): Path<(Uuid, String)>,
) -> Result<Json<ObjectResponse>> {
    let txn = state.db.begin().await?;
    let repo = ObjectRepository::new(&txn);
    let object = repo.get_by_id(id).await?.or_not_found("Object")?;

    let mut stored = object.stored_files();
    let before = stored.len();
    stored.retain(|f| f != &name);
    if stored.len() == before {
        return Err(ServerError::NotFound(format!("File {}", name)));
    }

    let object = repo.set_file_storage(object, &stored).await?;
    state.files.delete(&namespaces::object_files(id), &name).await?;
    txn.commit().await?;
    tracing::info!("Removed file {} from object {}", name, id);
    Ok(Json(object.into()))
}

/// POST /objects/:id/image - replaces any previous image
pub async fn upload_object_image(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<ObjectResponse>> {
    let repo = ObjectRepository::new(&state.db);
    let object = repo.get_by_id(id).await?.or_not_found("Object")?;

    let upload = read_single_upload(&mut multipart).await?;
    state
        .files
        .replace_single(&namespaces::object_image(id), &upload.file_name, upload.data)
        .await?;

    let object = repo.set_image(object, Some(state.object_image_url(id))).await?;
    Ok(Json(object.into()))
}

/// GET /objects/:id/image
pub async fn get_object_image(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Response> {
    ObjectRepository::new(&state.db)
        .get_by_id(id)
        .await?
        .or_not_found("Object")?;
    image_response(&state, &namespaces::object_image(id)).await
}

/// POST /products/:id/image - replaces any previous image
pub async fn upload_product_image(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<ProductResponse>> {
    let repo = ProductRepository::new(&state.db);
    let product = repo.get_by_id(id).await?.or_not_found("Product")?;

    let upload = read_single_upload(&mut multipart).await?;
    state
        .files
        .replace_single(&namespaces::product_image(id), &upload.file_name, upload.data)
        .await?;

    let product = repo.set_image(product, Some(state.product_image_url(id))).await?;
    Ok(Json(product.into()))
}

/// GET /products/:id/image
pub async fn get_product_image(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Response> {
    ProductRepository::new(&state.db)
        .get_by_id(id)
        .await?
        .or_not_found("Product")?;
    image_response(&state, &namespaces::product_image(id)).await
}

async fn image_response(state: &AppState, namespace: &str) -> Result<Response> {
    match state.files.get_single(namespace).await {
        Ok((name, data)) => Ok(file_response(&name, data)),
        Err(StorageError::NotFound(_)) => Err(ServerError::NotFound("Image".to_string())),
        Err(e) => Err(e.into()),
    }
}
