//! Shared helpers for route handlers.

use axum::{
    extract::{multipart::MultipartError, Multipart},
    http::header,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use sea_orm::ConnectionTrait;
use uuid::Uuid;

use crate::db::repositories::{CategoryRepository, ObjectRepository, ProjectRepository};
use crate::error::{OptionExt, Result, ServerError};
use crate::storage::guess_content_type;

/// One uploaded file from a multipart body
pub struct Upload {
    pub file_name: String,
    pub data: Bytes,
}

pub fn multipart_error(err: MultipartError) -> ServerError {
    ServerError::Validation(format!("malformed multipart body: {}", err))
}

/// Read every file part of a multipart body, ignoring plain fields
pub async fn read_uploads(multipart: &mut Multipart) -> Result<Vec<Upload>> {
    let mut uploads = Vec::new();
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let data = field.bytes().await.map_err(multipart_error)?;
        uploads.push(Upload { file_name, data });
    }
    Ok(uploads)
}

/// Read the first file part of a multipart body
pub async fn read_single_upload(multipart: &mut Multipart) -> Result<Upload> {
    read_uploads(multipart)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| ServerError::Validation("no file in request".to_string()))
}

/// Raw file body with a content type guessed from its name
pub fn file_response(name: &str, data: Bytes) -> Response {
    let disposition = format!("inline; filename=\"{}\"", name.replace('"', ""));
    (
        [
            (header::CONTENT_TYPE, guess_content_type(name).to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        data,
    )
        .into_response()
}

/// Check that every id names a category; returns the ids without repeats
pub async fn require_categories<C: ConnectionTrait>(db: &C, ids: &[Uuid]) -> Result<Vec<Uuid>> {
    let mut unique = Vec::with_capacity(ids.len());
    for id in ids {
        if !unique.contains(id) {
            unique.push(*id);
        }
    }
    let found = CategoryRepository::new(db).get_by_ids(&unique).await?;
    if found.len() != unique.len() {
        return Err(ServerError::NotFound("Category".to_string()));
    }
    Ok(unique)
}

pub async fn require_project<C: ConnectionTrait>(db: &C, id: Option<Uuid>) -> Result<()> {
    if let Some(id) = id {
        ProjectRepository::new(db).get_by_id(id).await?.or_not_found("Project")?;
    }
    Ok(())
}

/// Check a requested parent object exists and would not close a loop
pub async fn require_object_parent<C: ConnectionTrait>(
    db: &C,
    object_id: Option<Uuid>,
    parent_id: Option<Uuid>,
) -> Result<()> {
    let Some(parent_id) = parent_id else {
        return Ok(());
    };
    let repo = ObjectRepository::new(db);
    repo.get_by_id(parent_id).await?.or_not_found("Parent object")?;
    if let Some(object_id) = object_id {
        if repo.would_create_cycle(object_id, parent_id).await? {
            return Err(ServerError::Validation(
                "object cannot be a branch of itself or its own branches".to_string(),
            ));
        }
    }
    Ok(())
}

/// Check a requested parent category exists and would not close a loop
pub async fn require_category_parent<C: ConnectionTrait>(
    db: &C,
    category_id: Option<Uuid>,
    parent_id: Option<Uuid>,
) -> Result<()> {
    let Some(parent_id) = parent_id else {
        return Ok(());
    };
    let repo = CategoryRepository::new(db);
    repo.get_by_id(parent_id).await?.or_not_found("Parent category")?;
    if let Some(category_id) = category_id {
        if repo.would_create_cycle(category_id, parent_id).await? {
            return Err(ServerError::Validation(
                "category cannot be nested under itself or its descendants".to_string(),
            ));
        }
    }
    Ok(())
}
