use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

use crate::storage::StorageError;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(DbErr),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<DbErr> for ServerError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg)) => ServerError::Conflict(msg),
            Some(SqlErr::ForeignKeyConstraintViolation(msg)) => ServerError::Conflict(msg),
            _ => ServerError::Database(err),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ServerError::Conflict(_) => (StatusCode::CONFLICT, self.to_string()),
            ServerError::Validation(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ServerError::Storage(StorageError::NotFound(key)) => {
                (StatusCode::NOT_FOUND, format!("File not found: {}", key))
            }
            ServerError::Storage(StorageError::InvalidKey(_)) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            ServerError::Database(_)
            | ServerError::Storage(_)
            | ServerError::Io(_) => {
                tracing::error!("Request failed: {}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        (status, Json(serde_json::json!({ "detail": message }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;

/// Turn an absent repository lookup into a 404
pub trait OptionExt<T> {
    fn or_not_found(self, what: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn or_not_found(self, what: &str) -> Result<T> {
        self.ok_or_else(|| ServerError::NotFound(what.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ServerError::NotFound("Category".into()), StatusCode::NOT_FOUND),
            (ServerError::Conflict("name taken".into()), StatusCode::CONFLICT),
            (ServerError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (
                ServerError::Storage(StorageError::NotFound("a.txt".into())),
                StatusCode::NOT_FOUND,
            ),
            (
                ServerError::Io(std::io::Error::other("disk full")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_or_not_found() {
        let missing: Option<i32> = None;
        let err = missing.or_not_found("Object").unwrap_err();
        assert_eq!(err.to_string(), "Object not found");
        assert_eq!(Some(3).or_not_found("Object").unwrap(), 3);
    }
}
