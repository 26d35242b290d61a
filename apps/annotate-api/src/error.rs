//! Error types for the annotation API

use annotate_core::AnnotateError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid PDF: {0}")]
    InvalidDocument(String),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<AnnotateError> for ApiError {
    fn from(err: AnnotateError) -> Self {
        match err {
            AnnotateError::InvalidArgument(msg) => ApiError::InvalidRequest(msg),
            AnnotateError::ParseError(msg) => ApiError::InvalidDocument(msg),
            other => ApiError::Internal(other.into()),
        }
    }
}

/// Malformed bodies (including unknown annotation types) are client errors
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::ProjectNotFound(id) => {
                (StatusCode::NOT_FOUND, format!("Project not found: {}", id))
            }
            ApiError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::InvalidDocument(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("Could not read PDF: {}", msg),
            ),
            ApiError::Store(e) => {
                tracing::error!("Storage error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Storage error".to_string(),
                )
            }
            ApiError::Internal(e) => {
                tracing::error!("Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
