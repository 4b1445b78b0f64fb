// Skip is not a failure: it explains why the reducer left the board
// untouched. StorageError covers the blob store, ApiError the HTTP edge.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::Status;

// Why an action was a no-op
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Skip {
    #[error("task {0} not found")]
    TaskNotFound(Uuid),

    #[error("checklist {checklist_id} not found on task {task_id}")]
    ChecklistNotFound { task_id: Uuid, checklist_id: Uuid },

    #[error("item {item_id} not found in checklist {checklist_id}")]
    ItemNotFound { checklist_id: Uuid, item_id: Uuid },

    #[error("task {id} is not in the {status} column")]
    NotInColumn { id: Uuid, status: Status },

    #[error("task {0} is done and can no longer be edited")]
    TaskDone(Uuid),

    #[error("task {id} is already {status}")]
    AlreadyInStatus { id: Uuid, status: Status },

    #[error("task {0} dropped onto itself")]
    SameTask(Uuid),
}

impl Skip {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Skip::TaskNotFound(_)
                | Skip::ChecklistNotFound { .. }
                | Skip::ItemNotFound { .. }
                | Skip::NotInColumn { .. }
        )
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid task payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("stored payload is not an array")]
    NotAnArray,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Conflict(_) => "CONFLICT",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn public_message(&self) -> String {
        match self {
            Self::NotFound(msg) | Self::BadRequest(msg) | Self::Conflict(msg) => msg.clone(),
            Self::Internal(_) => "An internal error occurred".to_string(),
        }
    }
}

impl From<Skip> for ApiError {
    fn from(skip: Skip) -> Self {
        if skip.is_not_found() {
            ApiError::NotFound(skip.to_string())
        } else {
            ApiError::Conflict(skip.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::Internal(e) => tracing::error!(error = ?e, "Internal server error"),
            _ => tracing::warn!(error = %self, "API error"),
        }

        let body = ErrorResponse {
            code: self.error_code().to_string(),
            message: self.public_message(),
        };

        (self.status_code(), Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
