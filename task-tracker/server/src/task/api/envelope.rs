use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::task::TaskServiceError;

pub const TASK_NOT_FOUND: &str = "Task not found.";
pub const DUPLICATE_TITLE: &str = "A task with this title already exists.";
pub const INTERNAL_ERROR: &str = "Something went wrong.";

/// Uniform body returned by every `/api/tasks` operation.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Successful response carrying `data`.
    pub fn success(message: &str, data: T) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            data: Some(data),
            error: None,
        }
    }

    /// Successful response without a payload.
    pub fn message_only(message: &str) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            data: None,
            error: None,
        }
    }

    fn failure(message: String, error: Option<String>) -> Self {
        Self {
            success: false,
            message,
            data: None,
            error,
        }
    }
}

/// Failures of the task API, each mapped to one HTTP status.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed or missing input.
    #[error("{0}")]
    Validation(String),
    /// A task with the same title already exists.
    #[error("{0}")]
    Conflict(String),
    /// No task matches the requested ID.
    #[error("{0}")]
    NotFound(String),
    /// Unexpected failure, usually from the store. Holds the underlying error text.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(message: &str) -> Self {
        ApiError::Validation(message.to_string())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<TaskServiceError> for ApiError {
    fn from(err: TaskServiceError) -> Self {
        match err {
            TaskServiceError::DuplicateTitle(_) => ApiError::Conflict(DUPLICATE_TITLE.to_string()),
            TaskServiceError::TaskNotFound(_) => ApiError::NotFound(TASK_NOT_FOUND.to_string()),
            TaskServiceError::Database(db_err) => ApiError::Internal(db_err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        let body = match self {
            ApiError::Internal(error) => {
                tracing::error!("Task API request failed: {}", error);
                ApiResponse::<()>::failure(INTERNAL_ERROR.to_string(), Some(error))
            }
            ApiError::Validation(message)
            | ApiError::Conflict(message)
            | ApiError::NotFound(message) => ApiResponse::<()>::failure(message, None),
        };
        (status_code, Json(body)).into_response()
    }
}
