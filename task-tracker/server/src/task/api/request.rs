//! Validation of `/api/tasks` request bodies and query parameters.
//!
//! Bodies are read as loose JSON first so that a wrongly typed field is
//! reported with the message for that field instead of a generic decode error.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use super::envelope::ApiError;
use crate::task::TaskChanges;

pub const INVALID_BODY: &str = "Request body must be a JSON object.";
pub const TITLE_REQUIRED: &str = "Title is required and must be a non-empty string.";
pub const INVALID_QUERY_ID: &str = "Invalid task ID. Must be a number.";
pub const ID_REQUIRED: &str = "Task ID must be provided as a number.";
pub const INVALID_TITLE: &str = "Title must be a non-empty string.";
pub const INVALID_COMPLETED: &str = "Completed must be a boolean.";

/// Body of `POST /api/tasks`.
#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct CreateTaskBody {
    /// Title of the new task. Surrounding whitespace is removed.
    pub title: String,
}

/// Body of `PATCH /api/tasks`.
#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct UpdateTaskBody {
    /// ID of the task to update
    pub id: i32,
    /// New title. Surrounding whitespace is removed.
    pub title: Option<String>,
    /// New completion state
    pub completed: Option<bool>,
}

/// Body of `DELETE /api/tasks`.
#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct DeleteTaskBody {
    /// ID of the task to delete
    pub id: i32,
}

impl CreateTaskBody {
    pub fn from_json(body: &[u8]) -> Result<Self, ApiError> {
        let object = parse_object(body)?;
        let title = object
            .get("title")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|title| !title.is_empty())
            .ok_or_else(|| ApiError::validation(TITLE_REQUIRED))?;
        Ok(Self {
            title: title.to_string(),
        })
    }
}

impl UpdateTaskBody {
    pub fn from_json(body: &[u8]) -> Result<Self, ApiError> {
        let object = parse_object(body)?;
        let id = parse_body_id(&object)?;

        let title = match object.get("title") {
            None | Some(Value::Null) => None,
            Some(Value::String(title)) if !title.trim().is_empty() => {
                Some(title.trim().to_string())
            }
            Some(_) => return Err(ApiError::validation(INVALID_TITLE)),
        };

        let completed = match object.get("completed") {
            None => None,
            Some(Value::Bool(completed)) => Some(*completed),
            Some(_) => return Err(ApiError::validation(INVALID_COMPLETED)),
        };

        Ok(Self {
            id,
            title,
            completed,
        })
    }

    /// Splits the body into the target ID and the changes to apply.
    pub fn into_changes(self) -> (i32, TaskChanges) {
        (
            self.id,
            TaskChanges {
                title: self.title,
                completed: self.completed,
            },
        )
    }
}

impl DeleteTaskBody {
    pub fn from_json(body: &[u8]) -> Result<Self, ApiError> {
        let object = parse_object(body)?;
        let id = parse_body_id(&object)?;
        Ok(Self { id })
    }
}

/// Parses the `id` query parameter of `GET /api/tasks`.
pub fn parse_query_id(raw: &str) -> Result<i32, ApiError> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| ApiError::validation(INVALID_QUERY_ID))
}

fn parse_object(body: &[u8]) -> Result<Map<String, Value>, ApiError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(object)) => Ok(object),
        _ => Err(ApiError::validation(INVALID_BODY)),
    }
}

// IDs start at 1, so 0 is rejected along with negatives and fractions.
// Integral floats such as `1.0` name the same task as `1`.
fn parse_body_id(object: &Map<String, Value>) -> Result<i32, ApiError> {
    object
        .get("id")
        .and_then(|id| {
            id.as_i64().or_else(|| {
                id.as_f64()
                    .filter(|id| id.fract() == 0.0 && id.abs() <= i32::MAX as f64)
                    .map(|id| id as i64)
            })
        })
        .filter(|id| *id > 0)
        .and_then(|id| i32::try_from(id).ok())
        .ok_or_else(|| ApiError::validation(ID_REQUIRED))
}
