use crate::task::{Task, TaskService, TaskState};
use axum::{
    Router,
    body::Bytes,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::Json,
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};

pub mod envelope;
pub mod request;

use envelope::{ApiError, ApiResponse};
use request::{
    CreateTaskBody, DeleteTaskBody, INVALID_QUERY_ID, UpdateTaskBody, parse_query_id,
};

/// JSON representation of a Task for API responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskJson {
    /// Unique identifier assigned by the store
    pub id: i32,
    /// Trimmed, non-empty title
    pub title: String,
    /// Whether the task is done
    pub completed: bool,
    /// Creation time, set by the store
    pub created_at: DateTime<Utc>,
}

impl From<Task> for TaskJson {
    fn from(task: Task) -> Self {
        Self {
            id: task.id(),
            title: task.title().to_string(),
            completed: task.completed(),
            created_at: task.created_at(),
        }
    }
}

/// Payload of a read: one task when an ID was requested, every task otherwise.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum TaskPayload {
    One(TaskJson),
    Many(Vec<TaskJson>),
}

/// Query parameters for reading tasks.
#[derive(Debug, Deserialize)]
pub struct TasksQuery {
    /// Optional task ID. Kept as text so a non-numeric value can be reported.
    #[serde(default)]
    id: Option<String>,
}

type ApiResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;

/// Handler for GET /api/tasks - Returns one task by `id`, or all tasks newest first.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/api/tasks",
    params(
        ("id" = Option<String>, Query, description = "Optional ID of the task to fetch")
    ),
    responses(
        (status = 200, description = "Envelope whose data is the requested task, or every task newest first", body = [TaskJson]),
        (status = 400, description = "The id is not a number"),
        (status = 404, description = "No task has this id"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Tasks"
)]
pub async fn get_tasks_handler(
    State(state): State<Arc<TaskState>>,
    query: Result<Query<TasksQuery>, QueryRejection>,
) -> ApiResult<TaskPayload> {
    // A repeated or undecodable `id` is reported like any other bad ID.
    let Query(query) = query.map_err(|rejection| {
        tracing::debug!("Rejected task query: {}", rejection);
        ApiError::validation(INVALID_QUERY_ID)
    })?;
    let service = TaskService::new(&state.db);

    match query.id.as_deref().filter(|raw| !raw.is_empty()) {
        Some(raw_id) => {
            let id = parse_query_id(raw_id)?;
            let task = service.get_task_by_id(id).await?;
            Ok((
                StatusCode::OK,
                Json(ApiResponse::success(
                    "Task fetched successfully.",
                    TaskPayload::One(task.into()),
                )),
            ))
        }
        None => {
            let tasks = service.get_all_tasks().await?;
            let json_tasks = tasks.into_iter().map(TaskJson::from).collect();
            Ok((
                StatusCode::OK,
                Json(ApiResponse::success(
                    "Tasks fetched successfully.",
                    TaskPayload::Many(json_tasks),
                )),
            ))
        }
    }
}

/// Handler for POST /api/tasks - Creates a task with a unique title.
#[tracing::instrument(skip(state, body))]
#[utoipa::path(
    post,
    path = "/api/tasks",
    request_body = CreateTaskBody,
    responses(
        (status = 201, description = "Envelope whose data is the created task", body = TaskJson),
        (status = 400, description = "The title is missing, blank or not a string"),
        (status = 409, description = "A task with this title already exists"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Tasks"
)]
pub async fn create_task_handler(
    State(state): State<Arc<TaskState>>,
    body: Bytes,
) -> ApiResult<TaskJson> {
    let request = CreateTaskBody::from_json(&body)?;
    let service = TaskService::new(&state.db);

    let task = service.create_task(request.title).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            "Task created successfully.",
            task.into(),
        )),
    ))
}

/// Handler for PATCH /api/tasks - Updates the title and/or completed flag of a task.
#[tracing::instrument(skip(state, body))]
#[utoipa::path(
    patch,
    path = "/api/tasks",
    request_body = UpdateTaskBody,
    responses(
        (status = 200, description = "Envelope whose data is the updated task", body = TaskJson),
        (status = 400, description = "The id, title or completed field is invalid"),
        (status = 404, description = "No task has this id"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Tasks"
)]
pub async fn update_task_handler(
    State(state): State<Arc<TaskState>>,
    body: Bytes,
) -> ApiResult<TaskJson> {
    let (id, changes) = UpdateTaskBody::from_json(&body)?.into_changes();
    let service = TaskService::new(&state.db);

    let task = service.update_task(id, changes).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(
            "Task updated successfully.",
            task.into(),
        )),
    ))
}

/// Handler for DELETE /api/tasks - Removes a task.
#[tracing::instrument(skip(state, body))]
#[utoipa::path(
    delete,
    path = "/api/tasks",
    request_body = DeleteTaskBody,
    responses(
        (status = 200, description = "Envelope without data"),
        (status = 400, description = "The id is missing or not a number"),
        (status = 404, description = "No task has this id"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Tasks"
)]
pub async fn delete_task_handler(
    State(state): State<Arc<TaskState>>,
    body: Bytes,
) -> ApiResult<()> {
    let request = DeleteTaskBody::from_json(&body)?;
    let service = TaskService::new(&state.db);

    service.delete_task_by_id(request.id).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::message_only("Task deleted successfully.")),
    ))
}

/// OpenAPI description of the task API.
#[derive(OpenApi)]
#[openapi(
    paths(
        get_tasks_handler,
        create_task_handler,
        update_task_handler,
        delete_task_handler
    ),
    components(schemas(TaskJson, CreateTaskBody, UpdateTaskBody, DeleteTaskBody)),
    tags((name = "Tasks", description = "Create, read, update and delete tasks"))
)]
pub struct TaskApiDoc;

/// Creates and returns the tasks API router.
pub fn create_api_router(state: Arc<TaskState>) -> Router {
    Router::new()
        .route(
            "/tasks",
            get(get_tasks_handler)
                .post(create_task_handler)
                .patch(update_task_handler)
                .delete(delete_task_handler),
        )
        .with_state(state)
}
