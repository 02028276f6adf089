use askama::Template;
use axum::{
    Form, Router,
    extract::{Path, State},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::Html,
    routing::{get, post},
};
use serde::Deserialize;
use std::sync::Arc;

use crate::task::api::envelope::TASK_NOT_FOUND;
use crate::task::api::request::TITLE_REQUIRED;
use crate::task::{Task, TaskService, TaskServiceError, TaskState};

pub const TASK_ADDED: &str = "Task added successfully";
pub const TASK_DELETED: &str = "Task deleted";

#[derive(Debug, Deserialize)]
pub struct CreateTaskForm {
    title: String,
}

/// Re-reads every task and renders the table fragment.
/// Every mutating handler ends here so the page never patches its list locally.
#[tracing::instrument(skip(task_service))]
async fn render_task_table(
    task_service: &TaskService<'_>,
    notification: Option<&str>,
    close_dialog: bool,
) -> Result<String, TaskPageError> {
    let tasks = task_service.get_all_tasks().await?;
    let table_template = TaskTableTemplate::new(
        tasks,
        notification.map(str::to_string),
        close_dialog,
    );
    table_template.render().map_err(TaskPageError::from)
}

/// Custom error type for task page operations.
#[derive(Debug, thiserror::Error)]
pub enum TaskPageError {
    /// Represents an error during template rendering.
    #[error("Template rendering failed")]
    Template(#[from] askama::Error),
    /// Represents a task service error.
    #[error("Task service error")]
    Service(#[from] TaskServiceError),
    /// The submitted title was empty after trimming.
    #[error("Task title is blank")]
    BlankTitle,
}

impl axum::response::IntoResponse for TaskPageError {
    fn into_response(self) -> axum::response::Response {
        let (status_code, user_facing_error_message) = match &self {
            TaskPageError::BlankTitle => (StatusCode::BAD_REQUEST, TITLE_REQUIRED),
            TaskPageError::Service(TaskServiceError::DuplicateTitle(_)) => (
                StatusCode::CONFLICT,
                "A task with this title already exists. Please choose a different title.",
            ),
            TaskPageError::Service(TaskServiceError::TaskNotFound(_)) => {
                (StatusCode::NOT_FOUND, TASK_NOT_FOUND)
            }
            _ => {
                tracing::error!("Task page request failed: {:?}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred while processing your request. Please try again later.",
                )
            }
        };

        let error_template = ErrorMessageTemplate::new(user_facing_error_message.to_string());
        let Ok(rendered) = error_template.render() else {
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        };

        let mut response = (status_code, Html(rendered)).into_response();
        // Send the error into the banner instead of the element that issued the request
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("hx-retarget"),
            HeaderValue::from_static("#error-message"),
        );
        headers.insert(
            HeaderName::from_static("hx-reswap"),
            HeaderValue::from_static("innerHTML"),
        );
        response.headers_mut().extend(headers);
        response
    }
}

#[derive(Template)]
#[template(path = "tasks/task_table.html")]
struct TaskTableTemplate {
    tasks: Vec<Task>,
    notification: Option<String>,
    close_dialog: bool,
}

impl TaskTableTemplate {
    pub fn new(tasks: Vec<Task>, notification: Option<String>, close_dialog: bool) -> Self {
        Self {
            tasks,
            notification,
            close_dialog,
        }
    }
}

#[derive(Template)]
#[template(path = "tasks/add_task_dialog.html")]
struct AddTaskDialogTemplate;

#[derive(Template)]
#[template(path = "tasks/delete_task_dialog.html")]
struct DeleteTaskDialogTemplate {
    task: Task,
}

impl DeleteTaskDialogTemplate {
    pub fn new(task: Task) -> Self {
        Self { task }
    }
}

#[derive(Template)]
#[template(path = "tasks/error_message.html")]
struct ErrorMessageTemplate {
    message: String,
}

impl ErrorMessageTemplate {
    pub fn new(message: String) -> Self {
        Self { message }
    }
}

/// Handler for GET /tasks/table that returns just the task table fragment.
#[tracing::instrument(skip(state))]
async fn task_table_handler(
    State(state): State<Arc<TaskState>>,
) -> Result<Html<String>, TaskPageError> {
    let task_service = TaskService::new(&state.db);
    let table_html = render_task_table(&task_service, None, false).await?;
    Ok(Html(table_html))
}

/// Handler for serving the creation dialog.
#[tracing::instrument]
async fn add_task_dialog_handler() -> Result<Html<String>, TaskPageError> {
    let template = AddTaskDialogTemplate;
    template.render().map(Html).map_err(TaskPageError::from)
}

/// Handler for creating a task from the creation dialog.
#[tracing::instrument(skip(state))]
async fn create_task_handler(
    State(state): State<Arc<TaskState>>,
    Form(form): Form<CreateTaskForm>,
) -> Result<Html<String>, TaskPageError> {
    let title = form.title.trim();
    if title.is_empty() {
        return Err(TaskPageError::BlankTitle);
    }

    let task_service = TaskService::new(&state.db);
    task_service.create_task(title.to_string()).await?;

    let table_html = render_task_table(&task_service, Some(TASK_ADDED), true).await?;
    Ok(Html(table_html))
}

/// Handler for POST /tasks/{id}/toggle that flips the completed flag.
#[tracing::instrument(skip(state))]
async fn toggle_task_handler(
    State(state): State<Arc<TaskState>>,
    Path(id): Path<i32>,
) -> Result<Html<String>, TaskPageError> {
    let task_service = TaskService::new(&state.db);
    task_service.toggle_task(id).await?;

    let table_html = render_task_table(&task_service, None, false).await?;
    Ok(Html(table_html))
}

/// Handler for serving the delete confirmation dialog.
#[tracing::instrument(skip(state))]
async fn delete_task_dialog_handler(
    State(state): State<Arc<TaskState>>,
    Path(id): Path<i32>,
) -> Result<Html<String>, TaskPageError> {
    let task_service = TaskService::new(&state.db);
    let task = task_service.get_task_by_id(id).await?;

    let template = DeleteTaskDialogTemplate::new(task);
    template.render().map(Html).map_err(TaskPageError::from)
}

/// Handler for DELETE /tasks/{id} issued by the confirmation dialog.
#[tracing::instrument(skip(state))]
async fn delete_task_handler(
    State(state): State<Arc<TaskState>>,
    Path(id): Path<i32>,
) -> Result<Html<String>, TaskPageError> {
    let task_service = TaskService::new(&state.db);
    task_service.delete_task_by_id(id).await?;

    let table_html = render_task_table(&task_service, Some(TASK_DELETED), true).await?;
    Ok(Html(table_html))
}

/// Creates and returns the router for the fragments the task page loads.
pub fn create_task_router(state: Arc<TaskState>) -> Router {
    Router::new()
        .route("/tasks", post(create_task_handler))
        .route("/tasks/table", get(task_table_handler))
        .route("/tasks/add", get(add_task_dialog_handler))
        .route("/tasks/{id}", axum::routing::delete(delete_task_handler))
        .route("/tasks/{id}/delete", get(delete_task_dialog_handler))
        .route("/tasks/{id}/toggle", post(toggle_task_handler))
        .with_state(state)
}
