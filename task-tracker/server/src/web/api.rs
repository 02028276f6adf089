use std::sync::Arc;

use crate::task::{
    TaskState,
    api::{TaskApiDoc, create_api_router as create_task_api_router},
};

use axum::{Json, Router, routing::get};
use utoipa::OpenApi;

/// Creates the API routes for JSON API endpoints.
pub fn create_api_router(task_state: Arc<TaskState>) -> axum::Router {
    let tasks_router = create_task_api_router(task_state);
    Router::new()
        .nest("/api", tasks_router)
        .route("/api-docs/openapi.json", get(openapi_handler))
}

/// Handler for GET /api-docs/openapi.json - Serves the OpenAPI document of the task API.
#[tracing::instrument]
pub async fn openapi_handler() -> Json<utoipa::openapi::OpenApi> {
    Json(TaskApiDoc::openapi())
}
