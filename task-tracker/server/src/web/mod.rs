use askama::Template;
use axum::http::StatusCode;
use axum::response::Html;
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config;
use crate::task::TaskState;
use crate::task::web::create_task_router;

pub mod api;

/// Custom error type for web handler operations.
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    /// Represents an error during template rendering.
    /// The specific `askama::Error` is captured as the source of this error.
    #[error("Template rendering failed")]
    Template(#[from] askama::Error),
}

impl axum::response::IntoResponse for WebError {
    fn into_response(self) -> axum::response::Response {
        let user_facing_error_message =
            "An unexpected error occurred while processing your request. Please try again later.";
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(format!(
                "<h1>Internal Server Error</h1><p>{}</p>",
                user_facing_error_message
            )),
        )
            .into_response()
    }
}

/// Builds the application router with the task page, the JSON API and the health check.
pub fn create_app(db: DatabaseConnection) -> axum::Router {
    use axum::Router;

    let task_state = Arc::new(TaskState { db: Arc::new(db) });

    let page_router = create_task_router(task_state.clone());
    let api_router = api::create_api_router(task_state);

    Router::new()
        .route("/health", axum::routing::get(health_check_handler))
        .route("/", axum::routing::get(tasks_page_handler))
        .merge(page_router)
        .merge(api_router)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::new().expose_headers([
                    axum::http::HeaderName::from_static("hx-retarget"),
                    axum::http::HeaderName::from_static("hx-reswap"),
                ])),
        )
}

#[tracing::instrument(skip(config))]
pub async fn start_web_server(config: config::Config) -> anyhow::Result<()> {
    let server_address = format!("0.0.0.0:{}", &config.port);
    let listener = tokio::net::TcpListener::bind(&server_address).await?;
    tracing::info!("Web server running on http://{}", server_address);

    let db = Database::connect(&config.db_url).await?;
    migration::Migrator::up(&db, None).await?;
    tracing::info!("Database migrations applied successfully");

    let app = create_app(db);

    axum::serve(listener, app).await?;
    Ok(())
}

#[tracing::instrument]
pub async fn health_check_handler() -> &'static str {
    "OK"
}

/// Handler for the / endpoint that displays the task page.
/// The table and dialogs are fetched as fragments once the page loads.
#[tracing::instrument]
pub async fn tasks_page_handler() -> Result<Html<String>, WebError> {
    let template = TasksTemplate::new();
    template.render().map(Html).map_err(WebError::from)
}

#[derive(Template)]
#[template(path = "tasks.html")]
struct TasksTemplate;

impl TasksTemplate {
    pub fn new() -> Self {
        Self
    }
}
