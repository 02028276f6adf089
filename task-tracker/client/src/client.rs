use reqwest::{Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::task::{Task, TaskUpdate};

const FALLBACK_ERROR: &str = "Something went wrong";

/// Error type for TaskClient operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Api { status: StatusCode, message: String },
    /// The request could not be sent or the response could not be decoded.
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Serialize)]
struct UpdateBody {
    id: i32,
    #[serde(flatten)]
    update: TaskUpdate,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    message: Option<String>,
}

/// HTTP client for the `/api/tasks` endpoint.
#[derive(Debug, Clone)]
pub struct TaskClient {
    http: reqwest::Client,
    base_url: String,
}

impl TaskClient {
    /// Creates a client for the tracker running at `base_url`, e.g. `http://localhost:8080`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    fn tasks_url(&self) -> String {
        format!("{}/api/tasks", self.base_url)
    }

    /// Fetches every task, newest first.
    #[tracing::instrument(skip(self))]
    pub async fn get_tasks(&self) -> Result<Vec<Task>, ClientError> {
        let response = self.http.get(self.tasks_url()).send().await?;
        read_data(response).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_task_by_id(&self, id: i32) -> Result<Task, ClientError> {
        let response = self
            .http
            .get(self.tasks_url())
            .query(&[("id", id)])
            .send()
            .await?;
        read_data(response).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn create_task(&self, title: &str) -> Result<Task, ClientError> {
        let response = self
            .http
            .post(self.tasks_url())
            .json(&json!({ "title": title }))
            .send()
            .await?;
        read_data(response).await
    }

    /// Sends the set fields of `update` for the task `id`.
    #[tracing::instrument(skip(self))]
    pub async fn update_task(&self, id: i32, update: TaskUpdate) -> Result<Task, ClientError> {
        let body = UpdateBody { id, update };
        let response = self.http.patch(self.tasks_url()).json(&body).send().await?;
        read_data(response).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_task(&self, id: i32) -> Result<(), ClientError> {
        let response = self
            .http
            .delete(self.tasks_url())
            .json(&json!({ "id": id }))
            .send()
            .await?;
        check_status(response).await.map(|_| ())
    }
}

/// Turns a non-2xx response into `ClientError::Api` with the server's message.
async fn check_status(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .json::<ErrorEnvelope>()
        .await
        .ok()
        .and_then(|body| body.message)
        .unwrap_or_else(|| FALLBACK_ERROR.to_string());
    tracing::debug!("Task API returned {}: {}", status, message);
    Err(ClientError::Api { status, message })
}

async fn read_data<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let envelope = check_status(response)
        .await?
        .json::<Envelope<T>>()
        .await?;
    Ok(envelope.data)
}
