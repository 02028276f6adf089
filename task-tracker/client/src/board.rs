//! Session state for a task list view.
//!
//! `TaskBoard` owns the tasks currently shown and the last notification. Every
//! mutation goes through the API and then reloads the full list, so the local
//! copy never drifts from the store.

use crate::client::{ClientError, TaskClient};
use crate::task::{Task, TaskUpdate};

pub const TASK_ADDED: &str = "Task added successfully";
pub const TASK_DELETED: &str = "Task deleted";

/// Message shown to the user after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Success(String),
    Error(String),
}

pub struct TaskBoard {
    client: TaskClient,
    tasks: Vec<Task>,
    notification: Option<Notification>,
}

impl TaskBoard {
    pub fn new(client: TaskClient) -> Self {
        Self {
            client,
            tasks: Vec::new(),
            notification: None,
        }
    }

    /// Tasks as of the last successful load, newest first.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    pub fn dismiss_notification(&mut self) {
        self.notification = None;
    }

    /// Replaces the local list with the server's.
    #[tracing::instrument(skip(self))]
    pub async fn load(&mut self) -> Result<&[Task], ClientError> {
        let loaded = self.client.get_tasks().await;
        self.tasks = self.record(loaded)?;
        Ok(&self.tasks)
    }

    /// Creates a task. A blank title is ignored without contacting the server.
    #[tracing::instrument(skip(self))]
    pub async fn add_task(&mut self, title: &str) -> Result<Option<Task>, ClientError> {
        let title = title.trim();
        if title.is_empty() {
            return Ok(None);
        }

        let created = self.client.create_task(title).await;
        let task = self.record(created)?;
        self.load().await?;
        self.notification = Some(Notification::Success(TASK_ADDED.to_string()));
        Ok(Some(task))
    }

    /// Flips the completed flag of a task and reloads the list.
    #[tracing::instrument(skip(self))]
    pub async fn toggle(&mut self, id: i32) -> Result<Task, ClientError> {
        let shown = self
            .tasks
            .iter()
            .find(|task| task.id == id)
            .map(|task| task.completed);
        let completed = match shown {
            Some(completed) => completed,
            None => {
                let fetched = self.client.get_task_by_id(id).await;
                self.record(fetched)?.completed
            }
        };

        let updated = self
            .client
            .update_task(id, TaskUpdate::completed(!completed))
            .await;
        let task = self.record(updated)?;
        self.load().await?;
        Ok(task)
    }

    /// Renames a task and reloads the list.
    #[tracing::instrument(skip(self))]
    pub async fn rename(&mut self, id: i32, title: &str) -> Result<Task, ClientError> {
        let updated = self.client.update_task(id, TaskUpdate::title(title)).await;
        let task = self.record(updated)?;
        self.load().await?;
        Ok(task)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&mut self, id: i32) -> Result<(), ClientError> {
        let deleted = self.client.delete_task(id).await;
        self.record(deleted)?;
        self.load().await?;
        self.notification = Some(Notification::Success(TASK_DELETED.to_string()));
        Ok(())
    }

    // Failures become the notification before being handed back.
    fn record<T>(&mut self, result: Result<T, ClientError>) -> Result<T, ClientError> {
        if let Err(err) = &result {
            tracing::warn!("Task board action failed: {}", err);
            self.notification = Some(Notification::Error(err.to_string()));
        }
        result
    }
}
