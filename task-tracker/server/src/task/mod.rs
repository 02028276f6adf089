use crate::entities::task;
use chrono::{DateTime, Utc};
use sea_orm::*;
use std::sync::Arc;

pub mod api;
pub mod web;

#[derive(Clone, Debug)]
pub struct TaskState {
    pub db: Arc<sea_orm::DatabaseConnection>,
}

#[derive(Debug, PartialEq, Clone, Eq, Hash)]
pub struct Task {
    id: i32,
    title: String,
    completed: bool,
    created_at: DateTime<Utc>,
}

impl Task {
    pub fn new(id: i32, title: String, completed: bool, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title,
            completed,
            created_at,
        }
    }

    /// Returns the ID of the task.
    pub fn id(&self) -> i32 {
        self.id
    }

    /// Returns the title of the task.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns whether the task is completed.
    pub fn completed(&self) -> bool {
        self.completed
    }

    /// Returns the time the task was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl From<task::Model> for Task {
    fn from(model: task::Model) -> Self {
        Task::new(model.id, model.title, model.completed, model.created_at)
    }
}

/// Fields to change on an existing task. `None` leaves the field untouched.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub completed: Option<bool>,
}

impl TaskChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.completed.is_none()
    }
}

/// Error type for TaskService operations.
#[derive(Debug, thiserror::Error)]
pub enum TaskServiceError {
    /// A task with the same title already exists.
    #[error("Task with title '{0}' already exists")]
    DuplicateTitle(String),
    /// Represents a database error.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
    /// Represents a task not found error.
    #[error("Task with ID {0} not found")]
    TaskNotFound(i32),
}

pub struct TaskService<'a> {
    db: &'a sea_orm::DatabaseConnection,
}

impl TaskService<'_> {
    pub fn new(db: &sea_orm::DatabaseConnection) -> TaskService<'_> {
        TaskService { db }
    }

    /// Creates a new task in the database.
    ///
    /// # Arguments
    ///
    /// * `title` - The already trimmed title of the task.
    ///
    /// # Returns
    ///
    /// A `Result` containing the created `Task`, or `DuplicateTitle` if a task
    /// with the identical title already exists.
    #[tracing::instrument(skip(self))]
    pub async fn create_task(&self, title: String) -> Result<Task, TaskServiceError> {
        if self.title_exists(&title).await? {
            return Err(TaskServiceError::DuplicateTitle(title));
        }

        let active_model = task::ActiveModel {
            title: ActiveValue::Set(title),
            completed: ActiveValue::Set(false),
            created_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        };
        let created_model = active_model.insert(self.db).await?;
        Ok(Task::from(created_model))
    }

    /// Retrieves all tasks, newest first.
    ///
    /// Tasks created within the same clock tick keep their creation order
    /// through the descending ID tie-breaker.
    #[tracing::instrument(skip(self))]
    pub async fn get_all_tasks(&self) -> Result<Vec<Task>, TaskServiceError> {
        let tasks = task::Entity::find()
            .order_by_desc(task::Column::CreatedAt)
            .order_by_desc(task::Column::Id)
            .all(self.db)
            .await?
            .into_iter()
            .map(Task::from)
            .collect();
        Ok(tasks)
    }

    /// Retrieves a task by its ID.
    #[tracing::instrument(skip(self))]
    pub async fn get_task_by_id(&self, id: i32) -> Result<Task, TaskServiceError> {
        let task_model = self.find_model(id).await?;
        Ok(Task::from(task_model))
    }

    /// Applies the supplied changes to a task.
    ///
    /// # Arguments
    ///
    /// * `id` - The ID of the task to update.
    /// * `changes` - The fields to overwrite. Titles are stored as given.
    ///
    /// # Returns
    ///
    /// A `Result` containing the updated `Task`. When `changes` is empty the
    /// stored task is returned as is.
    #[tracing::instrument(skip(self))]
    pub async fn update_task(
        &self,
        id: i32,
        changes: TaskChanges,
    ) -> Result<Task, TaskServiceError> {
        let task_to_update = self.find_model(id).await?;
        if changes.is_empty() {
            return Ok(Task::from(task_to_update));
        }

        let mut active_model: task::ActiveModel = task_to_update.into();
        if let Some(title) = changes.title {
            active_model.title = ActiveValue::Set(title);
        }
        if let Some(completed) = changes.completed {
            active_model.completed = ActiveValue::Set(completed);
        }
        let updated_model = active_model.update(self.db).await?;

        Ok(Task::from(updated_model))
    }

    /// Flips the completed flag of a task and returns the stored result.
    #[tracing::instrument(skip(self))]
    pub async fn toggle_task(&self, id: i32) -> Result<Task, TaskServiceError> {
        let current = self.get_task_by_id(id).await?;
        let changes = TaskChanges {
            completed: Some(!current.completed()),
            ..Default::default()
        };
        self.update_task(id, changes).await
    }

    /// Deletes a task by its ID.
    ///
    /// # Returns
    ///
    /// A `Result` containing the deleted `Task` if successful, or an error otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn delete_task_by_id(&self, id: i32) -> Result<Task, TaskServiceError> {
        let task_to_delete = self.find_model(id).await?;

        let task_copy = Task::from(task_to_delete);
        task::Entity::delete_by_id(id).exec(self.db).await?;
        Ok(task_copy)
    }

    #[tracing::instrument(skip(self))]
    async fn title_exists(&self, title: &str) -> Result<bool, TaskServiceError> {
        let existing_task = task::Entity::find()
            .filter(task::Column::Title.eq(title))
            .one(self.db)
            .await?;
        Ok(existing_task.is_some())
    }

    async fn find_model(&self, id: i32) -> Result<task::Model, TaskServiceError> {
        task::Entity::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or(TaskServiceError::TaskNotFound(id))
    }
}
