//! Storage trait definitions.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::entities::{Task, TaskPatch, TaskPriority, TaskSource, TaskStatus};
use crate::errors::TasksResult;

/// A complete task record that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub hours_spent: Option<f64>,
    pub user_id: String,
    pub source: TaskSource,
}

impl NewTask {
    /// Attach a store-assigned id.
    pub fn into_task(self, id: impl Into<String>) -> Task {
        Task {
            id: id.into(),
            title: self.title,
            description: self.description,
            priority: self.priority,
            status: self.status,
            due_date: self.due_date,
            created_at: self.created_at,
            updated_at: self.updated_at,
            completed_at: self.completed_at,
            hours_spent: self.hours_spent,
            user_id: self.user_id,
            source: self.source,
        }
    }
}

/// Storage interface for task persistence.
///
/// Every method is a single round trip to the backing store.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Get storage type identifier
    fn storage_type(&self) -> &'static str;

    /// The same store, acting on behalf of the holder of `access_token`.
    ///
    /// Only rows owned by `owner_email` are visible through the result;
    /// other ids behave as if they did not exist.
    fn scoped(&self, access_token: &str, owner_email: &str) -> Arc<dyn Storage>;

    /// Load all tasks, newest first
    async fn load_tasks(&self) -> TasksResult<Vec<Task>>;

    /// Load a single task by ID
    async fn load_task(&self, task_id: &str) -> TasksResult<Option<Task>>;

    /// Insert a task and return the stored record
    async fn add_task(&self, task: NewTask) -> TasksResult<Task>;

    /// Apply a partial update.
    ///
    /// Returns `Ok(None)` when the store accepted the change without echoing
    /// the record; unknown ids fail with `TaskNotFound`.
    async fn update_task(&self, task_id: &str, patch: &TaskPatch) -> TasksResult<Option<Task>>;

    /// Delete a task; unknown ids fail with `TaskNotFound`
    async fn delete_task(&self, task_id: &str) -> TasksResult<()>;
}
