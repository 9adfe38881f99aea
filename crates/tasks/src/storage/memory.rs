//! In-process storage with the same semantics as the hosted store.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::traits::{NewTask, Storage};
use crate::entities::{Task, TaskPatch};
use crate::errors::{TasksError, TasksResult};

/// Memory storage. Clones share the same task list.
///
/// An unscoped handle sees every row; a handle from [`Storage::scoped`] sees
/// only the rows of its owner, like row-level security on the hosted store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    tasks: Arc<RwLock<Vec<Task>>>,
    owner: Option<String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing set of records.
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            tasks: Arc::new(RwLock::new(tasks)),
            owner: None,
        }
    }

    /// Number of stored tasks.
    pub async fn len(&self) -> usize {
        self.tasks.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tasks.read().await.is_empty()
    }

    fn visible(&self, task: &Task) -> bool {
        self.owner.as_deref().is_none_or(|owner| task.user_id == owner)
    }

    fn not_found(task_id: &str) -> TasksError {
        TasksError::TaskNotFound {
            task_id: task_id.to_string(),
        }
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    fn storage_type(&self) -> &'static str {
        "memory"
    }

    fn scoped(&self, _access_token: &str, owner_email: &str) -> Arc<dyn Storage> {
        Arc::new(Self {
            tasks: Arc::clone(&self.tasks),
            owner: Some(owner_email.to_string()),
        })
    }

    async fn load_tasks(&self) -> TasksResult<Vec<Task>> {
        let mut tasks: Vec<Task> = self
            .tasks
            .read()
            .await
            .iter()
            .rev()
            .filter(|t| self.visible(t))
            .cloned()
            .collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tasks)
    }

    async fn load_task(&self, task_id: &str) -> TasksResult<Option<Task>> {
        Ok(self
            .tasks
            .read()
            .await
            .iter()
            .find(|t| t.id == task_id && self.visible(t))
            .cloned())
    }

    async fn add_task(&self, task: NewTask) -> TasksResult<Task> {
        let task = task.into_task(Uuid::new_v4().to_string());
        self.tasks.write().await.push(task.clone());
        Ok(task)
    }

    async fn update_task(&self, task_id: &str, patch: &TaskPatch) -> TasksResult<Option<Task>> {
        let mut tasks = self.tasks.write().await;
        let task = tasks
            .iter_mut()
            .find(|t| t.id == task_id && self.visible(t))
            .ok_or_else(|| Self::not_found(task_id))?;
        task.apply_patch(patch);
        Ok(Some(task.clone()))
    }

    async fn delete_task(&self, task_id: &str) -> TasksResult<()> {
        let mut tasks = self.tasks.write().await;
        let position = tasks
            .iter()
            .position(|t| t.id == task_id && self.visible(t))
            .ok_or_else(|| Self::not_found(task_id))?;
        tasks.remove(position);
        Ok(())
    }
}
