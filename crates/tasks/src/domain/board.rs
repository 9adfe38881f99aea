//! Task board: the lifecycle controller over a storage backend.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use crate::entities::{Task, TaskDraft, TaskPatch, TaskStatus};
use crate::errors::{TasksError, TasksResult};
use crate::storage::{NewTask, Storage};

/// Task board holding the caller's view of the task list.
///
/// Every mutation is one storage round trip. The local list is reconciled
/// with the stored record on success and left untouched on failure.
pub struct TaskBoard {
    storage: Arc<dyn Storage>,
    tasks: Vec<Task>,
}

impl TaskBoard {
    /// Create a board with an empty local list
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            tasks: Vec::new(),
        }
    }

    /// The local list as last reconciled.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn into_tasks(self) -> Vec<Task> {
        self.tasks
    }

    /// Replace the local list with the store's, newest first.
    #[instrument(skip(self))]
    pub async fn load(&mut self) -> TasksResult<&[Task]> {
        self.tasks = self.storage.load_tasks().await?;
        debug!(count = self.tasks.len(), "Loaded tasks");
        Ok(&self.tasks)
    }

    /// Load and return all tasks.
    pub async fn list_tasks(&mut self) -> TasksResult<Vec<Task>> {
        self.load().await.map(<[Task]>::to_vec)
    }

    /// Read one task from the store.
    pub async fn get_task(&self, task_id: &str) -> TasksResult<Task> {
        self.storage
            .load_task(task_id)
            .await?
            .ok_or_else(|| not_found(task_id))
    }

    /// Create a task owned by `owner_email`.
    ///
    /// New tasks always start in `todo` with no completion metadata.
    #[instrument(skip(self, draft), fields(source = %draft.source))]
    pub async fn create_task(&mut self, draft: TaskDraft, owner_email: &str) -> TasksResult<Task> {
        let title = draft.title.trim();
        if title.is_empty() {
            return Err(TasksError::validation("Title is required"));
        }

        let now = Utc::now();
        let new_task = NewTask {
            title: title.to_string(),
            description: draft.description,
            priority: draft.priority,
            status: TaskStatus::Todo,
            due_date: draft.due_date,
            created_at: now,
            updated_at: now,
            completed_at: None,
            hours_spent: None,
            user_id: owner_email.to_string(),
            source: draft.source,
        };

        let created = self.storage.add_task(new_task).await?;
        info!(task_id = %created.id, "Created task");
        self.tasks.push(created.clone());
        Ok(created)
    }

    /// Create several tasks one at a time.
    ///
    /// Drafts that fail are logged and skipped; the created records are returned.
    pub async fn create_tasks(&mut self, drafts: Vec<TaskDraft>, owner_email: &str) -> Vec<Task> {
        let mut created = Vec::with_capacity(drafts.len());
        for draft in drafts {
            match self.create_task(draft, owner_email).await {
                Ok(task) => created.push(task),
                Err(e) => warn!(error = %e, "Skipping task that could not be created"),
            }
        }
        created
    }

    /// Apply a partial update.
    ///
    /// Completion goes through [`Self::complete_task`]; a patch moving a task
    /// into `done` is rejected. Any other status change clears completion
    /// metadata.
    #[instrument(skip(self, patch))]
    pub async fn update_task(&mut self, task_id: &str, mut patch: TaskPatch) -> TasksResult<Task> {
        if let Some(title) = &patch.title {
            if title.trim().is_empty() {
                return Err(TasksError::validation("Title is required"));
            }
            patch.title = Some(title.trim().to_string());
        }

        match patch.status {
            Some(TaskStatus::Done) => {
                let current = self.current(task_id).await?;
                if current.status != TaskStatus::Done {
                    return Err(TasksError::InvalidTransition {
                        task_id: task_id.to_string(),
                        from: current.status.to_string(),
                        to: TaskStatus::Done.to_string(),
                    });
                }
                // Already done; keep the completion untouched
                patch.status = None;
            }
            Some(_) => {
                patch.completed_at = Some(None);
                patch.hours_spent = Some(None);
            }
            None => {}
        }

        patch.updated_at = Some(Utc::now());
        let task = self.write_patch(task_id, &patch).await?;
        info!(task_id, status = %task.status, "Updated task");
        Ok(task)
    }

    /// Delete a task. Unknown ids fail and leave the local list unchanged.
    #[instrument(skip(self))]
    pub async fn delete_task(&mut self, task_id: &str) -> TasksResult<()> {
        self.storage.delete_task(task_id).await?;
        self.tasks.retain(|t| t.id != task_id);
        info!(task_id, "Deleted task");
        Ok(())
    }

    /// Mark a task done with the hours spent on it.
    ///
    /// Re-completing overwrites the previous completion time and hours.
    #[instrument(skip(self))]
    pub async fn complete_task(&mut self, task_id: &str, hours_spent: f64) -> TasksResult<Task> {
        if !hours_spent.is_finite() || hours_spent < 0.0 {
            return Err(TasksError::validation(
                "Hours spent must be a non-negative number",
            ));
        }

        let now = Utc::now();
        let patch = TaskPatch {
            status: Some(TaskStatus::Done),
            completed_at: Some(Some(now)),
            hours_spent: Some(Some(hours_spent)),
            updated_at: Some(now),
            ..TaskPatch::default()
        };

        let task = self.write_patch(task_id, &patch).await?;
        info!(task_id, hours_spent, "Completed task");
        Ok(task)
    }

    /// Move a task to another board column.
    ///
    /// Moving into `done` requires the hours spent and completes the task.
    /// Moving to the current column changes nothing.
    #[instrument(skip(self))]
    pub async fn move_task(
        &mut self,
        task_id: &str,
        status: TaskStatus,
        hours_spent: Option<f64>,
    ) -> TasksResult<Task> {
        let current = self.current(task_id).await?;
        if current.status == status {
            debug!(task_id, %status, "Task already in column");
            return Ok(current);
        }

        if status == TaskStatus::Done {
            let hours = hours_spent.ok_or_else(|| {
                TasksError::validation("Hours spent are required to complete a task")
            })?;
            return self.complete_task(task_id, hours).await;
        }

        self.update_task(task_id, TaskPatch::status(status)).await
    }

    /// Local copy if present, otherwise the stored record.
    async fn current(&self, task_id: &str) -> TasksResult<Task> {
        match self.tasks.iter().find(|t| t.id == task_id) {
            Some(task) => Ok(task.clone()),
            None => self.get_task(task_id).await,
        }
    }

    async fn write_patch(&mut self, task_id: &str, patch: &TaskPatch) -> TasksResult<Task> {
        let task = match self.storage.update_task(task_id, patch).await? {
            Some(task) => task,
            None => {
                // No echo from the store; merge the patch into what we know
                let mut task = self.current(task_id).await?;
                task.apply_patch(patch);
                task
            }
        };
        self.reconcile(task.clone());
        Ok(task)
    }

    fn reconcile(&mut self, task: Task) {
        match self.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(slot) => *slot = task,
            None => self.tasks.push(task),
        }
    }
}

fn not_found(task_id: &str) -> TasksError {
    TasksError::TaskNotFound {
        task_id: task_id.to_string(),
    }
}
