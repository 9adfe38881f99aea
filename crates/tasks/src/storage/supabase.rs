//! PostgREST-backed storage for the `tasks` table of a Supabase project.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use tracing::{debug, instrument, warn};

use super::rows::{NewTaskRow, TaskRow, TaskRowPatch};
use super::traits::{NewTask, Storage};
use crate::entities::{Task, TaskPatch};
use crate::errors::{TasksError, TasksResult};
use crate::supabase::{error_message, SupabaseConfig, SERVICE};

/// Table holding task rows
const TASKS_TABLE: &str = "rest/v1/tasks";

/// Supabase storage.
///
/// Requests always carry the project's anon key; when scoped to a session they
/// also carry the user's access token so row-level security applies.
#[derive(Debug, Clone)]
pub struct SupabaseStorage {
    client: Client,
    config: SupabaseConfig,
    access_token: Option<String>,
}

impl SupabaseStorage {
    pub fn new(config: SupabaseConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    /// Share an existing HTTP client (connection pool) with other gateways.
    pub fn with_client(client: Client, config: SupabaseConfig) -> Self {
        if !config.is_configured() {
            warn!("Supabase storage created without URL or anon key; task calls will fail");
        }
        Self {
            client,
            config,
            access_token: None,
        }
    }

    fn request(&self, method: Method, query: &[(&str, String)]) -> TasksResult<RequestBuilder> {
        let config = self.config.require()?;
        let bearer = self.access_token.as_deref().unwrap_or(&config.anon_key);

        Ok(self
            .client
            .request(method, config.endpoint(TASKS_TABLE))
            .query(query)
            .header("apikey", &config.anon_key)
            .header(AUTHORIZATION, format!("Bearer {bearer}"))
            .header(ACCEPT, "application/json"))
    }

    /// Send and decode a row list. `None` means the store answered without a body.
    async fn send(&self, request: RequestBuilder) -> TasksResult<Option<Vec<TaskRow>>> {
        let response = request
            .send()
            .await
            .map_err(|e| TasksError::provider(SERVICE, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TasksError::provider(SERVICE, format!("failed to read response: {e}")))?;

        if status == StatusCode::UNAUTHORIZED {
            return Err(TasksError::Unauthorized);
        }
        if !status.is_success() {
            return Err(TasksError::provider(
                SERVICE,
                format!("{status}: {}", error_message(&body)),
            ));
        }
        if body.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&body)
            .map(Some)
            .map_err(|e| TasksError::provider(SERVICE, format!("unexpected response: {e}")))
    }

    fn id_filter(task_id: &str) -> (&'static str, String) {
        ("id", format!("eq.{task_id}"))
    }

    fn not_found(task_id: &str) -> TasksError {
        TasksError::TaskNotFound {
            task_id: task_id.to_string(),
        }
    }
}

#[async_trait]
impl Storage for SupabaseStorage {
    fn storage_type(&self) -> &'static str {
        "supabase"
    }

    // Row-level security keys rows to the token's user
    fn scoped(&self, access_token: &str, _owner_email: &str) -> Arc<dyn Storage> {
        Arc::new(Self {
            client: self.client.clone(),
            config: self.config.clone(),
            access_token: Some(access_token.to_string()),
        })
    }

    #[instrument(skip(self))]
    async fn load_tasks(&self) -> TasksResult<Vec<Task>> {
        let request = self.request(
            Method::GET,
            &[
                ("select", "*".to_string()),
                ("order", "created_at.desc".to_string()),
            ],
        )?;

        let rows = self.send(request).await?.unwrap_or_default();
        debug!(count = rows.len(), "Loaded tasks");
        Ok(rows.into_iter().map(Task::from).collect())
    }

    #[instrument(skip(self))]
    async fn load_task(&self, task_id: &str) -> TasksResult<Option<Task>> {
        let request = self.request(
            Method::GET,
            &[("select", "*".to_string()), Self::id_filter(task_id)],
        )?;

        let rows = self.send(request).await?.unwrap_or_default();
        Ok(rows.into_iter().next().map(Task::from))
    }

    #[instrument(skip(self, task), fields(title = %task.title))]
    async fn add_task(&self, task: NewTask) -> TasksResult<Task> {
        let request = self
            .request(Method::POST, &[("select", "*".to_string())])?
            .header(CONTENT_TYPE, "application/json")
            .header("Prefer", "return=representation")
            .json(&NewTaskRow::from(task));

        let row = self
            .send(request)
            .await?
            .and_then(|rows| rows.into_iter().next())
            .ok_or_else(|| TasksError::provider(SERVICE, "insert returned no row"))?;

        debug!(task_id = %row.id, "Created task");
        Ok(Task::from(row))
    }

    #[instrument(skip(self, patch))]
    async fn update_task(&self, task_id: &str, patch: &TaskPatch) -> TasksResult<Option<Task>> {
        let request = self
            .request(
                Method::PATCH,
                &[("select", "*".to_string()), Self::id_filter(task_id)],
            )?
            .header(CONTENT_TYPE, "application/json")
            .header("Prefer", "return=representation")
            .json(&TaskRowPatch::from(patch));

        match self.send(request).await? {
            None => Ok(None),
            Some(rows) => rows
                .into_iter()
                .next()
                .map(|row| Some(Task::from(row)))
                .ok_or_else(|| Self::not_found(task_id)),
        }
    }

    #[instrument(skip(self))]
    async fn delete_task(&self, task_id: &str) -> TasksResult<()> {
        let request = self
            .request(Method::DELETE, &[Self::id_filter(task_id)])?
            .header("Prefer", "return=representation");

        // An empty representation means nothing matched the filter
        let deleted = self.send(request).await?.map_or(0, |rows| rows.len());
        if deleted == 0 {
            return Err(Self::not_found(task_id));
        }
        debug!(task_id, "Deleted task");
        Ok(())
    }
}
