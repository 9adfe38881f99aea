//! Task extraction endpoint.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tasks::{TaskDraft, TasksError};
use tracing::{error, warn};

use crate::error::{ApiError, ApiResult};
use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    #[serde(default)]
    pub content: Option<Value>,
}

impl ExtractRequest {
    /// Prompt text for the content field.
    ///
    /// Absent, null, `false`, `0` and `""` count as missing; other
    /// non-string values are sent as their JSON text.
    fn content_text(self) -> String {
        match self.content {
            None | Some(Value::Null | Value::Bool(false)) => String::new(),
            Some(Value::String(text)) => text,
            Some(Value::Number(n)) if n.as_f64() == Some(0.0) => String::new(),
            Some(other) => other.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub tasks: Vec<TaskDraft>,
}

/// `POST /api/extract-tasks`
///
/// 400 for missing content, 500 for anything else that goes wrong.
pub async fn extract_tasks(
    State(state): State<AppState>,
    body: Result<Json<ExtractRequest>, JsonRejection>,
) -> ApiResult<Json<ExtractResponse>> {
    let Json(request) = body.map_err(|e| {
        warn!(error = %e, "Unreadable extraction request");
        ApiError::Extraction
    })?;

    let content = request.content_text();
    match state.extractor.extract(&content).await {
        Ok(tasks) => Ok(Json(ExtractResponse { tasks })),
        Err(e @ TasksError::Validation { .. }) => Err(ApiError::bad_request(e.to_string())),
        Err(e) => {
            error!(
                error = %e,
                provider = state.extractor.provider_name(),
                "Error extracting tasks"
            );
            Err(ApiError::Extraction)
        }
    }
}
