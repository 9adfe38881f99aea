//! Task CRUD and lifecycle endpoints.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tasks::{Task, TaskDraft, TaskPatch, TaskStatus};

use crate::error::{ApiError, ApiResult};
use crate::server::AppState;
use crate::session::AccessToken;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteRequest {
    pub hours_spent: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    pub status: TaskStatus,
    #[serde(default)]
    pub hours_spent: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct BulkCreateRequest {
    pub tasks: Vec<TaskDraft>,
}

#[derive(Debug, Serialize)]
pub struct TaskList {
    pub tasks: Vec<Task>,
}

/// `GET /api/tasks`, newest first.
pub async fn list_tasks(
    State(state): State<AppState>,
    token: AccessToken,
) -> ApiResult<Json<TaskList>> {
    let (_user, mut board) = state.board_for(&token).await?;
    Ok(Json(TaskList {
        tasks: board.list_tasks().await?,
    }))
}

/// `POST /api/tasks`
pub async fn create_task(
    State(state): State<AppState>,
    token: AccessToken,
    body: Result<Json<TaskDraft>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let Json(draft) = body?;
    let (user, mut board) = state.board_for(&token).await?;
    let task = board.create_task(draft, &user.email).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// `POST /api/tasks/bulk`: import extracted drafts; failed drafts are skipped.
pub async fn create_tasks(
    State(state): State<AppState>,
    token: AccessToken,
    body: Result<Json<BulkCreateRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TaskList>)> {
    let Json(request) = body?;
    if request.tasks.is_empty() {
        return Err(ApiError::bad_request("No tasks to create"));
    }
    let (user, mut board) = state.board_for(&token).await?;
    let tasks = board.create_tasks(request.tasks, &user.email).await;
    Ok((StatusCode::CREATED, Json(TaskList { tasks })))
}

/// `GET /api/tasks/{id}`
pub async fn get_task(
    State(state): State<AppState>,
    token: AccessToken,
    Path(id): Path<String>,
) -> ApiResult<Json<Task>> {
    let (_user, board) = state.board_for(&token).await?;
    Ok(Json(board.get_task(&id).await?))
}

/// `PATCH /api/tasks/{id}`
pub async fn update_task(
    State(state): State<AppState>,
    token: AccessToken,
    Path(id): Path<String>,
    body: Result<Json<TaskPatch>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let Json(patch) = body?;
    if patch.is_empty() {
        return Err(ApiError::bad_request("Nothing to update"));
    }
    let (_user, mut board) = state.board_for(&token).await?;
    Ok(Json(board.update_task(&id, patch).await?))
}

/// `DELETE /api/tasks/{id}`
pub async fn delete_task(
    State(state): State<AppState>,
    token: AccessToken,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let (_user, mut board) = state.board_for(&token).await?;
    board.delete_task(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/tasks/{id}/complete`
pub async fn complete_task(
    State(state): State<AppState>,
    token: AccessToken,
    Path(id): Path<String>,
    body: Result<Json<CompleteRequest>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let Json(request) = body?;
    let (_user, mut board) = state.board_for(&token).await?;
    Ok(Json(board.complete_task(&id, request.hours_spent).await?))
}

/// `POST /api/tasks/{id}/move`
pub async fn move_task(
    State(state): State<AppState>,
    token: AccessToken,
    Path(id): Path<String>,
    body: Result<Json<MoveRequest>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let Json(request) = body?;
    let (_user, mut board) = state.board_for(&token).await?;
    Ok(Json(
        board
            .move_task(&id, request.status, request.hours_spent)
            .await?,
    ))
}
