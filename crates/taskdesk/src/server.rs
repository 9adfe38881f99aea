//! HTTP server for the task board.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tasks::{Authenticator, Storage, TaskBoard, TaskExtractor, User};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::error::ApiResult;
use crate::handlers::{auth, extract, tasks as task_handlers, views};
use crate::session::AccessToken;

/// Largest accepted request body.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Shared application state.
///
/// Holds only collaborators; no per-user data survives a request.
#[derive(Clone)]
pub struct AppState {
    /// Task store, scoped per request to the caller's token.
    pub storage: Arc<dyn Storage>,
    /// Identity provider.
    pub auth: Arc<dyn Authenticator>,
    /// Extraction pipeline.
    pub extractor: Arc<TaskExtractor>,
}

impl AppState {
    pub fn new(
        storage: Arc<dyn Storage>,
        auth: Arc<dyn Authenticator>,
        extractor: Arc<TaskExtractor>,
    ) -> Self {
        Self {
            storage,
            auth,
            extractor,
        }
    }

    /// Resolve the caller and open a board over their view of the store.
    pub async fn board_for(&self, token: &AccessToken) -> ApiResult<(User, TaskBoard)> {
        let user = self.auth.current_user(token.as_str()).await?;
        let board = TaskBoard::new(self.storage.scoped(token.as_str(), &user.email));
        Ok((user, board))
    }
}

/// Build the HTTP router.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        // Extraction
        .route("/api/extract-tasks", post(extract::extract_tasks))
        // Authentication
        .route("/api/auth/sign-in", post(auth::sign_in))
        .route("/api/auth/sign-up", post(auth::sign_up))
        .route("/api/auth/sign-out", post(auth::sign_out))
        .route("/api/auth/user", get(auth::current_user))
        // Tasks
        .route(
            "/api/tasks",
            get(task_handlers::list_tasks).post(task_handlers::create_task),
        )
        .route("/api/tasks/bulk", post(task_handlers::create_tasks))
        .route(
            "/api/tasks/{id}",
            get(task_handlers::get_task)
                .patch(task_handlers::update_task)
                .delete(task_handlers::delete_task),
        )
        .route("/api/tasks/{id}/complete", post(task_handlers::complete_task))
        .route("/api/tasks/{id}/move", post(task_handlers::move_task))
        // Views
        .route("/api/views/overview", get(views::overview))
        .route("/api/views/kanban", get(views::kanban))
        .route("/api/views/calendar", get(views::calendar))
        .route("/api/views/reports", get(views::report))
        .route("/api/views/reports/export", get(views::export_report))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Start the HTTP server.
pub async fn run_server(state: AppState, addr: &str) -> Result<()> {
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;
    info!(%addr, "Taskdesk listening");

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Health check response.
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    storage: &'static str,
    extraction_model: String,
}

async fn health_handler(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        storage: state.storage.storage_type(),
        extraction_model: state.extractor.model().to_string(),
    })
}
