//! Sign-in, sign-up and session endpoints.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tasks::{Session, User};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::server::AppState;
use crate::session::AccessToken;

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SignUpResponse {
    pub user: User,
    /// Absent until the email address is confirmed.
    pub session: Option<Session>,
}

fn require_credentials(email: &str, password: &str) -> ApiResult<()> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }
    Ok(())
}

/// `POST /api/auth/sign-in`
pub async fn sign_in(
    State(state): State<AppState>,
    body: Result<Json<SignInRequest>, JsonRejection>,
) -> ApiResult<Json<Session>> {
    let Json(request) = body?;
    require_credentials(&request.email, &request.password)?;
    let session = state
        .auth
        .sign_in(request.email.trim(), &request.password)
        .await?;
    Ok(Json(session))
}

/// `POST /api/auth/sign-up`
pub async fn sign_up(
    State(state): State<AppState>,
    body: Result<Json<SignUpRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SignUpResponse>)> {
    let Json(request) = body?;
    require_credentials(&request.email, &request.password)?;
    let registration = state
        .auth
        .sign_up(
            request.email.trim(),
            &request.password,
            request.name.as_deref(),
        )
        .await?;

    info!(user_id = %registration.user.id, "Account created");
    Ok((
        StatusCode::CREATED,
        Json(SignUpResponse {
            user: registration.user,
            session: registration.session,
        }),
    ))
}

/// `POST /api/auth/sign-out`
pub async fn sign_out(State(state): State<AppState>, token: AccessToken) -> ApiResult<StatusCode> {
    state.auth.sign_out(token.as_str()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/auth/user`
pub async fn current_user(
    State(state): State<AppState>,
    token: AccessToken,
) -> ApiResult<Json<User>> {
    Ok(Json(state.auth.current_user(token.as_str()).await?))
}
