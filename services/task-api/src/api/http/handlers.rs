//! HTTP 处理器

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tasker_errors::{AppError, AppResult};
use tasker_telemetry::HealthStatus;
use tracing::{debug, warn};

use super::dto::{
    AccountResponse, LoginRequest, LoginResponse, MessageResponse, RegisterRequest, TaskListResponse,
    TaskRequest,
};
use super::extract::{ApiJson, CurrentIdentity, RequestCancellation};
use super::state::AppState;
use crate::error::AuthError;

pub const INVALID_CREDENTIALS: &str = "invalid credentials";

/// POST /register
pub async fn register(
    State(state): State<AppState>,
    RequestCancellation(cancel): RequestCancellation,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> AppResult<Json<AccountResponse>> {
    let account = state.accounts.create_account(&cancel, req.into()).await?;
    Ok(Json(AccountResponse::from(&account)))
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    RequestCancellation(cancel): RequestCancellation,
    ApiJson(req): ApiJson<LoginRequest>,
) -> AppResult<(StatusCode, Json<LoginResponse>)> {
    let (account, token) = state
        .accounts
        .authenticate(&cancel, &req.username, &req.password)
        .await
        .map_err(|e| login_error(e, state.unify_login_errors))?;

    Ok((
        StatusCode::ACCEPTED,
        Json(LoginResponse {
            token,
            user: AccountResponse::from(&account),
        }),
    ))
}

fn login_error(err: AuthError, unify: bool) -> AppError {
    if unify && err.is_credential_failure() {
        return AppError::unauthorized(INVALID_CREDENTIALS);
    }
    err.into()
}

/// GET /tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    RequestCancellation(cancel): RequestCancellation,
    CurrentIdentity(identity): CurrentIdentity,
) -> AppResult<Json<TaskListResponse>> {
    let tasks = state.tasks.list(&cancel).await?;
    debug!(account_id = %identity.account_id, count = tasks.len(), "Tasks listed");
    Ok(Json(TaskListResponse { tasks }))
}

/// GET /tasks/{id}
pub async fn get_task(
    State(state): State<AppState>,
    RequestCancellation(cancel): RequestCancellation,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let task = state.tasks.get(&cancel, &id).await?;
    Ok(Json(task))
}

/// POST /admin/tasks
pub async fn create_task(
    State(state): State<AppState>,
    RequestCancellation(cancel): RequestCancellation,
    ApiJson(req): ApiJson<TaskRequest>,
) -> AppResult<impl IntoResponse> {
    let draft = req.into_draft()?;
    let task = state.tasks.create(&cancel, draft).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// PUT /admin/tasks/{id}
pub async fn update_task(
    State(state): State<AppState>,
    RequestCancellation(cancel): RequestCancellation,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<TaskRequest>,
) -> AppResult<impl IntoResponse> {
    let draft = req.into_draft()?;
    let task = state.tasks.update(&cancel, &id, draft).await?;
    Ok(Json(task))
}

/// DELETE /admin/tasks/{id}
pub async fn delete_task(
    State(state): State<AppState>,
    RequestCancellation(cancel): RequestCancellation,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    state.tasks.delete(&cancel, &id).await?;
    Ok(Json(MessageResponse::new("deleted successfully")))
}

/// PUT /admin/promote/{id}
pub async fn promote(
    State(state): State<AppState>,
    RequestCancellation(cancel): RequestCancellation,
    CurrentIdentity(identity): CurrentIdentity,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    state.accounts.promote(&cancel, &id).await?;
    debug!(promoted_by = %identity.account_id, account_id = %id, "Promotion applied");
    Ok(Json(MessageResponse::new("promoted to admin")))
}

/// GET /health
pub async fn health(
    State(state): State<AppState>,
    RequestCancellation(cancel): RequestCancellation,
) -> impl IntoResponse {
    let mut status = HealthStatus::new();
    match state.accounts.storage_ready(&cancel).await {
        Ok(()) => status.add_check("storage", true, None),
        Err(e) => {
            warn!(error = %e, "Storage health check failed");
            status.add_check("storage", false, Some(e.to_body().error));
        }
    }

    let code = if status.healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(status))
}

/// GET /metrics
pub async fn metrics(State(state): State<AppState>) -> String {
    state
        .metrics
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default()
}
