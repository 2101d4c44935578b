// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Task handlers.
//!
//! Each route is wrapped in an authorization guard; by the time a handler
//! runs, the caller holds the permission for its operation.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::error::ApiResult;
use crate::extractors::{Auth, ValidatedJson};
use crate::response::{MessageResponse, TaskResponse};
use crate::state::AppState;
use crate::tasks::{NewTask, TaskChanges};

/// GET /api/tasks
pub async fn list_tasks(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let tasks: Vec<TaskResponse> = state
        .tasks
        .list()
        .await?
        .into_iter()
        .map(TaskResponse::from)
        .collect();
    Ok(Json(tasks))
}

/// POST /api/tasks
pub async fn create_task(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    ValidatedJson(input): ValidatedJson<NewTask>,
) -> ApiResult<impl IntoResponse> {
    let task = state.tasks.create(input).await?;
    tracing::debug!(user_id = %ctx.user_id, task_id = %task.id, "Task created by user");
    Ok((StatusCode::CREATED, Json(TaskResponse::from(task))))
}

/// PUT /api/tasks/{id}
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(changes): ValidatedJson<TaskChanges>,
) -> ApiResult<impl IntoResponse> {
    let task = state.tasks.update(&id, changes).await?;
    Ok(Json(TaskResponse::from(task)))
}

/// DELETE /api/tasks/{id}
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    state.tasks.delete(&id).await?;
    Ok(Json(MessageResponse::new("Task deleted")))
}
