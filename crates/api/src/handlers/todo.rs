//! Handlers for the `/todos` resource.
//!
//! Input validation happens here (the repository validates nothing);
//! everything else forwards through the service facade.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use tasktrail_core::audit::{decode_detail, AuditDetail};
use tasktrail_core::error::CoreError;
use tasktrail_core::types::{DbId, DueDate, Timestamp};
use tasktrail_db::models::todo::{
    double_option, CreateTodo, DeleteAck, Todo, TodoWithAuditLogs, UpdateTodo,
};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request payloads
// ---------------------------------------------------------------------------

/// POST body for creating a todo.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTodoRequest {
    #[validate(length(min = 1, max = 255, message = "title must be 1-255 characters"))]
    pub title: String,
    pub due_date: Option<DueDate>,
}

/// PUT body for updating a todo.
///
/// A `done_flag` field in the body is tolerated and dropped during
/// deserialization; completion state only changes through the toggle
/// route.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTodoRequest {
    #[validate(length(min = 1, max = 255, message = "title must be 1-255 characters"))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<DueDate>>,
}

// ---------------------------------------------------------------------------
// CRUD handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/todos
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<TodoWithAuditLogs>>> {
    Ok(Json(state.service.get_all().await?))
}

/// POST /api/v1/todos
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateTodoRequest>,
) -> AppResult<(StatusCode, Json<Todo>)> {
    input.validate().map_err(bad_request)?;
    let todo = state
        .service
        .create(&CreateTodo {
            title: input.title,
            due_date: input.due_date,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

/// PUT /api/v1/todos/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTodoRequest>,
) -> AppResult<Json<Todo>> {
    input.validate().map_err(bad_request)?;
    let todo = state
        .service
        .update(
            id,
            &UpdateTodo {
                title: input.title,
                due_date: input.due_date,
            },
        )
        .await?;
    Ok(Json(todo))
}

/// DELETE /api/v1/todos/{id}
///
/// Forgiving by contract: deleting a missing or already-deleted id
/// still reports success.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DeleteAck>> {
    Ok(Json(state.service.delete(id).await?))
}

/// POST /api/v1/todos/{id}/toggle
pub async fn toggle(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<Json<Todo>> {
    Ok(Json(state.service.toggle(id).await?))
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// One decoded entry of a todo's audit trail.
#[derive(Debug, Serialize)]
pub struct HistoryEntry {
    pub id: DbId,
    pub created_at: Timestamp,
    #[serde(flatten)]
    pub detail: AuditDetail,
}

/// GET /api/v1/todos/{id}/history
///
/// Trails survive soft deletion, so this also serves deleted todos;
/// only ids that never existed yield 404.
pub async fn history(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<HistoryEntry>>> {
    let logs = state
        .service
        .history(id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Todo", id }))?;

    let entries = logs
        .iter()
        .map(|log| {
            let detail = decode_detail(
                &log.action,
                log.old_values.as_deref(),
                log.new_values.as_deref(),
            )
            .map_err(|err| {
                AppError::Internal(format!("Stored audit entry {} is undecodable: {err}", log.id))
            })?;
            Ok(HistoryEntry {
                id: log.id,
                created_at: log.created_at,
                detail,
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    Ok(Json(entries))
}

fn bad_request(errors: validator::ValidationErrors) -> AppError {
    AppError::BadRequest(errors.to_string())
}
