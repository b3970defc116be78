use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tasktrail_core::error::CoreError;
use tasktrail_db::repositories::RepoError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] / [`RepoError`] for domain and storage errors
/// and adds HTTP-specific variants. Implements [`IntoResponse`] to
/// produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error raised directly by a handler.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A repository error (domain gate or storage failure).
    #[error(transparent)]
    Repo(#[from] RepoError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => classify_core_error(core),
            AppError::Repo(err) => classify_repo_error(err),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Map a domain error to an HTTP status, error code, and message.
fn classify_core_error(err: &CoreError) -> (StatusCode, &'static str, String) {
    match err {
        // The message intentionally names both possibilities; callers
        // cannot tell a missing row from a soft-deleted one.
        CoreError::NotFoundOrDeleted { .. } => {
            (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string())
        }
        CoreError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string()),
    }
}

/// Map a repository error, keeping storage failures sanitized.
fn classify_repo_error(err: &RepoError) -> (StatusCode, &'static str, String) {
    match err {
        RepoError::Core(core) => classify_core_error(core),
        RepoError::Database(err) => classify_sqlx_error(err),
        RepoError::Snapshot(err) => {
            tracing::error!(error = %err, "Audit snapshot encoding failed");
            internal()
        }
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404 (the row vanished between the gate and
///   the write).
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        other => {
            tracing::error!(error = %other, "Database error");
            internal()
        }
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}
