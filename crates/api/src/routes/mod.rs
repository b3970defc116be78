pub mod health;
pub mod todo;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /todos                 GET list, POST create
/// /todos/{id}            PUT update, DELETE delete (soft, idempotent)
/// /todos/{id}/toggle     POST toggle completion
/// /todos/{id}/history    GET decoded audit trail
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/todos", todo::router())
}
