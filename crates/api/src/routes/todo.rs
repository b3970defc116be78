//! Route definitions for the `/todos` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::todo;
use crate::state::AppState;

/// Routes mounted at `/todos`.
///
/// ```text
/// GET    /              -> list (todos with audit trails)
/// POST   /              -> create
/// PUT    /{id}          -> update
/// DELETE /{id}          -> delete
/// POST   /{id}/toggle   -> toggle
/// GET    /{id}/history  -> history (decoded audit trail)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(todo::list).post(todo::create))
        .route("/{id}", put(todo::update).delete(todo::delete))
        .route("/{id}/toggle", post(todo::toggle))
        .route("/{id}/history", get(todo::history))
}
