use std::sync::Arc;

use tasktrail_db::service::TodoService;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (the service holds its store behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Facade over the repository implementation injected at startup.
    pub service: TodoService,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Database connection pool; `None` when running on the in-memory
    /// store. Only the health check reads it.
    pub pool: Option<tasktrail_db::DbPool>,
}
