//! Repository layer.
//!
//! [`TodoStore`] is the storage-agnostic operation contract. The
//! Postgres and in-memory implementations are interchangeable; the
//! composition root picks one at startup and injects it behind
//! `Arc<dyn TodoStore>`.

pub mod memory_repo;
pub mod todo_repo;

use async_trait::async_trait;
use tasktrail_core::error::CoreError;
use tasktrail_core::types::DbId;

use crate::models::audit::AuditLog;
use crate::models::todo::{CreateTodo, DeleteAck, Todo, TodoWithAuditLogs, UpdateTodo};

pub use memory_repo::InMemoryTodoRepo;
pub use todo_repo::PgTodoRepo;

/// Errors surfaced by repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// Domain-level failure (the soft-delete gate).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Failure from the underlying store, propagated unchanged.
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    /// An audit snapshot failed to serialize.
    #[error("Failed to encode audit snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
}

impl RepoError {
    /// The error every mutation gate raises for a missing or
    /// soft-deleted target.
    pub(crate) fn todo_gone() -> Self {
        RepoError::Core(CoreError::NotFoundOrDeleted { entity: "Todo" })
    }
}

/// Storage-agnostic contract for todo persistence.
///
/// Every mutation appends exactly one audit entry as part of the same
/// unit of work; failed operations append nothing.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// All live todos, newest first, each joined with its audit trail
    /// (newest entry first). An empty store yields an empty list.
    async fn get_all(&self) -> Result<Vec<TodoWithAuditLogs>, RepoError>;

    /// Insert a todo (`done_flag = false`, live) plus its CREATE entry.
    async fn create(&self, input: &CreateTodo) -> Result<Todo, RepoError>;

    /// Apply the provided fields to a live todo, refresh `updated_at`,
    /// and append an UPDATE entry with full before/after snapshots.
    /// Fails with [`CoreError::NotFoundOrDeleted`] when the id is
    /// missing or soft-deleted, writing nothing.
    async fn update(&self, id: DbId, input: &UpdateTodo) -> Result<Todo, RepoError>;

    /// Soft-delete a live todo and append a DELETE entry. Deleting a
    /// missing or already-deleted id succeeds without writing anything.
    async fn delete(&self, id: DbId) -> Result<DeleteAck, RepoError>;

    /// Flip `done_flag` on a live todo, refresh `updated_at`, and
    /// append a TOGGLE entry with flag-only snapshots. Same gate as
    /// [`TodoStore::update`].
    async fn toggle(&self, id: DbId) -> Result<Todo, RepoError>;

    /// Audit trail for one todo, newest first, regardless of its
    /// deletion state. `None` when no such todo row has ever existed.
    async fn history(&self, id: DbId) -> Result<Option<Vec<AuditLog>>, RepoError>;
}
