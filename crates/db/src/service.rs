//! Thin pass-through facade over the repository contract.
//!
//! Exists so the transport layer depends on one stable type while the
//! concrete store (Postgres or in-memory) is chosen once at the
//! composition root. Every method forwards verbatim; no logic lives
//! here.

use std::sync::Arc;

use tasktrail_core::types::DbId;

use crate::models::audit::AuditLog;
use crate::models::todo::{CreateTodo, DeleteAck, Todo, TodoWithAuditLogs, UpdateTodo};
use crate::repositories::{RepoError, TodoStore};

#[derive(Clone)]
pub struct TodoService {
    store: Arc<dyn TodoStore>,
}

impl TodoService {
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self { store }
    }

    pub async fn get_all(&self) -> Result<Vec<TodoWithAuditLogs>, RepoError> {
        self.store.get_all().await
    }

    pub async fn create(&self, input: &CreateTodo) -> Result<Todo, RepoError> {
        self.store.create(input).await
    }

    pub async fn update(&self, id: DbId, input: &UpdateTodo) -> Result<Todo, RepoError> {
        self.store.update(id, input).await
    }

    pub async fn delete(&self, id: DbId) -> Result<DeleteAck, RepoError> {
        self.store.delete(id).await
    }

    pub async fn toggle(&self, id: DbId) -> Result<Todo, RepoError> {
        self.store.toggle(id).await
    }

    pub async fn history(&self, id: DbId) -> Result<Option<Vec<AuditLog>>, RepoError> {
        self.store.history(id).await
    }
}
