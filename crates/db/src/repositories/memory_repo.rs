//! In-memory [`TodoStore`] for local runs and tests without a database.
//!
//! Same contract as the Postgres repository: soft-delete gate, one
//! audit entry per mutation, newest-first ordering, identical snapshot
//! payloads. State is process-local behind a mutex; each operation
//! holds the lock for its whole read-modify-write, but there are no
//! cross-operation ordering guarantees, matching the persistent
//! variant.

use async_trait::async_trait;
use chrono::Utc;
use tasktrail_core::audit::{AuditAction, DoneSnapshot};
use tasktrail_core::types::DbId;
use tokio::sync::Mutex;

use crate::models::audit::{AuditLog, NewAuditLog};
use crate::models::todo::{CreateTodo, DeleteAck, Todo, TodoWithAuditLogs, UpdateTodo};
use crate::repositories::{RepoError, TodoStore};

#[derive(Default)]
struct MemState {
    /// Insertion order is creation order; ids are monotonic.
    todos: Vec<Todo>,
    /// Append order is audit order.
    audit_logs: Vec<AuditLog>,
    next_todo_id: DbId,
    next_audit_id: DbId,
}

impl MemState {
    fn append_audit(&mut self, entry: NewAuditLog) {
        self.next_audit_id += 1;
        self.audit_logs.push(AuditLog {
            id: self.next_audit_id,
            todo_id: entry.todo_id,
            action: entry.action.as_str().to_string(),
            old_values: entry.old_values,
            new_values: entry.new_values,
            created_at: Utc::now(),
        });
    }

    fn find_live_mut(&mut self, id: DbId) -> Result<&mut Todo, RepoError> {
        match self.todos.iter_mut().find(|t| t.id == id) {
            Some(todo) if todo.deleted_at.is_none() => Ok(todo),
            _ => Err(RepoError::todo_gone()),
        }
    }
}

/// Process-local [`TodoStore`]; drop-in substitute for
/// [`super::PgTodoRepo`].
#[derive(Default)]
pub struct InMemoryTodoRepo {
    state: Mutex<MemState>,
}

impl InMemoryTodoRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TodoStore for InMemoryTodoRepo {
    async fn get_all(&self) -> Result<Vec<TodoWithAuditLogs>, RepoError> {
        let state = self.state.lock().await;
        Ok(state
            .todos
            .iter()
            .rev()
            .filter(|todo| todo.deleted_at.is_none())
            .map(|todo| TodoWithAuditLogs {
                todo: todo.clone(),
                audit_logs: state
                    .audit_logs
                    .iter()
                    .rev()
                    .filter(|log| log.todo_id == todo.id)
                    .cloned()
                    .collect(),
            })
            .collect())
    }

    async fn create(&self, input: &CreateTodo) -> Result<Todo, RepoError> {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        state.next_todo_id += 1;
        let todo = Todo {
            id: state.next_todo_id,
            title: input.title.clone(),
            due_date: input.due_date,
            done_flag: false,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        state.todos.push(todo.clone());

        let new_values = serde_json::to_string(&todo.snapshot())?;
        state.append_audit(NewAuditLog {
            todo_id: todo.id,
            action: AuditAction::Create,
            old_values: None,
            new_values: Some(new_values),
        });
        Ok(todo)
    }

    async fn update(&self, id: DbId, input: &UpdateTodo) -> Result<Todo, RepoError> {
        let mut state = self.state.lock().await;

        let todo = state.find_live_mut(id)?;
        let old_values = serde_json::to_string(&todo.snapshot())?;

        if let Some(title) = &input.title {
            todo.title = title.clone();
        }
        if let Some(patch) = input.due_date {
            todo.due_date = patch;
        }
        todo.updated_at = Utc::now();

        let updated = todo.clone();
        let new_values = serde_json::to_string(&updated.snapshot())?;

        state.append_audit(NewAuditLog {
            todo_id: id,
            action: AuditAction::Update,
            old_values: Some(old_values),
            new_values: Some(new_values),
        });
        Ok(updated)
    }

    async fn delete(&self, id: DbId) -> Result<DeleteAck, RepoError> {
        let mut state = self.state.lock().await;

        // Missing and already-deleted rows are both vacuous successes.
        let Ok(todo) = state.find_live_mut(id) else {
            return Ok(DeleteAck { success: true });
        };

        let old_values = serde_json::to_string(&todo.snapshot())?;
        // Delete stamps deleted_at only; updated_at stays as it was.
        todo.deleted_at = Some(Utc::now());

        state.append_audit(NewAuditLog {
            todo_id: id,
            action: AuditAction::Delete,
            old_values: Some(old_values),
            new_values: None,
        });
        Ok(DeleteAck { success: true })
    }

    async fn toggle(&self, id: DbId) -> Result<Todo, RepoError> {
        let mut state = self.state.lock().await;

        let todo = state.find_live_mut(id)?;
        let before = DoneSnapshot {
            done_flag: todo.done_flag,
        };
        todo.done_flag = !todo.done_flag;
        todo.updated_at = Utc::now();
        let after = DoneSnapshot {
            done_flag: todo.done_flag,
        };
        let updated = todo.clone();

        state.append_audit(NewAuditLog {
            todo_id: id,
            action: AuditAction::Toggle,
            old_values: Some(serde_json::to_string(&before)?),
            new_values: Some(serde_json::to_string(&after)?),
        });
        Ok(updated)
    }

    async fn history(&self, id: DbId) -> Result<Option<Vec<AuditLog>>, RepoError> {
        let state = self.state.lock().await;
        if !state.todos.iter().any(|t| t.id == id) {
            return Ok(None);
        }
        Ok(Some(
            state
                .audit_logs
                .iter()
                .rev()
                .filter(|log| log.todo_id == id)
                .cloned()
                .collect(),
        ))
    }
}
