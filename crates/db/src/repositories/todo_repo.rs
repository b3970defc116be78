//! Postgres repository for the `todos` and `audit_logs` tables.
//!
//! Sole writer of both tables. Each mutation pairs its todo write with
//! one audit insert inside a single transaction, so a crash cannot
//! separate a mutation from its ledger entry. Update/toggle/delete read
//! the row first: the read enforces the soft-delete gate and captures
//! the "before" snapshot. The read and the write are not serialized
//! against concurrent callers (no row lock, no version column):
//! simultaneous mutations of one id are last-write-wins, each still
//! appending its own audit entry.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tasktrail_core::audit::{AuditAction, DoneSnapshot};
use tasktrail_core::types::DbId;

use crate::models::audit::{AuditLog, NewAuditLog};
use crate::models::todo::{CreateTodo, DeleteAck, Todo, TodoWithAuditLogs, UpdateTodo};
use crate::repositories::{RepoError, TodoStore};

/// Column list shared across `todos` queries.
const TODO_COLUMNS: &str = "id, title, due_date, done_flag, created_at, updated_at, deleted_at";

/// Column list shared across `audit_logs` queries.
const AUDIT_COLUMNS: &str = "id, todo_id, action, old_values, new_values, created_at";

/// Postgres-backed [`TodoStore`].
#[derive(Clone)]
pub struct PgTodoRepo {
    pool: PgPool,
}

impl PgTodoRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TodoStore for PgTodoRepo {
    async fn get_all(&self) -> Result<Vec<TodoWithAuditLogs>, RepoError> {
        let query = format!(
            "SELECT {TODO_COLUMNS} FROM todos
             WHERE deleted_at IS NULL
             ORDER BY created_at DESC, id DESC"
        );
        let todos: Vec<Todo> = sqlx::query_as(&query).fetch_all(&self.pool).await?;

        // One fan-out query for every trail instead of one per todo.
        let ids: Vec<DbId> = todos.iter().map(|t| t.id).collect();
        let query = format!(
            "SELECT {AUDIT_COLUMNS} FROM audit_logs
             WHERE todo_id = ANY($1)
             ORDER BY created_at DESC, id DESC"
        );
        let logs: Vec<AuditLog> = sqlx::query_as(&query)
            .bind(&ids)
            .fetch_all(&self.pool)
            .await?;

        let mut grouped: std::collections::HashMap<DbId, Vec<AuditLog>> =
            std::collections::HashMap::new();
        for log in logs {
            grouped.entry(log.todo_id).or_default().push(log);
        }

        Ok(todos
            .into_iter()
            .map(|todo| {
                let audit_logs = grouped.remove(&todo.id).unwrap_or_default();
                TodoWithAuditLogs { todo, audit_logs }
            })
            .collect())
    }

    async fn create(&self, input: &CreateTodo) -> Result<Todo, RepoError> {
        let mut tx = self.pool.begin().await?;

        let query =
            format!("INSERT INTO todos (title, due_date) VALUES ($1, $2) RETURNING {TODO_COLUMNS}");
        let todo: Todo = sqlx::query_as(&query)
            .bind(&input.title)
            .bind(input.due_date)
            .fetch_one(&mut *tx)
            .await?;

        append_audit(
            &mut tx,
            &NewAuditLog {
                todo_id: todo.id,
                action: AuditAction::Create,
                old_values: None,
                new_values: Some(serde_json::to_string(&todo.snapshot())?),
            },
        )
        .await?;

        tx.commit().await?;
        tracing::debug!(id = todo.id, "created todo");
        Ok(todo)
    }

    async fn update(&self, id: DbId, input: &UpdateTodo) -> Result<Todo, RepoError> {
        let mut tx = self.pool.begin().await?;

        let existing = match find_any(&mut tx, id).await? {
            Some(todo) if todo.deleted_at.is_none() => todo,
            _ => return Err(RepoError::todo_gone()),
        };

        // Resolve the partial patch against the stored row. The
        // double-wrapped due_date keeps, clears, or replaces.
        let title = input.title.as_deref().unwrap_or(&existing.title);
        let due_date = match input.due_date {
            Some(patch) => patch,
            None => existing.due_date,
        };

        let query = format!(
            "UPDATE todos SET title = $2, due_date = $3, updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {TODO_COLUMNS}"
        );
        let updated: Todo = sqlx::query_as(&query)
            .bind(id)
            .bind(title)
            .bind(due_date)
            .fetch_one(&mut *tx)
            .await?;

        append_audit(
            &mut tx,
            &NewAuditLog {
                todo_id: id,
                action: AuditAction::Update,
                old_values: Some(serde_json::to_string(&existing.snapshot())?),
                new_values: Some(serde_json::to_string(&updated.snapshot())?),
            },
        )
        .await?;

        tx.commit().await?;
        tracing::debug!(id, "updated todo");
        Ok(updated)
    }

    async fn delete(&self, id: DbId) -> Result<DeleteAck, RepoError> {
        let mut tx = self.pool.begin().await?;

        // Missing and already-deleted rows are both vacuous successes:
        // no re-stamped deleted_at, no duplicate audit entry.
        let existing = match find_any(&mut tx, id).await? {
            Some(todo) if todo.deleted_at.is_none() => todo,
            _ => return Ok(DeleteAck { success: true }),
        };

        sqlx::query("UPDATE todos SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        append_audit(
            &mut tx,
            &NewAuditLog {
                todo_id: id,
                action: AuditAction::Delete,
                old_values: Some(serde_json::to_string(&existing.snapshot())?),
                new_values: None,
            },
        )
        .await?;

        tx.commit().await?;
        tracing::debug!(id, "soft-deleted todo");
        Ok(DeleteAck { success: true })
    }

    async fn toggle(&self, id: DbId) -> Result<Todo, RepoError> {
        let mut tx = self.pool.begin().await?;

        let existing = match find_any(&mut tx, id).await? {
            Some(todo) if todo.deleted_at.is_none() => todo,
            _ => return Err(RepoError::todo_gone()),
        };

        let query = format!(
            "UPDATE todos SET done_flag = NOT done_flag, updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {TODO_COLUMNS}"
        );
        let updated: Todo = sqlx::query_as(&query).bind(id).fetch_one(&mut *tx).await?;

        append_audit(
            &mut tx,
            &NewAuditLog {
                todo_id: id,
                action: AuditAction::Toggle,
                old_values: Some(serde_json::to_string(&DoneSnapshot {
                    done_flag: existing.done_flag,
                })?),
                new_values: Some(serde_json::to_string(&DoneSnapshot {
                    done_flag: updated.done_flag,
                })?),
            },
        )
        .await?;

        tx.commit().await?;
        tracing::debug!(id, done = updated.done_flag, "toggled todo");
        Ok(updated)
    }

    async fn history(&self, id: DbId) -> Result<Option<Vec<AuditLog>>, RepoError> {
        let exists: Option<DbId> = sqlx::query_scalar("SELECT id FROM todos WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        if exists.is_none() {
            return Ok(None);
        }

        let query = format!(
            "SELECT {AUDIT_COLUMNS} FROM audit_logs
             WHERE todo_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        let logs = sqlx::query_as(&query).bind(id).fetch_all(&self.pool).await?;
        Ok(Some(logs))
    }
}

/// Fetch a row by id regardless of deletion state; the gate and the
/// "before" snapshot both need to see soft-deleted rows.
async fn find_any(
    tx: &mut Transaction<'_, Postgres>,
    id: DbId,
) -> Result<Option<Todo>, sqlx::Error> {
    let query = format!("SELECT {TODO_COLUMNS} FROM todos WHERE id = $1");
    sqlx::query_as(&query).bind(id).fetch_optional(&mut **tx).await
}

/// Append one immutable audit row inside the operation's transaction.
async fn append_audit(
    tx: &mut Transaction<'_, Postgres>,
    entry: &NewAuditLog,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO audit_logs (todo_id, action, old_values, new_values) VALUES ($1, $2, $3, $4)",
    )
    .bind(entry.todo_id)
    .bind(entry.action.as_str())
    .bind(&entry.old_values)
    .bind(&entry.new_values)
    .execute(&mut **tx)
    .await
    .map(|_| ())
}
