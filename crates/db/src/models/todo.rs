//! Todo entity model and DTOs.

use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use tasktrail_core::audit::TodoSnapshot;
use tasktrail_core::types::{DbId, DueDate, Timestamp};

use crate::models::audit::AuditLog;

/// A row from the `todos` table.
///
/// `deleted_at` being non-null means the row is logically gone: hidden
/// from default reads and rejected by update/toggle. `updated_at` is
/// refreshed by update and toggle but not by delete.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Todo {
    pub id: DbId,
    pub title: String,
    pub due_date: Option<DueDate>,
    pub done_flag: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

impl Todo {
    /// Capture the audited field triple as it currently stands.
    pub fn snapshot(&self) -> TodoSnapshot {
        TodoSnapshot {
            title: self.title.clone(),
            due_date: self.due_date,
            done_flag: self.done_flag,
        }
    }
}

/// A todo joined with its audit trail, newest entry first.
///
/// Assembled at query time; never stored.
#[derive(Debug, Clone, Serialize)]
pub struct TodoWithAuditLogs {
    #[serde(flatten)]
    pub todo: Todo,
    pub audit_logs: Vec<AuditLog>,
}

/// DTO for creating a new todo.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTodo {
    pub title: String,
    pub due_date: Option<DueDate>,
}

/// DTO for updating an existing todo.
///
/// `due_date` is double-wrapped: the outer `Option` distinguishes
/// "field absent, keep the stored value" from an explicit JSON `null`,
/// which clears the date. `done_flag` is deliberately not carried; the
/// flag only changes through toggle.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTodo {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<DueDate>>,
}

/// Deserialize a present field into `Some(..)` so that JSON `null`
/// becomes `Some(None)` while an absent field stays `None` through
/// `#[serde(default)]`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Acknowledgement returned by delete. Always `success: true`; deleting
/// a missing or already-deleted todo is vacuously successful.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DeleteAck {
    pub success: bool,
}
