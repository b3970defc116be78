//! Audit log entity model.
//!
//! Rows are append-only and immutable once written; there is no
//! `updated_at` and no update DTO. The `old_values`/`new_values`
//! payloads are JSON-encoded text that the storage layer never parses.

use serde::Serialize;
use sqlx::FromRow;
use tasktrail_core::audit::AuditAction;
use tasktrail_core::types::{DbId, Timestamp};

/// A row from the `audit_logs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AuditLog {
    pub id: DbId,
    pub todo_id: DbId,
    pub action: String,
    pub old_values: Option<String>,
    pub new_values: Option<String>,
    pub created_at: Timestamp,
}

/// Fields for appending a new entry; `id` and `created_at` are assigned
/// by the store.
#[derive(Debug, Clone)]
pub struct NewAuditLog {
    pub todo_id: DbId,
    pub action: AuditAction,
    pub old_values: Option<String>,
    pub new_values: Option<String>,
}
