//! Audit trail vocabulary: action names, snapshot payloads, and typed
//! decoding of stored payloads.
//!
//! The repository stores `old_values`/`new_values` as opaque JSON text
//! and never reads them back; which fields a snapshot carries depends on
//! the action, so display code decodes through [`AuditDetail`] rather
//! than a single fixed record shape.

use serde::{Deserialize, Serialize};

use crate::types::DueDate;

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// Action recorded by a single audit entry. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Create,
    Update,
    Toggle,
    Delete,
}

impl AuditAction {
    /// Storage representation, e.g. `"CREATE"`.
    pub fn as_str(self) -> &'static str {
        match self {
            AuditAction::Create => "CREATE",
            AuditAction::Update => "UPDATE",
            AuditAction::Toggle => "TOGGLE",
            AuditAction::Delete => "DELETE",
        }
    }

    /// Parse the storage representation back into an action.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CREATE" => Some(AuditAction::Create),
            "UPDATE" => Some(AuditAction::Update),
            "TOGGLE" => Some(AuditAction::Toggle),
            "DELETE" => Some(AuditAction::Delete),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshot payloads
// ---------------------------------------------------------------------------

/// Field snapshot captured around create/update/delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoSnapshot {
    pub title: String,
    pub due_date: Option<DueDate>,
    pub done_flag: bool,
}

/// Narrow snapshot for toggle entries: only the flipped flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoneSnapshot {
    pub done_flag: bool,
}

// ---------------------------------------------------------------------------
// Typed decoding
// ---------------------------------------------------------------------------

/// A decoded audit entry payload.
///
/// CREATE has no "before", DELETE has no "after", and TOGGLE snapshots
/// only the done flag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditDetail {
    Create { new: TodoSnapshot },
    Update { old: TodoSnapshot, new: TodoSnapshot },
    Toggle { old: DoneSnapshot, new: DoneSnapshot },
    Delete { old: TodoSnapshot },
}

/// Failure while decoding a stored audit payload.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Unknown audit action: {0}")]
    UnknownAction(String),

    #[error("Missing {side} snapshot for {action} entry")]
    MissingSnapshot {
        action: &'static str,
        side: &'static str,
    },

    #[error("Malformed snapshot payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Decode one stored entry's `old_values`/`new_values` text into its
/// typed payload.
pub fn decode_detail(
    action: &str,
    old_values: Option<&str>,
    new_values: Option<&str>,
) -> Result<AuditDetail, DecodeError> {
    let action = AuditAction::parse(action)
        .ok_or_else(|| DecodeError::UnknownAction(action.to_string()))?;

    match action {
        AuditAction::Create => Ok(AuditDetail::Create {
            new: serde_json::from_str(require(new_values, "CREATE", "new")?)?,
        }),
        AuditAction::Update => Ok(AuditDetail::Update {
            old: serde_json::from_str(require(old_values, "UPDATE", "old")?)?,
            new: serde_json::from_str(require(new_values, "UPDATE", "new")?)?,
        }),
        AuditAction::Toggle => Ok(AuditDetail::Toggle {
            old: serde_json::from_str(require(old_values, "TOGGLE", "old")?)?,
            new: serde_json::from_str(require(new_values, "TOGGLE", "new")?)?,
        }),
        AuditAction::Delete => Ok(AuditDetail::Delete {
            old: serde_json::from_str(require(old_values, "DELETE", "old")?)?,
        }),
    }
}

fn require<'a>(
    value: Option<&'a str>,
    action: &'static str,
    side: &'static str,
) -> Result<&'a str, DecodeError> {
    value.ok_or(DecodeError::MissingSnapshot { action, side })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
