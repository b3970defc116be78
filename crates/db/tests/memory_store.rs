//! The in-memory store must be observably identical to the Postgres
//! repository for every contract scenario, so the same suite runs here
//! without a database. Also covers the service facade, which forwards
//! to whichever store was injected.

use std::sync::Arc;

use assert_matches::assert_matches;
use tasktrail_core::audit::{decode_detail, AuditDetail};
use tasktrail_core::error::CoreError;
use tasktrail_db::models::todo::{CreateTodo, UpdateTodo};
use tasktrail_db::repositories::{InMemoryTodoRepo, RepoError, TodoStore};
use tasktrail_db::service::TodoService;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_todo(title: &str) -> CreateTodo {
    CreateTodo {
        title: title.to_string(),
        due_date: None,
    }
}

fn dated_todo(title: &str, due: &str) -> CreateTodo {
    CreateTodo {
        title: title.to_string(),
        due_date: Some(due.parse().unwrap()),
    }
}

fn retitle(title: &str) -> UpdateTodo {
    UpdateTodo {
        title: Some(title.to_string()),
        due_date: None,
    }
}

// ---------------------------------------------------------------------------
// Test: creation defaults and CREATE entry
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_create_defaults_and_create_entry() {
    let repo = InMemoryTodoRepo::new();

    let todo = repo.create(&new_todo("Buy milk")).await.unwrap();
    assert_eq!(todo.id, 1, "ids are assigned monotonically from 1");
    assert!(!todo.done_flag);
    assert_eq!(todo.due_date, None);
    assert!(todo.deleted_at.is_none());

    let all = repo.get_all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].audit_logs.len(), 1);
    assert_eq!(all[0].audit_logs[0].action, "CREATE");
    assert!(all[0].audit_logs[0].old_values.is_none());

    let detail =
        decode_detail("CREATE", None, all[0].audit_logs[0].new_values.as_deref()).unwrap();
    assert_matches!(detail, AuditDetail::Create { new } => {
        assert_eq!(new.title, "Buy milk");
        assert!(!new.done_flag);
    });
}

// ---------------------------------------------------------------------------
// Test: ordering and soft-delete visibility
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_get_all_excludes_deleted_and_orders_newest_first() {
    let repo = InMemoryTodoRepo::new();

    let a = repo.create(&new_todo("first")).await.unwrap();
    let b = repo.create(&new_todo("second")).await.unwrap();
    let c = repo.create(&new_todo("third")).await.unwrap();

    repo.delete(b.id).await.unwrap();

    let ids: Vec<i64> = repo
        .get_all()
        .await
        .unwrap()
        .iter()
        .map(|t| t.todo.id)
        .collect();
    assert_eq!(ids, vec![c.id, a.id]);
}

#[tokio::test]
async fn test_get_all_on_empty_store() {
    let repo = InMemoryTodoRepo::new();
    assert!(repo.get_all().await.unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Test: toggle semantics
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_toggle_flips_flag_and_appends_entry() {
    let repo = InMemoryTodoRepo::new();
    let todo = repo.create(&new_todo("Buy milk")).await.unwrap();

    let toggled = repo.toggle(todo.id).await.unwrap();
    assert!(toggled.done_flag);

    let all = repo.get_all().await.unwrap();
    let actions: Vec<&str> = all[0].audit_logs.iter().map(|l| l.action.as_str()).collect();
    assert_eq!(actions, vec!["TOGGLE", "CREATE"]);

    let detail = decode_detail(
        "TOGGLE",
        all[0].audit_logs[0].old_values.as_deref(),
        all[0].audit_logs[0].new_values.as_deref(),
    )
    .unwrap();
    assert_matches!(detail, AuditDetail::Toggle { old, new } => {
        assert!(!old.done_flag);
        assert!(new.done_flag);
    });
}

#[tokio::test]
async fn test_toggle_is_its_own_inverse() {
    let repo = InMemoryTodoRepo::new();
    let todo = repo.create(&new_todo("Flip twice")).await.unwrap();

    repo.toggle(todo.id).await.unwrap();
    let back = repo.toggle(todo.id).await.unwrap();
    assert!(!back.done_flag);

    let trail = repo.history(todo.id).await.unwrap().unwrap();
    assert_eq!(trail.len(), 3, "CREATE plus two TOGGLE entries");
}

#[tokio::test]
async fn test_toggle_missing_id_errors() {
    let repo = InMemoryTodoRepo::new();

    let err = repo.toggle(999_999).await.unwrap_err();
    assert_matches!(err, RepoError::Core(CoreError::NotFoundOrDeleted { .. }));
    assert_eq!(err.to_string(), "Todo not found or has been deleted");
}

// ---------------------------------------------------------------------------
// Test: update semantics
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_update_title_keeps_due_date_and_snapshots_both_sides() {
    let repo = InMemoryTodoRepo::new();
    let todo = repo.create(&dated_todo("Buy milk", "2026-09-01")).await.unwrap();

    let updated = repo.update(todo.id, &retitle("Buy oat milk")).await.unwrap();
    assert_eq!(updated.title, "Buy oat milk");
    assert_eq!(updated.due_date, todo.due_date);

    let trail = repo.history(todo.id).await.unwrap().unwrap();
    let detail = decode_detail(
        "UPDATE",
        trail[0].old_values.as_deref(),
        trail[0].new_values.as_deref(),
    )
    .unwrap();
    assert_matches!(detail, AuditDetail::Update { old, new } => {
        assert_eq!(old.title, "Buy milk");
        assert_eq!(new.title, "Buy oat milk");
        assert_eq!(old.due_date, new.due_date);
    });
}

#[tokio::test]
async fn test_update_due_date_tri_state() {
    let repo = InMemoryTodoRepo::new();
    let todo = repo.create(&dated_todo("Dated", "2026-09-01")).await.unwrap();

    let kept = repo.update(todo.id, &retitle("Dated v2")).await.unwrap();
    assert_eq!(kept.due_date, Some("2026-09-01".parse().unwrap()));

    let cleared = repo
        .update(
            todo.id,
            &UpdateTodo {
                title: None,
                due_date: Some(None),
            },
        )
        .await
        .unwrap();
    assert_eq!(cleared.due_date, None);

    let replaced = repo
        .update(
            todo.id,
            &UpdateTodo {
                title: None,
                due_date: Some(Some("2026-10-15".parse().unwrap())),
            },
        )
        .await
        .unwrap();
    assert_eq!(replaced.due_date, Some("2026-10-15".parse().unwrap()));
}

#[tokio::test]
async fn test_update_does_not_change_done_flag() {
    let repo = InMemoryTodoRepo::new();
    let todo = repo.create(&new_todo("Stay done")).await.unwrap();
    repo.toggle(todo.id).await.unwrap();

    let updated = repo.update(todo.id, &retitle("Still done")).await.unwrap();
    assert!(updated.done_flag);
}

#[tokio::test]
async fn test_update_refreshes_updated_at() {
    let repo = InMemoryTodoRepo::new();
    let todo = repo.create(&new_todo("Stamp me")).await.unwrap();

    let updated = repo.update(todo.id, &retitle("Stamped")).await.unwrap();
    assert!(updated.updated_at > todo.updated_at);
    assert_eq!(updated.created_at, todo.created_at);
}

// ---------------------------------------------------------------------------
// Test: delete semantics
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_delete_hides_row_and_gates_mutations() {
    let repo = InMemoryTodoRepo::new();
    let todo = repo.create(&new_todo("Doomed")).await.unwrap();

    let ack = repo.delete(todo.id).await.unwrap();
    assert!(ack.success);
    assert!(repo.get_all().await.unwrap().is_empty());

    let err = repo.update(todo.id, &retitle("Zombie")).await.unwrap_err();
    assert_eq!(err.to_string(), "Todo not found or has been deleted");
    let err = repo.toggle(todo.id).await.unwrap_err();
    assert_eq!(err.to_string(), "Todo not found or has been deleted");
}

#[tokio::test]
async fn test_delete_missing_id_is_forgiving() {
    let repo = InMemoryTodoRepo::new();
    let ack = repo.delete(999_999).await.unwrap();
    assert!(ack.success);
}

#[tokio::test]
async fn test_delete_already_deleted_is_silent_noop() {
    let repo = InMemoryTodoRepo::new();
    let todo = repo.create(&new_todo("Delete twice")).await.unwrap();

    repo.delete(todo.id).await.unwrap();
    let ack = repo.delete(todo.id).await.unwrap();
    assert!(ack.success);

    let trail = repo.history(todo.id).await.unwrap().unwrap();
    assert_eq!(trail.len(), 2, "CREATE + DELETE only; no duplicate entry");
}

#[tokio::test]
async fn test_delete_leaves_updated_at_untouched() {
    let repo = InMemoryTodoRepo::new();
    let todo = repo.create(&new_todo("No stamp")).await.unwrap();

    repo.delete(todo.id).await.unwrap();

    let trail = repo.history(todo.id).await.unwrap().unwrap();
    assert_eq!(trail[0].action, "DELETE");
    // The DELETE snapshot captures the pre-delete field triple.
    let detail = decode_detail("DELETE", trail[0].old_values.as_deref(), None).unwrap();
    assert_matches!(detail, AuditDetail::Delete { old } => {
        assert_eq!(old.title, "No stamp");
    });
}

// ---------------------------------------------------------------------------
// Test: history
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_history_survives_soft_delete() {
    let repo = InMemoryTodoRepo::new();
    let todo = repo.create(&new_todo("Remembered")).await.unwrap();
    repo.toggle(todo.id).await.unwrap();
    repo.delete(todo.id).await.unwrap();

    let trail = repo.history(todo.id).await.unwrap().unwrap();
    let actions: Vec<&str> = trail.iter().map(|l| l.action.as_str()).collect();
    assert_eq!(actions, vec!["DELETE", "TOGGLE", "CREATE"]);
}

#[tokio::test]
async fn test_history_of_unknown_id_is_none() {
    let repo = InMemoryTodoRepo::new();
    assert!(repo.history(999_999).await.unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Test: service facade forwards verbatim
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_service_forwards_to_injected_store() {
    let service = TodoService::new(Arc::new(InMemoryTodoRepo::new()));

    let created = service.create(&new_todo("Via service")).await.unwrap();
    service.toggle(created.id).await.unwrap();

    let all = service.get_all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].todo.id, created.id);
    assert!(all[0].todo.done_flag);
    assert_eq!(all[0].audit_logs.len(), 2);

    let ack = service.delete(created.id).await.unwrap();
    assert!(ack.success);
    assert!(service.get_all().await.unwrap().is_empty());

    let err = service.update(created.id, &retitle("Nope")).await.unwrap_err();
    assert_matches!(err, RepoError::Core(CoreError::NotFoundOrDeleted { .. }));
}
