use chrono::{TimeZone, Utc};
use tasknest_core::{start_of_day, Task, TaskValidationError};
use uuid::Uuid;

#[test]
fn new_task_sets_defaults() {
    let task = Task::new("water plants", None, None);

    assert!(!task.id.is_nil());
    assert_eq!(task.title, "water plants");
    assert_eq!(task.description, None);
    assert_eq!(task.due_at, None);
    assert!(!task.is_completed);
    assert_eq!(task.completed_at, None);
    assert!(task.is_open());
}

#[test]
fn with_id_rejects_nil_uuid() {
    let err = Task::with_id(Uuid::nil(), "invalid", None, None).unwrap_err();
    assert_eq!(err, TaskValidationError::NilId);
}

#[test]
fn completion_round_trip_keeps_flag_and_timestamp_in_sync() {
    let mut task = Task::new("file taxes", None, None);
    let done_at = Utc.with_ymd_and_hms(2026, 8, 23, 14, 30, 0).unwrap();

    task.mark_completed(done_at);
    assert!(task.is_completed);
    assert_eq!(task.completed_at, Some(done_at));
    task.validate().unwrap();

    task.mark_open();
    assert!(!task.is_completed);
    assert_eq!(task.completed_at, None);
    task.validate().unwrap();
}

#[test]
fn validate_rejects_completion_mismatch() {
    let mut task = Task::new("broken", None, None);
    task.completed_at = Some(Utc.with_ymd_and_hms(2026, 8, 23, 9, 0, 0).unwrap());

    let err = task.validate().unwrap_err();
    assert_eq!(
        err,
        TaskValidationError::CompletionMismatch {
            is_completed: false
        }
    );
}

#[test]
fn validate_accepts_empty_title() {
    // Title emptiness is a creation-boundary rule, not a model invariant:
    // an edited-to-empty task still persists.
    let mut task = Task::new("soon to be empty", None, None);
    task.title = String::new();
    task.validate().unwrap();
}

#[test]
fn start_of_day_drops_time_component() {
    let afternoon = Utc.with_ymd_and_hms(2026, 8, 24, 15, 42, 7).unwrap();
    let midnight = start_of_day(afternoon);

    assert_eq!(midnight, Utc.with_ymd_and_hms(2026, 8, 24, 0, 0, 0).unwrap());
    assert_eq!(start_of_day(midnight), midnight);
}

#[test]
fn task_serialization_uses_expected_wire_fields() {
    let id = Uuid::parse_str("11111111-2222-4333-8444-555555555555").unwrap();
    let due = Utc.with_ymd_and_hms(2026, 8, 24, 9, 0, 0).unwrap();
    let mut task = Task::with_id(id, "Buy milk", Some("2 liters".to_string()), Some(due)).unwrap();
    task.mark_completed(Utc.with_ymd_and_hms(2026, 8, 24, 10, 0, 0).unwrap());

    let json = serde_json::to_value(&task).unwrap();
    assert_eq!(json["id"], id.to_string());
    assert_eq!(json["title"], "Buy milk");
    assert_eq!(json["description"], "2 liters");
    assert_eq!(json["due_at"], "2026-08-24T09:00:00Z");
    assert_eq!(json["is_completed"], true);
    assert_eq!(json["completed_at"], "2026-08-24T10:00:00Z");

    let decoded: Task = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, task);
}
