//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the task store operations to Dart via FRB.
//! - Hold the single store instance behind a mutex so all mutations are
//!   serialized (one writer at a time, no half-applied reads).
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Timestamps cross the boundary as unix epoch milliseconds.
//! - Wall clock is captured here and threaded into core as a parameter.

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock};
use tasknest_core::db::open_db;
use tasknest_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    DueDate, NewTask, PendingReminderBoard, SqliteTaskRepository, Task, TaskPatch, TaskStore,
};
use uuid::Uuid;

const DB_FILE_NAME: &str = "tasknest.sqlite3";

type SharedStore = Mutex<TaskStore<SqliteTaskRepository, Arc<PendingReminderBoard>>>;

static STORE: OnceLock<SharedStore> = OnceLock::new();
static REMINDERS: OnceLock<Arc<PendingReminderBoard>> = OnceLock::new();
static DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - Sync call; may perform small file-system setup work.
/// - Idempotent for the same `level + log_dir`; conflicting reconfiguration
///   returns an error message.
/// - Never panics; returns empty string on success and error message on
///   failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Task record as exposed to the UI layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    /// Stable task ID in string form.
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    /// Due instant in epoch milliseconds, when set.
    pub due_epoch_ms: Option<i64>,
    pub is_completed: bool,
    /// Completion instant in epoch milliseconds, while completed.
    pub completed_epoch_ms: Option<i64>,
}

/// Generic action response envelope for store mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskActionResponse {
    /// Whether the operation was applied.
    pub ok: bool,
    /// Optional created task ID.
    pub task_id: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl TaskActionResponse {
    fn applied(message: impl Into<String>, task_id: Option<String>) -> Self {
        Self {
            ok: true,
            task_id,
            message: message.into(),
        }
    }

    fn rejected(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            task_id: None,
            message: message.into(),
        }
    }
}

/// List response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListResponse {
    pub items: Vec<TaskItem>,
    pub message: String,
}

/// Derived views response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskViewsResponse {
    pub today_active: Vec<TaskItem>,
    pub future_active: Vec<TaskItem>,
    pub completed_today: Vec<TaskItem>,
    pub message: String,
}

/// Pending reminder as exposed to the UI layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderItem {
    pub task_id: String,
    pub title: String,
    pub fire_epoch_ms: i64,
}

/// Opens the durable store and hydrates the in-memory list.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Idempotent: repeat calls after a successful open are no-ops.
/// - Never panics; failures are reported in the envelope.
#[flutter_rust_bridge::frb(sync)]
pub fn open_store() -> TaskActionResponse {
    if STORE.get().is_some() {
        return TaskActionResponse::applied("Store already open.", None);
    }

    let conn = match open_db(resolve_db_path()) {
        Ok(conn) => conn,
        Err(err) => return TaskActionResponse::rejected(format!("open_store failed: {err}")),
    };

    let board = reminder_board().clone();
    let mut store = TaskStore::new(SqliteTaskRepository::new(conn), board);
    store.load_all();
    log::info!(
        "event=store_open module=ffi status=ok tasks={}",
        store.tasks().len()
    );
    let _ = STORE.set(Mutex::new(store));
    TaskActionResponse::applied("Store opened.", None)
}

/// Returns the current task list, title ascending.
///
/// # FFI contract
/// - Sync call; reads the in-memory snapshot only.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn list_tasks() -> TaskListResponse {
    match with_store(|store| store.tasks().iter().map(to_task_item).collect::<Vec<_>>()) {
        Ok(items) => {
            let message = format!("{} task(s).", items.len());
            TaskListResponse { items, message }
        }
        Err(err) => TaskListResponse {
            items: Vec::new(),
            message: err,
        },
    }
}

/// Creates a task.
///
/// Input semantics:
/// - `due_epoch_ms`: optional due instant; normalized to midnight of its
///   day when `time_is_set` is false.
/// - Past-date rejection is the UI's job; the store accepts any date.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Trimmed-empty titles are rejected without touching storage.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn create_task(
    title: String,
    description: Option<String>,
    due_epoch_ms: Option<i64>,
    time_is_set: bool,
) -> TaskActionResponse {
    let due = match parse_due(due_epoch_ms, time_is_set) {
        Ok(due) => due,
        Err(err) => return TaskActionResponse::rejected(err),
    };

    let draft = NewTask {
        title,
        description,
        due,
    };
    match with_store(|store| store.create(draft, Utc::now())) {
        Ok(Some(id)) => TaskActionResponse::applied("Task created.", Some(id.to_string())),
        Ok(None) => TaskActionResponse::rejected("Task not created; see log."),
        Err(err) => TaskActionResponse::rejected(err),
    }
}

/// Flips a task's completion state.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn toggle_task(id: String) -> TaskActionResponse {
    let task_id = match parse_task_id(&id) {
        Ok(task_id) => task_id,
        Err(err) => return TaskActionResponse::rejected(err),
    };
    match with_store(|store| store.toggle_completion(task_id, Utc::now())) {
        Ok(true) => TaskActionResponse::applied("Task toggled.", Some(id)),
        Ok(false) => TaskActionResponse::rejected("Task not toggled; see log."),
        Err(err) => TaskActionResponse::rejected(err),
    }
}

/// Deletes a task and cancels its pending reminder.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn delete_task(id: String) -> TaskActionResponse {
    let task_id = match parse_task_id(&id) {
        Ok(task_id) => task_id,
        Err(err) => return TaskActionResponse::rejected(err),
    };
    match with_store(|store| store.delete(task_id)) {
        Ok(true) => TaskActionResponse::applied("Task deleted.", Some(id)),
        Ok(false) => TaskActionResponse::rejected("Task not deleted; see log."),
        Err(err) => TaskActionResponse::rejected(err),
    }
}

/// Applies the edit form's field values to an existing task.
///
/// The edit screen submits every field, so this maps to a full-field patch.
/// The reminder is rescheduled only when the due date changed.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn update_task(
    id: String,
    title: String,
    description: Option<String>,
    due_epoch_ms: Option<i64>,
    time_is_set: bool,
) -> TaskActionResponse {
    let task_id = match parse_task_id(&id) {
        Ok(task_id) => task_id,
        Err(err) => return TaskActionResponse::rejected(err),
    };
    let due = match parse_due(due_epoch_ms, time_is_set) {
        Ok(due) => due,
        Err(err) => return TaskActionResponse::rejected(err),
    };

    let patch = TaskPatch {
        title: Some(title),
        description: Some(description),
        due: Some(due),
    };
    match with_store(|store| store.update(task_id, patch, Utc::now())) {
        Ok(true) => TaskActionResponse::applied("Task updated.", Some(id)),
        Ok(false) => TaskActionResponse::rejected("Task not updated; see log."),
        Err(err) => TaskActionResponse::rejected(err),
    }
}

/// Partitions the current list into today/future/completed-today views.
///
/// `now_epoch_ms` comes from the caller so the UI and core agree on the
/// reference instant.
///
/// # FFI contract
/// - Sync call; reads the in-memory snapshot only.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn task_views(now_epoch_ms: i64) -> TaskViewsResponse {
    let Some(now) = DateTime::<Utc>::from_timestamp_millis(now_epoch_ms) else {
        return TaskViewsResponse {
            today_active: Vec::new(),
            future_active: Vec::new(),
            completed_today: Vec::new(),
            message: format!("invalid now_epoch_ms `{now_epoch_ms}`"),
        };
    };

    match with_store(|store| store.derive_views(now)) {
        Ok(views) => TaskViewsResponse {
            today_active: views.today_active.iter().map(to_task_item).collect(),
            future_active: views.future_active.iter().map(to_task_item).collect(),
            completed_today: views.completed_today.iter().map(to_task_item).collect(),
            message: String::new(),
        },
        Err(err) => TaskViewsResponse {
            today_active: Vec::new(),
            future_active: Vec::new(),
            completed_today: Vec::new(),
            message: err,
        },
    }
}

/// Returns every pending reminder, fire time ascending.
///
/// The host app mirrors these into platform notifications.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn pending_reminders() -> Vec<ReminderItem> {
    reminder_board()
        .snapshot()
        .into_iter()
        .map(|(task_id, reminder)| ReminderItem {
            task_id: task_id.to_string(),
            title: reminder.title,
            fire_epoch_ms: reminder.fire_at.timestamp_millis(),
        })
        .collect()
}

fn to_task_item(task: &Task) -> TaskItem {
    TaskItem {
        id: task.id.to_string(),
        title: task.title.clone(),
        description: task.description.clone(),
        due_epoch_ms: task.due_at.map(|at| at.timestamp_millis()),
        is_completed: task.is_completed,
        completed_epoch_ms: task.completed_at.map(|at| at.timestamp_millis()),
    }
}

fn parse_task_id(id: &str) -> Result<tasknest_core::TaskId, String> {
    Uuid::parse_str(id.trim()).map_err(|_| format!("invalid task id `{id}`"))
}

fn parse_due(due_epoch_ms: Option<i64>, time_is_set: bool) -> Result<Option<DueDate>, String> {
    match due_epoch_ms {
        None => Ok(None),
        Some(ms) => DateTime::<Utc>::from_timestamp_millis(ms)
            .map(|at| Some(DueDate { at, time_is_set }))
            .ok_or_else(|| format!("invalid due_epoch_ms `{ms}`")),
    }
}

fn reminder_board() -> &'static Arc<PendingReminderBoard> {
    REMINDERS.get_or_init(|| Arc::new(PendingReminderBoard::new()))
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("TASKNEST_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DB_FILE_NAME)
        })
        .clone()
}

fn with_store<T>(
    f: impl FnOnce(&mut TaskStore<SqliteTaskRepository, Arc<PendingReminderBoard>>) -> T,
) -> Result<T, String> {
    let store = STORE
        .get()
        .ok_or_else(|| "store not opened; call open_store first".to_string())?;
    let mut guard = store
        .lock()
        .map_err(|_| "store mutex poisoned".to_string())?;
    Ok(f(&mut guard))
}
