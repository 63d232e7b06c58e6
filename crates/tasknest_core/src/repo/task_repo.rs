//! Task repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide the durable-store API the task store mediates through.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths must call `Task::validate()` before SQL mutations.
//! - Read paths must reject invalid persisted state instead of masking it.
//! - `fetch_all` orders by title ascending, ties broken by insertion order.

use crate::db::DbError;
use crate::model::task::{Task, TaskId, TaskValidationError};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const TASK_SELECT_SQL: &str = "SELECT
    id,
    title,
    description,
    due_at,
    is_completed,
    completed_at
FROM tasks";

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for task persistence operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(TaskValidationError),
    Db(DbError),
    NotFound(TaskId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<TaskValidationError> for RepoError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Durable-store contract consumed by the task store.
///
/// Writes are single-statement and therefore atomic: a failed call leaves
/// prior durable state unchanged for subsequent reads.
pub trait TaskRepository {
    /// Upserts a task keyed on its id.
    fn create_or_replace(&self, task: &Task) -> RepoResult<TaskId>;
    /// Returns every task, title ascending, insertion order on ties.
    fn fetch_all(&self) -> RepoResult<Vec<Task>>;
    /// Hard-deletes a task row.
    fn delete(&self, id: TaskId) -> RepoResult<()>;
}

// Lets a shared repository act as the store's backend while callers keep a
// handle for direct access, mirroring the scheduler's Arc forwarding impl.
impl<T: TaskRepository + ?Sized> TaskRepository for std::sync::Arc<T> {
    fn create_or_replace(&self, task: &Task) -> RepoResult<TaskId> {
        (**self).create_or_replace(task)
    }

    fn fetch_all(&self) -> RepoResult<Vec<Task>> {
        (**self).fetch_all()
    }

    fn delete(&self, id: TaskId) -> RepoResult<()> {
        (**self).delete(id)
    }
}

/// SQLite-backed task repository.
///
/// Owns its connection: the task store keeps one repository alive for the
/// whole session.
pub struct SqliteTaskRepository {
    conn: Connection,
}

impl SqliteTaskRepository {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }
}

impl TaskRepository for SqliteTaskRepository {
    fn create_or_replace(&self, task: &Task) -> RepoResult<TaskId> {
        task.validate()?;

        // Upsert instead of INSERT OR REPLACE so created_at (and with it
        // insertion order) survives a replace.
        self.conn.execute(
            "INSERT INTO tasks (
                id,
                title,
                description,
                due_at,
                is_completed,
                completed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                description = excluded.description,
                due_at = excluded.due_at,
                is_completed = excluded.is_completed,
                completed_at = excluded.completed_at,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![
                task.id.to_string(),
                task.title.as_str(),
                task.description.as_deref(),
                task.due_at.map(|at| at.timestamp_millis()),
                bool_to_int(task.is_completed),
                task.completed_at.map(|at| at.timestamp_millis()),
            ],
        )?;

        Ok(task.id)
    }

    fn fetch_all(&self) -> RepoResult<Vec<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL}
             ORDER BY title ASC, created_at ASC, rowid ASC;"
        ))?;

        let mut rows = stmt.query([])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }

        Ok(tasks)
    }

    fn delete(&self, id: TaskId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{id_text}` in tasks.id"))
    })?;

    let is_completed = match row.get::<_, i64>("is_completed")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_completed value `{other}` in tasks.is_completed"
            )));
        }
    };

    let due_at = parse_epoch_ms(row.get("due_at")?, "tasks.due_at")?;
    let completed_at = parse_epoch_ms(row.get("completed_at")?, "tasks.completed_at")?;

    let task = Task {
        id,
        title: row.get("title")?,
        description: row.get("description")?,
        due_at,
        is_completed,
        completed_at,
    };
    task.validate()?;
    Ok(task)
}

fn parse_epoch_ms(value: Option<i64>, column: &str) -> RepoResult<Option<DateTime<Utc>>> {
    match value {
        None => Ok(None),
        Some(ms) => DateTime::<Utc>::from_timestamp_millis(ms)
            .map(Some)
            .ok_or_else(|| {
                RepoError::InvalidData(format!("out-of-range timestamp `{ms}` in {column}"))
            }),
    }
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
