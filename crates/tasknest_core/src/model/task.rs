//! Task domain model.
//!
//! # Responsibility
//! - Define the single entity owned by the task store.
//! - Provide lifecycle helpers that keep completion state consistent.
//!
//! # Invariants
//! - `id` is stable and never reused for another task.
//! - `completed_at` is `Some` if and only if `is_completed` is true.
//! - A due date without a user-chosen time-of-day is stored as midnight
//!   (start of day) of the chosen calendar day.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for every task.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type TaskId = Uuid;

/// Validation failure for a task record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Nil UUIDs are reserved and never valid task identity.
    NilId,
    /// `completed_at` and `is_completed` disagree.
    CompletionMismatch { is_completed: bool },
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "task id must not be the nil uuid"),
            Self::CompletionMismatch { is_completed } => write!(
                f,
                "completed_at must be set exactly when is_completed is true (is_completed={is_completed})"
            ),
        }
    }
}

impl Error for TaskValidationError {}

/// Canonical task record.
///
/// Title emptiness is deliberately not a model invariant: it is enforced at
/// the creation boundary only, so an existing task edited to an empty title
/// still round-trips through persistence unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Stable global ID, assigned at creation, immutable afterwards.
    pub id: TaskId,
    /// Short task text. Non-empty after trimming at creation time.
    pub title: String,
    /// Optional free-form detail text.
    pub description: Option<String>,
    /// Optional due instant. Midnight-of-day when no time was chosen.
    pub due_at: Option<DateTime<Utc>>,
    /// Completion flag, false for newly created tasks.
    pub is_completed: bool,
    /// Completion instant, present exactly while `is_completed` is true.
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Creates a new open task with a generated stable ID.
    pub fn new(
        title: impl Into<String>,
        description: Option<String>,
        due_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description,
            due_at,
            is_completed: false,
            completed_at: None,
        }
    }

    /// Creates a task with a caller-provided stable ID.
    ///
    /// Used by import/restore paths where identity already exists.
    ///
    /// # Errors
    /// - `TaskValidationError::NilId` when `id` is the nil uuid.
    pub fn with_id(
        id: TaskId,
        title: impl Into<String>,
        description: Option<String>,
        due_at: Option<DateTime<Utc>>,
    ) -> Result<Self, TaskValidationError> {
        if id.is_nil() {
            return Err(TaskValidationError::NilId);
        }
        Ok(Self {
            id,
            title: title.into(),
            description,
            due_at,
            is_completed: false,
            completed_at: None,
        })
    }

    /// Marks the task completed at the given instant.
    ///
    /// Flag and timestamp change together so no caller can observe one
    /// without the other.
    pub fn mark_completed(&mut self, at: DateTime<Utc>) {
        self.is_completed = true;
        self.completed_at = Some(at);
    }

    /// Reopens the task, clearing the completion timestamp.
    pub fn mark_open(&mut self) {
        self.is_completed = false;
        self.completed_at = None;
    }

    /// Returns whether the task is still actionable.
    pub fn is_open(&self) -> bool {
        !self.is_completed
    }

    /// Checks structural invariants of the record.
    ///
    /// # Errors
    /// - `NilId` for nil identity.
    /// - `CompletionMismatch` when flag and timestamp disagree.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.id.is_nil() {
            return Err(TaskValidationError::NilId);
        }
        if self.completed_at.is_some() != self.is_completed {
            return Err(TaskValidationError::CompletionMismatch {
                is_completed: self.is_completed,
            });
        }
        Ok(())
    }
}

/// Returns midnight (start of day) of the calendar day containing `at`.
///
/// Due dates whose time-of-day was never chosen are normalized through this
/// so downstream code can tell all-day tasks from timed ones.
pub fn start_of_day(at: DateTime<Utc>) -> DateTime<Utc> {
    at.date_naive().and_time(NaiveTime::MIN).and_utc()
}
