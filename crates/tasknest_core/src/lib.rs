//! Core domain logic for TaskNest.
//! This crate is the single source of truth for business invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod reminder;
pub mod repo;
pub mod store;
pub mod views;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::task::{start_of_day, Task, TaskId, TaskValidationError};
pub use reminder::{
    clamp_fire_at, PendingReminder, PendingReminderBoard, ReminderScheduler, SchedulerError,
    SchedulerResult, MIN_REMINDER_LEAD_MS,
};
pub use repo::task_repo::{RepoError, RepoResult, SqliteTaskRepository, TaskRepository};
pub use store::{DueDate, NewTask, SubscriberId, TaskPatch, TaskStore};
pub use views::{derive_views, TaskViews};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
