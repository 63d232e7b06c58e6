//! Reminder scheduling contract and in-process registry.
//!
//! # Responsibility
//! - Define the one-shot reminder contract the task store relies on.
//! - Provide the in-process pending-reminder board the host app drains into
//!   platform notifications.
//!
//! # Invariants
//! - Scheduling is idempotent per task id: re-scheduling replaces any prior
//!   pending reminder for that id.
//! - Cancelling an unknown id is a no-op.
//! - Fire times are clamped to at least `MIN_REMINDER_LEAD_MS` in the
//!   future, so a non-positive delay can never instant-fire.

use crate::model::task::TaskId;
use chrono::{DateTime, Duration, Utc};
use log::debug;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Mutex;

/// Minimum lead time applied to non-positive reminder delays.
pub const MIN_REMINDER_LEAD_MS: i64 = 1_000;

pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// Failure while talking to the reminder backend.
#[derive(Debug)]
pub enum SchedulerError {
    Backend(String),
}

impl Display for SchedulerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Backend(message) => write!(f, "reminder backend failure: {message}"),
        }
    }
}

impl Error for SchedulerError {}

/// One-shot reminder contract consumed by the task store.
///
/// Implementations hold only a weak reference to the task (id, title and
/// fire time), never an owning copy of the record.
pub trait ReminderScheduler {
    /// Schedules (or replaces) the pending reminder for `id`.
    fn schedule(&self, id: TaskId, title: &str, fire_at: DateTime<Utc>) -> SchedulerResult<()>;
    /// Removes any pending reminder for `id`.
    fn cancel(&self, id: TaskId) -> SchedulerResult<()>;
}

// Lets a shared board act as the store's scheduler while the host app
// keeps a handle for draining it.
impl<T: ReminderScheduler + ?Sized> ReminderScheduler for std::sync::Arc<T> {
    fn schedule(&self, id: TaskId, title: &str, fire_at: DateTime<Utc>) -> SchedulerResult<()> {
        (**self).schedule(id, title, fire_at)
    }

    fn cancel(&self, id: TaskId) -> SchedulerResult<()> {
        (**self).cancel(id)
    }
}

/// Clamps `fire_at` to at least `MIN_REMINDER_LEAD_MS` past `now`.
pub fn clamp_fire_at(now: DateTime<Utc>, fire_at: DateTime<Utc>) -> DateTime<Utc> {
    if fire_at <= now {
        now + Duration::milliseconds(MIN_REMINDER_LEAD_MS)
    } else {
        fire_at
    }
}

/// A reminder waiting to fire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReminder {
    pub title: String,
    pub fire_at: DateTime<Utc>,
}

/// In-process reminder registry.
///
/// The host app drains this board to mirror entries into the platform
/// notification engine; tests use it to observe scheduling side effects.
#[derive(Debug, Default)]
pub struct PendingReminderBoard {
    entries: Mutex<HashMap<TaskId, PendingReminder>>,
}

impl PendingReminderBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the pending reminder for `id`, if any.
    pub fn pending(&self, id: TaskId) -> Option<PendingReminder> {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(&id).cloned())
    }

    /// Returns a snapshot of every pending reminder, fire time ascending.
    pub fn snapshot(&self) -> Vec<(TaskId, PendingReminder)> {
        let mut all: Vec<_> = self
            .entries
            .lock()
            .map(|entries| {
                entries
                    .iter()
                    .map(|(id, reminder)| (*id, reminder.clone()))
                    .collect()
            })
            .unwrap_or_default();
        all.sort_by_key(|(_, reminder)| reminder.fire_at);
        all
    }
}

impl ReminderScheduler for PendingReminderBoard {
    fn schedule(&self, id: TaskId, title: &str, fire_at: DateTime<Utc>) -> SchedulerResult<()> {
        let effective = clamp_fire_at(Utc::now(), fire_at);
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| SchedulerError::Backend("reminder registry poisoned".to_string()))?;
        entries.insert(
            id,
            PendingReminder {
                title: title.to_string(),
                fire_at: effective,
            },
        );
        debug!("event=reminder_schedule module=reminder status=ok task_id={id} fire_at={effective}");
        Ok(())
    }

    fn cancel(&self, id: TaskId) -> SchedulerResult<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| SchedulerError::Backend("reminder registry poisoned".to_string()))?;
        let removed = entries.remove(&id).is_some();
        debug!("event=reminder_cancel module=reminder status=ok task_id={id} removed={removed}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{clamp_fire_at, PendingReminderBoard, ReminderScheduler, MIN_REMINDER_LEAD_MS};
    use chrono::{Duration, TimeZone, Utc};
    use uuid::Uuid;

    #[test]
    fn clamp_leaves_future_fire_times_alone() {
        let now = Utc.with_ymd_and_hms(2026, 8, 23, 12, 0, 0).unwrap();
        let future = now + Duration::hours(2);
        assert_eq!(clamp_fire_at(now, future), future);
    }

    #[test]
    fn clamp_floors_non_positive_delays() {
        let now = Utc.with_ymd_and_hms(2026, 8, 23, 12, 0, 0).unwrap();
        let floor = now + Duration::milliseconds(MIN_REMINDER_LEAD_MS);
        assert_eq!(clamp_fire_at(now, now), floor);
        assert_eq!(clamp_fire_at(now, now - Duration::days(1)), floor);
    }

    #[test]
    fn schedule_is_idempotent_per_id() {
        let board = PendingReminderBoard::new();
        let id = Uuid::new_v4();
        let first = Utc::now() + Duration::hours(1);
        let second = Utc::now() + Duration::hours(3);

        board.schedule(id, "first", first).unwrap();
        board.schedule(id, "second", second).unwrap();

        let pending = board.pending(id).unwrap();
        assert_eq!(pending.title, "second");
        assert_eq!(pending.fire_at, second);
        assert_eq!(board.snapshot().len(), 1);
    }

    #[test]
    fn past_fire_time_is_pushed_into_the_future() {
        let board = PendingReminderBoard::new();
        let id = Uuid::new_v4();
        let before = Utc::now();

        board.schedule(id, "late", before - Duration::days(1)).unwrap();

        assert!(board.pending(id).unwrap().fire_at > before);
    }

    #[test]
    fn cancel_removes_pending_and_tolerates_unknown_ids() {
        let board = PendingReminderBoard::new();
        let id = Uuid::new_v4();
        board.schedule(id, "gone soon", Utc::now() + Duration::hours(1)).unwrap();

        board.cancel(id).unwrap();
        assert_eq!(board.pending(id), None);

        board.cancel(Uuid::new_v4()).unwrap();
    }

    #[test]
    fn snapshot_orders_by_fire_time() {
        let board = PendingReminderBoard::new();
        let later = Uuid::new_v4();
        let sooner = Uuid::new_v4();
        board.schedule(later, "later", Utc::now() + Duration::hours(5)).unwrap();
        board.schedule(sooner, "sooner", Utc::now() + Duration::hours(1)).unwrap();

        let snapshot = board.snapshot();
        assert_eq!(snapshot[0].0, sooner);
        assert_eq!(snapshot[1].0, later);
    }
}
