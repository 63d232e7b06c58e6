//! Task store: the single source of truth for the task collection.
//!
//! # Responsibility
//! - Own the in-memory authoritative task list for a running session.
//! - Mediate every mutation through validation, persistence and reminder
//!   side effects.
//! - Publish immutable snapshots to subscribed observers.
//!
//! # Invariants
//! - The in-memory list only changes after persistence confirms success
//!   (read-after-write: every mutation reloads from the repository).
//! - Persistence and scheduling failures never escape as faults; the
//!   mutation is abandoned, the list keeps its last loaded state and the
//!   failure goes to the log.
//! - Wall clock is threaded in as an explicit `now` parameter; the store
//!   never reads the system clock itself.

use crate::model::task::{start_of_day, Task, TaskId};
use crate::reminder::ReminderScheduler;
use crate::repo::task_repo::TaskRepository;
use crate::views::{derive_views, TaskViews};
use chrono::{DateTime, Utc};
use log::{debug, error};

/// A due instant plus whether the user picked a time-of-day.
///
/// Without a chosen time the instant is normalized to midnight of its
/// calendar day, so downstream code can tell all-day tasks from timed ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueDate {
    pub at: DateTime<Utc>,
    pub time_is_set: bool,
}

impl DueDate {
    fn normalized(self) -> DateTime<Utc> {
        if self.time_is_set {
            self.at
        } else {
            start_of_day(self.at)
        }
    }
}

/// Request model for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub due: Option<DueDate>,
}

/// Partial field changes for an existing task.
///
/// Outer `None` means "leave unchanged"; the inner option carries the new
/// value, including clearing an optional field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub due: Option<Option<DueDate>>,
}

/// Handle returned by `subscribe`, used to unsubscribe later.
pub type SubscriberId = u64;

type Observer = Box<dyn Fn(&[Task]) + Send>;

/// In-memory mutation coordinator over a durable store and a reminder
/// scheduler.
///
/// All operations run to completion before the next one may observe the
/// list; callers are expected to funnel mutations through one serialization
/// point (the FFI layer wraps the store in a mutex).
pub struct TaskStore<R: TaskRepository, S: ReminderScheduler> {
    repo: R,
    scheduler: S,
    tasks: Vec<Task>,
    observers: Vec<(SubscriberId, Observer)>,
    next_subscriber: SubscriberId,
}

impl<R: TaskRepository, S: ReminderScheduler> TaskStore<R, S> {
    /// Creates a store with an empty list; call `load_all` to hydrate.
    pub fn new(repo: R, scheduler: S) -> Self {
        Self {
            repo,
            scheduler,
            tasks: Vec::new(),
            observers: Vec::new(),
            next_subscriber: 0,
        }
    }

    /// Immutable snapshot of the current list.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Registers an observer fired after every successful list replacement.
    pub fn subscribe(&mut self, observer: impl Fn(&[Task]) + Send + 'static) -> SubscriberId {
        let id = self.next_subscriber;
        self.next_subscriber += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Removes a previously registered observer.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(observer_id, _)| *observer_id != id);
        self.observers.len() != before
    }

    /// Replaces the in-memory list with the repository's contents.
    ///
    /// On failure the list keeps its last successfully loaded state and the
    /// error is reported to the log.
    pub fn load_all(&mut self) -> bool {
        match self.repo.fetch_all() {
            Ok(tasks) => {
                self.tasks = tasks;
                self.notify();
                true
            }
            Err(err) => {
                error!("event=task_load module=store status=error error={err}");
                false
            }
        }
    }

    /// Creates a task, persists it, reloads the list and schedules a
    /// reminder when the due date lies in the future.
    ///
    /// A trimmed-empty title is a no-op: no persistence call is issued and
    /// `None` is returned. The store accepts any due date it is given;
    /// rejecting past dates is the caller's responsibility.
    pub fn create(&mut self, draft: NewTask, now: DateTime<Utc>) -> Option<TaskId> {
        let title = draft.title.trim();
        if title.is_empty() {
            debug!("event=task_create module=store status=rejected reason=empty_title");
            return None;
        }

        let due_at = draft.due.map(DueDate::normalized);
        let task = Task::new(title, draft.description, due_at);

        if let Err(err) = self.repo.create_or_replace(&task) {
            error!(
                "event=task_create module=store status=error task_id={} error={err}",
                task.id
            );
            return None;
        }
        self.load_all();

        if let Some(fire_at) = due_at.filter(|at| *at > now) {
            if let Err(err) = self.scheduler.schedule(task.id, &task.title, fire_at) {
                // Degraded but acceptable: the task exists without its
                // reminder. Never rolled back.
                error!(
                    "event=reminder_schedule module=store status=error task_id={} error={err}",
                    task.id
                );
            }
        }

        Some(task.id)
    }

    /// Flips completion state, keeping `completed_at` in sync atomically.
    pub fn toggle_completion(&mut self, id: TaskId, now: DateTime<Utc>) -> bool {
        let Some(mut task) = self.find(id) else {
            debug!("event=task_toggle module=store status=rejected reason=unknown_id task_id={id}");
            return false;
        };

        if task.is_open() {
            task.mark_completed(now);
        } else {
            task.mark_open();
        }

        if let Err(err) = self.repo.create_or_replace(&task) {
            error!("event=task_toggle module=store status=error task_id={id} error={err}");
            return false;
        }
        self.load_all();
        true
    }

    /// Removes a task from durable storage, cancels its pending reminder
    /// and reloads the list.
    pub fn delete(&mut self, id: TaskId) -> bool {
        if let Err(err) = self.repo.delete(id) {
            error!("event=task_delete module=store status=error task_id={id} error={err}");
            return false;
        }

        if let Err(err) = self.scheduler.cancel(id) {
            error!("event=reminder_cancel module=store status=error task_id={id} error={err}");
        }

        self.load_all();
        true
    }

    /// Applies partial field changes, persists and reloads.
    ///
    /// The pending reminder is left untouched unless the due date changed:
    /// then the old reminder is cancelled and a new one scheduled only when
    /// the new date lies in the future. Title emptiness is not re-checked
    /// here; gating an empty edited title stays with the presentation layer.
    pub fn update(&mut self, id: TaskId, patch: TaskPatch, now: DateTime<Utc>) -> bool {
        let Some(mut task) = self.find(id) else {
            debug!("event=task_update module=store status=rejected reason=unknown_id task_id={id}");
            return false;
        };

        let previous_due = task.due_at;
        if let Some(title) = patch.title {
            task.title = title;
        }
        if let Some(description) = patch.description {
            task.description = description;
        }
        if let Some(due) = patch.due {
            task.due_at = due.map(DueDate::normalized);
        }

        if let Err(err) = self.repo.create_or_replace(&task) {
            error!("event=task_update module=store status=error task_id={id} error={err}");
            return false;
        }
        self.load_all();

        if task.due_at != previous_due {
            if let Err(err) = self.scheduler.cancel(id) {
                error!("event=reminder_cancel module=store status=error task_id={id} error={err}");
            }
            if let Some(fire_at) = task.due_at.filter(|at| *at > now) {
                if let Err(err) = self.scheduler.schedule(id, &task.title, fire_at) {
                    error!(
                        "event=reminder_schedule module=store status=error task_id={id} error={err}"
                    );
                }
            }
        }

        true
    }

    /// Pure partition of the current list relative to `now`.
    pub fn derive_views(&self, now: DateTime<Utc>) -> TaskViews {
        derive_views(&self.tasks, now)
    }

    fn find(&self, id: TaskId) -> Option<Task> {
        self.tasks.iter().find(|task| task.id == id).cloned()
    }

    fn notify(&self) {
        for (_, observer) in &self.observers {
            observer(&self.tasks);
        }
    }
}
