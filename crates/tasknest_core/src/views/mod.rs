//! Derived list views.
//!
//! # Responsibility
//! - Partition a task snapshot into the three disjoint views the UI renders.
//!
//! # Invariants
//! - The three views are pairwise disjoint.
//! - Tasks without a due date appear in none of the views, including
//!   completed ones. Surprising, but it matches the shipped behavior and is
//!   pinned by tests.
//! - `now` is an explicit parameter; this module never reads the clock.

use crate::model::task::Task;
use chrono::{DateTime, Utc};

/// Disjoint partition of the task list for presentation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskViews {
    /// Open tasks due on `now`'s calendar day.
    pub today_active: Vec<Task>,
    /// Open tasks due strictly after today.
    pub future_active: Vec<Task>,
    /// Completed tasks whose completion fell on `now`'s calendar day.
    pub completed_today: Vec<Task>,
}

/// Partitions `tasks` by calendar day relative to `now`.
///
/// Open tasks due before today land in no view; the caller decides how to
/// surface overdue work.
pub fn derive_views(tasks: &[Task], now: DateTime<Utc>) -> TaskViews {
    let today = now.date_naive();
    let mut views = TaskViews::default();

    for task in tasks {
        let Some(due_at) = task.due_at else {
            continue;
        };

        if task.is_completed {
            if let Some(completed_at) = task.completed_at {
                if completed_at.date_naive() == today {
                    views.completed_today.push(task.clone());
                }
            }
            continue;
        }

        let due_day = due_at.date_naive();
        if due_day == today {
            views.today_active.push(task.clone());
        } else if due_day > today {
            views.future_active.push(task.clone());
        }
    }

    views
}
