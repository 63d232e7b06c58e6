use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashSet;
use tasknest_core::{derive_views, Task, TaskId};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, 23, 12, 0, 0).unwrap()
}

fn open_task(title: &str, due: Option<DateTime<Utc>>) -> Task {
    Task::new(title, None, due)
}

fn done_task(title: &str, due: DateTime<Utc>, completed_at: DateTime<Utc>) -> Task {
    let mut task = Task::new(title, None, Some(due));
    task.mark_completed(completed_at);
    task
}

#[test]
fn partitions_open_tasks_by_calendar_day() {
    let late_today = Utc.with_ymd_and_hms(2026, 8, 23, 23, 59, 0).unwrap();
    let tomorrow_midnight = Utc.with_ymd_and_hms(2026, 8, 24, 0, 0, 0).unwrap();
    let tasks = vec![
        open_task("due today", Some(late_today)),
        open_task("due tomorrow", Some(tomorrow_midnight)),
    ];

    let views = derive_views(&tasks, now());

    assert_eq!(views.today_active.len(), 1);
    assert_eq!(views.today_active[0].title, "due today");
    assert_eq!(views.future_active.len(), 1);
    assert_eq!(views.future_active[0].title, "due tomorrow");
    assert!(views.completed_today.is_empty());
}

#[test]
fn completed_today_requires_completion_on_nows_day() {
    let due = Utc.with_ymd_and_hms(2026, 8, 23, 9, 0, 0).unwrap();
    let done_today = done_task(
        "done today",
        due,
        Utc.with_ymd_and_hms(2026, 8, 23, 10, 0, 0).unwrap(),
    );
    let done_yesterday = done_task(
        "done yesterday",
        due,
        Utc.with_ymd_and_hms(2026, 8, 22, 10, 0, 0).unwrap(),
    );

    let views = derive_views(&[done_today.clone(), done_yesterday], now());

    assert_eq!(views.completed_today.len(), 1);
    assert_eq!(views.completed_today[0].id, done_today.id);
    assert!(views.today_active.is_empty());
    assert!(views.future_active.is_empty());
}

#[test]
fn tasks_without_due_date_are_excluded_from_every_view() {
    // Shipped behavior, preserved on purpose: even a task completed today
    // stays out of Completed-Today when it carries no due date.
    let undated_open = open_task("undated open", None);
    let mut undated_done = open_task("undated done", None);
    undated_done.mark_completed(Utc.with_ymd_and_hms(2026, 8, 23, 10, 0, 0).unwrap());

    let views = derive_views(&[undated_open, undated_done], now());

    assert!(views.today_active.is_empty());
    assert!(views.future_active.is_empty());
    assert!(views.completed_today.is_empty());
}

#[test]
fn overdue_open_tasks_land_in_no_active_view() {
    let overdue = open_task(
        "overdue",
        Some(Utc.with_ymd_and_hms(2026, 8, 20, 9, 0, 0).unwrap()),
    );

    let views = derive_views(&[overdue], now());

    assert!(views.today_active.is_empty());
    assert!(views.future_active.is_empty());
    assert!(views.completed_today.is_empty());
}

#[test]
fn views_are_pairwise_disjoint() {
    let tasks = vec![
        open_task(
            "today",
            Some(Utc.with_ymd_and_hms(2026, 8, 23, 18, 0, 0).unwrap()),
        ),
        open_task(
            "future",
            Some(Utc.with_ymd_and_hms(2026, 9, 1, 8, 0, 0).unwrap()),
        ),
        done_task(
            "done",
            Utc.with_ymd_and_hms(2026, 8, 23, 9, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 8, 23, 11, 0, 0).unwrap(),
        ),
        open_task("undated", None),
    ];

    let views = derive_views(&tasks, now());
    let ids = |view: &[Task]| view.iter().map(|task| task.id).collect::<HashSet<TaskId>>();

    let today = ids(&views.today_active);
    let future = ids(&views.future_active);
    let completed = ids(&views.completed_today);

    assert!(today.is_disjoint(&future));
    assert!(today.is_disjoint(&completed));
    assert!(future.is_disjoint(&completed));
    assert_eq!(today.len() + future.len() + completed.len(), 3);
}

#[test]
fn derive_views_does_not_mutate_input() {
    let tasks = vec![open_task(
        "today",
        Some(Utc.with_ymd_and_hms(2026, 8, 23, 18, 0, 0).unwrap()),
    )];
    let before = tasks.clone();

    let _ = derive_views(&tasks, now());

    assert_eq!(tasks, before);
}
