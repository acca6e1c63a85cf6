use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::rates::completion_percentage;
use crate::models::{GardenTask, TaskStatus};

/// How many incomplete tasks the dashboard previews.
pub const PENDING_PREVIEW_LEN: usize = 3;

/// Incomplete before completed, then high < medium < low priority, then
/// earliest due date.
pub fn task_ordering(a: &GardenTask, b: &GardenTask) -> Ordering {
    a.is_completed()
        .cmp(&b.is_completed())
        .then_with(|| a.priority.rank().cmp(&b.priority.rank()))
        .then_with(|| a.due_date.cmp(&b.due_date))
}

pub fn sort_tasks(tasks: &mut [&GardenTask]) {
    tasks.sort_by(|a, b| task_ordering(a, b));
}

/// Tasks that are not completed and whose due date is strictly before `now`.
pub fn overdue_tasks(tasks: &[GardenTask], now: DateTime<Utc>) -> Vec<&GardenTask> {
    tasks.iter().filter(|t| t.is_overdue(now)).collect()
}

/// First `limit` incomplete tasks, in store order.
pub fn pending_preview(tasks: &[GardenTask], limit: usize) -> Vec<&GardenTask> {
    tasks.iter().filter(|t| !t.is_completed()).take(limit).collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TaskSummary {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub overdue: usize,
    pub completion_percentage: i64,
}

pub fn task_summary(tasks: &[GardenTask], now: DateTime<Utc>) -> TaskSummary {
    let mut summary = TaskSummary {
        total: tasks.len(),
        ..Default::default()
    };
    for task in tasks {
        match task.status {
            TaskStatus::Pending => summary.pending += 1,
            TaskStatus::InProgress => summary.in_progress += 1,
            TaskStatus::Completed => summary.completed += 1,
        }
        if task.is_overdue(now) {
            summary.overdue += 1;
        }
    }
    summary.completion_percentage = completion_percentage(summary.completed, summary.total);
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    use crate::models::{NewTask, TaskCategory, TaskPriority};

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap() + Duration::days(n)
    }

    fn task(id: &str, priority: TaskPriority, status: TaskStatus, due: DateTime<Utc>) -> GardenTask {
        GardenTask::from_new(
            id.to_string(),
            NewTask {
                title: id.to_string(),
                description: String::new(),
                due_date: due,
                priority,
                category: TaskCategory::General,
                status,
                bed_id: None,
            },
            day(0),
        )
    }

    fn fixture() -> Vec<GardenTask> {
        vec![
            task("A", TaskPriority::High, TaskStatus::Pending, day(2)),
            task("B", TaskPriority::High, TaskStatus::Pending, day(1)),
            task("C", TaskPriority::Low, TaskStatus::Pending, day(1)),
            task("D", TaskPriority::Medium, TaskStatus::Completed, day(0)),
        ]
    }

    #[test]
    fn test_sort_incomplete_then_priority_then_due() {
        let tasks = fixture();
        let mut refs: Vec<&GardenTask> = tasks.iter().collect();
        sort_tasks(&mut refs);
        let order: Vec<_> = refs.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(order, vec!["B", "A", "C", "D"]);
    }

    #[test]
    fn test_overdue_is_strict_and_skips_completed() {
        let tasks = fixture();
        let ids: Vec<_> = overdue_tasks(&tasks, day(1)).iter().map(|t| t.id.as_str()).collect();
        assert!(ids.is_empty());

        let ids: Vec<_> = overdue_tasks(&tasks, day(1) + Duration::seconds(1))
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(ids, vec!["B", "C"]);
    }

    #[test]
    fn test_pending_preview_takes_incomplete_in_order() {
        let mut tasks = fixture();
        tasks.insert(0, task("E", TaskPriority::Low, TaskStatus::Completed, day(3)));
        let ids: Vec<_> = pending_preview(&tasks, PENDING_PREVIEW_LEN)
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(ids, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_task_summary_counts() {
        let mut tasks = fixture();
        tasks.push(task("F", TaskPriority::Low, TaskStatus::InProgress, day(5)));
        let summary = task_summary(&tasks, day(3));
        assert_eq!(
            summary,
            TaskSummary {
                total: 5,
                pending: 3,
                in_progress: 1,
                completed: 1,
                overdue: 3,
                completion_percentage: 20,
            }
        );
        assert_eq!(task_summary(&[], day(0)).completion_percentage, 0);
    }
}
