//! Reporting and dashboard aggregation
//!
//! All metrics are computed in Rust over scoped task slices fetched by the
//! repositories. Embedded-SurrealDB aggregate queries have known limits with
//! GROUP/LIMIT combinations, and plain folds are testable without a database.

use std::collections::HashMap;

use serde::Serialize;
use surrealdb::RecordId;

use crate::db::models::{Department, Role, Task, TaskStatus, User};

/// Per-status task counts plus the overdue count
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub cancelled: usize,
    pub overdue: usize,
}

/// Count tasks by status. A task is overdue when its due date has passed
/// while it is still pending or in progress.
pub fn status_counts(tasks: &[Task], now: i64) -> StatusCounts {
    let mut counts = StatusCounts {
        total: tasks.len(),
        ..Default::default()
    };
    for task in tasks {
        match task.status {
            TaskStatus::Pending => counts.pending += 1,
            TaskStatus::InProgress => counts.in_progress += 1,
            TaskStatus::Completed => counts.completed += 1,
            TaskStatus::Cancelled => counts.cancelled += 1,
        }
        if task.is_overdue(now) {
            counts.overdue += 1;
        }
    }
    counts
}

/// Round to one decimal place
fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// completed / max(total, 1) * 100, one decimal
pub fn completion_rate(completed: usize, total: usize) -> f64 {
    round1(completed as f64 / total.max(1) as f64 * 100.0)
}

/// on_time / completed * 100, one decimal; 0 when nothing is completed
pub fn on_time_rate(on_time: usize, completed: usize) -> f64 {
    if completed == 0 {
        return 0.0;
    }
    round1(on_time as f64 / completed as f64 * 100.0)
}

/// One team member's completion/progress summary
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberPerformance {
    pub user_id: String,
    pub full_name: String,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub completion_rate: f64,
    pub avg_progress: f64,
}

/// Group tasks by assignee and compute per-member performance, sorted by
/// completion rate descending. `names` maps "user:xyz" ids to display names.
pub fn team_performance(tasks: &[Task], names: &HashMap<String, String>) -> Vec<MemberPerformance> {
    let mut grouped: HashMap<String, Vec<&Task>> = HashMap::new();
    for task in tasks {
        if let Some(assignee) = &task.assigned_to {
            grouped.entry(assignee.to_string()).or_default().push(task);
        }
    }

    let mut rows: Vec<MemberPerformance> = grouped
        .into_iter()
        .map(|(user_id, member_tasks)| {
            let total = member_tasks.len();
            let completed = member_tasks
                .iter()
                .filter(|t| t.status == TaskStatus::Completed)
                .count();
            let avg_progress = if total == 0 {
                0.0
            } else {
                round1(
                    member_tasks.iter().map(|t| t.progress as f64).sum::<f64>() / total as f64,
                )
            };
            let full_name = names
                .get(&user_id)
                .cloned()
                .unwrap_or_else(|| "Unknown".to_string());
            MemberPerformance {
                user_id,
                full_name,
                total_tasks: total,
                completed_tasks: completed,
                completion_rate: completion_rate(completed, total),
                avg_progress,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.completion_rate
            .partial_cmp(&a.completion_rate)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.full_name.cmp(&b.full_name))
    });
    rows
}

/// Completion and punctuality summary for one member's task slice
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceDetail {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub on_time_completions: usize,
    pub completion_rate: f64,
    pub on_time_rate: f64,
}

/// A completion is on time when `completed_date <= due_date`
pub fn performance_detail(tasks: &[Task]) -> PerformanceDetail {
    let total = tasks.len();
    let completed: Vec<&Task> = tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Completed)
        .collect();
    let on_time = completed
        .iter()
        .filter(|t| t.completed_date.is_some_and(|d| d <= t.due_date))
        .count();

    PerformanceDetail {
        total_tasks: total,
        completed_tasks: completed.len(),
        on_time_completions: on_time,
        completion_rate: completion_rate(completed.len(), total),
        on_time_rate: on_time_rate(on_time, completed.len()),
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentCount {
    pub department: Department,
    pub count: usize,
}

/// Task counts per department, in the fixed department order
pub fn department_distribution(tasks: &[Task]) -> Vec<DepartmentCount> {
    Department::ALL
        .iter()
        .map(|&department| DepartmentCount {
            department,
            count: tasks.iter().filter(|t| t.department == department).count(),
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleCount {
    pub role: Role,
    pub count: usize,
}

/// User counts per role
pub fn role_distribution(users: &[User]) -> Vec<RoleCount> {
    [Role::Admin, Role::Manager, Role::Staff]
        .iter()
        .map(|&role| RoleCount {
            role,
            count: users.iter().filter(|u| u.role == role).count(),
        })
        .collect()
}

/// Build a "user:xyz" -> full name map
pub fn name_map(users: &[User]) -> HashMap<String, String> {
    users
        .iter()
        .filter_map(|u| u.id.as_ref().map(|id| (id.to_string(), u.full_name.clone())))
        .collect()
}

/// Per-member grouped tasks, keyed by the id wire form
pub fn tasks_by_assignee<'a>(tasks: &'a [Task], assignee: &RecordId) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|t| t.assigned_to.as_ref() == Some(assignee))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::Priority;
    use crate::utils::now_millis;

    fn task(
        status: TaskStatus,
        progress: u8,
        assignee: Option<&str>,
        due_date: i64,
        completed_date: Option<i64>,
    ) -> Task {
        Task {
            id: Some(RecordId::from_table_key("task", "t")),
            work_id: "TASK0001".into(),
            title: "t".into(),
            description: "d".into(),
            category: Department::Diary,
            department: Department::Diary,
            assigned_to: assignee.map(|a| RecordId::from_table_key("user", a)),
            assigned_by: None,
            created_by: RecordId::from_table_key("user", "admin"),
            priority: Priority::Medium,
            status,
            progress,
            start_date: 0,
            due_date,
            completed_date,
            comments: vec![],
            attachments: vec![],
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn counts_include_overdue() {
        let now = now_millis();
        let tasks = vec![
            task(TaskStatus::Pending, 0, None, now - 10, None),
            task(TaskStatus::InProgress, 50, None, now - 10, None),
            task(TaskStatus::Completed, 100, None, now - 10, Some(now - 20)),
            task(TaskStatus::Cancelled, 0, None, now - 10, None),
            task(TaskStatus::Pending, 0, None, now + 1000, None),
        ];
        let counts = status_counts(&tasks, now);
        assert_eq!(counts.total, 5);
        assert_eq!(counts.pending, 2);
        assert_eq!(counts.in_progress, 1);
        assert_eq!(counts.completed, 1);
        assert_eq!(counts.cancelled, 1);
        // Completed/cancelled past-due tasks are not overdue
        assert_eq!(counts.overdue, 2);
    }

    #[test]
    fn completion_rate_guards_empty_sets() {
        assert_eq!(completion_rate(0, 0), 0.0);
        assert_eq!(completion_rate(1, 3), 33.3);
        assert_eq!(completion_rate(2, 3), 66.7);
        assert_eq!(on_time_rate(0, 0), 0.0);
        assert_eq!(on_time_rate(1, 2), 50.0);
    }

    #[test]
    fn team_performance_groups_and_sorts() {
        let tasks = vec![
            task(TaskStatus::Completed, 100, Some("a"), 0, Some(0)),
            task(TaskStatus::Pending, 20, Some("a"), 0, None),
            task(TaskStatus::Completed, 100, Some("b"), 0, Some(0)),
            task(TaskStatus::Pending, 0, None, 0, None),
        ];
        let mut names = HashMap::new();
        names.insert("user:a".to_string(), "Alice".to_string());
        names.insert("user:b".to_string(), "Bob".to_string());

        let rows = team_performance(&tasks, &names);
        assert_eq!(rows.len(), 2);
        // Bob: 1/1 completed (100%) outranks Alice: 1/2 (50%)
        assert_eq!(rows[0].full_name, "Bob");
        assert_eq!(rows[0].completion_rate, 100.0);
        assert_eq!(rows[1].full_name, "Alice");
        assert_eq!(rows[1].completion_rate, 50.0);
        assert_eq!(rows[1].avg_progress, 60.0);
    }

    #[test]
    fn on_time_needs_completed_date_within_due() {
        let tasks = vec![
            task(TaskStatus::Completed, 100, Some("a"), 100, Some(90)),
            task(TaskStatus::Completed, 100, Some("a"), 100, Some(150)),
            task(TaskStatus::InProgress, 50, Some("a"), 100, None),
        ];
        let detail = performance_detail(&tasks);
        assert_eq!(detail.total_tasks, 3);
        assert_eq!(detail.completed_tasks, 2);
        assert_eq!(detail.on_time_completions, 1);
        assert_eq!(detail.on_time_rate, 50.0);
        assert_eq!(detail.completion_rate, 66.7);
    }

    #[test]
    fn distributions_cover_all_buckets() {
        let tasks = vec![task(TaskStatus::Pending, 0, None, 0, None)];
        let dist = department_distribution(&tasks);
        assert_eq!(dist.len(), 3);
        assert_eq!(dist[0].count, 1);
        assert_eq!(dist[1].count, 0);
    }
}
