//! Task model with embedded comments and attachments

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::enums::{Department, Priority, TaskStatus};
use super::serde_helpers;

/// A work item
///
/// `work_id` (`TASK0001`, ...) is assigned at creation and never rewritten.
/// `completed_date` is set exactly when the status transitions to completed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    pub work_id: String,
    pub title: String,
    pub description: String,
    pub category: Department,
    pub department: Department,
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub assigned_to: Option<RecordId>,
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub assigned_by: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub created_by: RecordId,
    pub priority: Priority,
    pub status: TaskStatus,
    pub progress: u8,
    pub start_date: i64,
    pub due_date: i64,
    #[serde(default)]
    pub completed_date: Option<i64>,
    #[serde(default)]
    pub comments: Vec<TaskComment>,
    #[serde(default)]
    pub attachments: Vec<TaskAttachment>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Task {
    pub fn is_assigned_to(&self, user: &RecordId) -> bool {
        self.assigned_to.as_ref() == Some(user)
    }

    /// Past its due date while still pending or in progress
    pub fn is_overdue(&self, now: i64) -> bool {
        self.due_date < now
            && matches!(self.status, TaskStatus::Pending | TaskStatus::InProgress)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskComment {
    #[serde(with = "serde_helpers::record_id")]
    pub user: RecordId,
    pub text: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskAttachment {
    pub filename: String,
    pub path: String,
    pub uploaded_at: i64,
}

/// Fields for creating a task; the repository assigns `work_id`
#[derive(Debug, Clone)]
pub struct TaskCreate {
    pub title: String,
    pub description: String,
    pub category: Department,
    pub department: Department,
    pub assigned_to: Option<RecordId>,
    pub assigned_by: Option<RecordId>,
    pub created_by: RecordId,
    pub priority: Priority,
    pub start_date: i64,
    pub due_date: i64,
}

/// Partial update; absent fields keep their stored value.
/// A transition to completed forces progress to 100 and stamps
/// `completed_date` regardless of what else is supplied.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<Department>,
    pub department: Option<Department>,
    pub priority: Option<Priority>,
    pub status: Option<TaskStatus>,
    pub progress: Option<u8>,
    pub start_date: Option<i64>,
    pub due_date: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::now_millis;

    fn sample_task(status: TaskStatus, due_date: i64) -> Task {
        Task {
            id: Some(RecordId::from_table_key("task", "t1")),
            work_id: "TASK0001".into(),
            title: "Prepare report".into(),
            description: "Quarterly numbers".into(),
            category: Department::Diary,
            department: Department::Diary,
            assigned_to: None,
            assigned_by: None,
            created_by: RecordId::from_table_key("user", "admin"),
            priority: Priority::Medium,
            status,
            progress: 0,
            start_date: 0,
            due_date,
            completed_date: None,
            comments: vec![],
            attachments: vec![],
            created_at: now_millis(),
            updated_at: now_millis(),
        }
    }

    #[test]
    fn overdue_requires_open_status() {
        let now = now_millis();
        assert!(sample_task(TaskStatus::Pending, now - 1).is_overdue(now));
        assert!(sample_task(TaskStatus::InProgress, now - 1).is_overdue(now));
        assert!(!sample_task(TaskStatus::Completed, now - 1).is_overdue(now));
        assert!(!sample_task(TaskStatus::Cancelled, now - 1).is_overdue(now));
        assert!(!sample_task(TaskStatus::Pending, now + 1000).is_overdue(now));
    }

    #[test]
    fn wire_form_uses_camel_case() {
        let json = serde_json::to_value(sample_task(TaskStatus::Pending, 0)).unwrap();
        assert_eq!(json["workId"], "TASK0001");
        assert_eq!(json["createdBy"], "user:admin");
        assert_eq!(json["status"], "pending");
    }
}
