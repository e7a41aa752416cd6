//! Task repository
//!
//! List queries are composed from a visibility scope (who is asking) plus
//! optional filters, so every caller goes through the same query builder.

use serde::Deserialize;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::{BaseRepository, RepoError, RepoResult, parse_id};
use crate::db::models::{
    Department, Priority, Task, TaskAttachment, TaskComment, TaskCreate, TaskStatus, TaskUpdate,
};
use crate::utils::now_millis;

/// Visibility scope for task queries
#[derive(Debug, Clone)]
pub enum TaskScope {
    /// Everything (admin)
    Global,
    /// One department (manager)
    Department(Department),
    /// Tasks assigned to one user (staff)
    Assignee(RecordId),
}

/// Optional list filters, combined with AND
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub department: Option<Department>,
    pub category: Option<Department>,
    pub assigned_to: Option<RecordId>,
    pub unassigned_only: bool,
    pub search: Option<String>,
    pub created_from: Option<i64>,
    pub created_to: Option<i64>,
}

#[derive(Clone)]
pub struct TaskRepository {
    base: BaseRepository,
}

#[derive(Deserialize)]
struct WorkIdRow {
    #[serde(rename = "workId", default)]
    work_id: Option<String>,
}

impl TaskRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Scoped, filtered list, newest first
    pub async fn list(&self, scope: TaskScope, filter: TaskFilter) -> RepoResult<Vec<Task>> {
        let mut conditions: Vec<&str> = Vec::new();

        match &scope {
            TaskScope::Global => {}
            TaskScope::Department(_) => conditions.push("department = $scope_department"),
            TaskScope::Assignee(_) => conditions.push("assignedTo = $scope_assignee"),
        }
        if filter.status.is_some() {
            conditions.push("status = $status");
        }
        if filter.priority.is_some() {
            conditions.push("priority = $priority");
        }
        if filter.department.is_some() {
            conditions.push("department = $department");
        }
        if filter.category.is_some() {
            conditions.push("category = $category");
        }
        if filter.assigned_to.is_some() {
            conditions.push("assignedTo = $assigned_to");
        }
        if filter.unassigned_only {
            conditions.push("assignedTo = NONE");
        }
        if filter.search.is_some() {
            conditions.push(
                "(string::lowercase(title) CONTAINS $search \
                 OR string::lowercase(description) CONTAINS $search \
                 OR string::lowercase(workId) CONTAINS $search)",
            );
        }
        if filter.created_from.is_some() {
            conditions.push("createdAt >= $created_from");
        }
        if filter.created_to.is_some() {
            conditions.push("createdAt <= $created_to");
        }

        let mut sql = String::from("SELECT * FROM task");
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(" ORDER BY createdAt DESC");

        let mut query = self.base.db().query(sql);
        match scope {
            TaskScope::Global => {}
            TaskScope::Department(d) => query = query.bind(("scope_department", d)),
            TaskScope::Assignee(id) => query = query.bind(("scope_assignee", id)),
        }
        if let Some(status) = filter.status {
            query = query.bind(("status", status));
        }
        if let Some(priority) = filter.priority {
            query = query.bind(("priority", priority));
        }
        if let Some(department) = filter.department {
            query = query.bind(("department", department));
        }
        if let Some(category) = filter.category {
            query = query.bind(("category", category));
        }
        if let Some(assigned_to) = filter.assigned_to {
            query = query.bind(("assigned_to", assigned_to));
        }
        if let Some(search) = filter.search {
            query = query.bind(("search", search.trim().to_lowercase()));
        }
        if let Some(from) = filter.created_from {
            query = query.bind(("created_from", from));
        }
        if let Some(to) = filter.created_to {
            query = query.bind(("created_to", to));
        }

        let tasks: Vec<Task> = query.await?.take(0)?;
        Ok(tasks)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Task>> {
        let thing = parse_id(id)?;
        let task: Option<Task> = self.base.db().select(thing).await?;
        Ok(task)
    }

    /// Create a task with the next sequential work id
    pub async fn create(&self, data: TaskCreate) -> RepoResult<Task> {
        let work_id = self.next_work_id().await?;
        let now = now_millis();

        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE task SET
                    workId = $work_id,
                    title = $title,
                    description = $description,
                    category = $category,
                    department = $department,
                    assignedTo = $assigned_to,
                    assignedBy = $assigned_by,
                    createdBy = $created_by,
                    priority = $priority,
                    status = $status,
                    progress = 0,
                    startDate = $start_date,
                    dueDate = $due_date,
                    completedDate = NONE,
                    comments = [],
                    attachments = [],
                    createdAt = $now,
                    updatedAt = $now
                RETURN AFTER"#,
            )
            .bind(("work_id", work_id))
            .bind(("title", data.title))
            .bind(("description", data.description))
            .bind(("category", data.category))
            .bind(("department", data.department))
            .bind(("assigned_to", data.assigned_to))
            .bind(("assigned_by", data.assigned_by))
            .bind(("created_by", data.created_by))
            .bind(("priority", data.priority))
            .bind(("status", TaskStatus::Pending))
            .bind(("start_date", data.start_date))
            .bind(("due_date", data.due_date))
            .bind(("now", now))
            .await?;

        let created: Option<Task> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create task".to_string()))
    }

    /// Partial update. A transition into completed forces progress to 100 and
    /// stamps `completedDate`; `workId` is never rewritten.
    pub async fn update(&self, id: &str, data: TaskUpdate) -> RepoResult<Task> {
        let thing = parse_id(id)?;
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound("Task not found".to_string()))?;

        let now = now_millis();
        let status = data.status.unwrap_or(existing.status);
        let mut progress = data.progress.unwrap_or(existing.progress);
        let mut completed_date = existing.completed_date;
        if data.status == Some(TaskStatus::Completed) {
            progress = 100;
            completed_date = Some(completed_date.unwrap_or(now));
        }

        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    title = $title,
                    description = $description,
                    category = $category,
                    department = $department,
                    priority = $priority,
                    status = $status,
                    progress = $progress,
                    startDate = $start_date,
                    dueDate = $due_date,
                    completedDate = $completed_date,
                    updatedAt = $now
                RETURN AFTER"#,
            )
            .bind(("thing", thing))
            .bind(("title", data.title.unwrap_or(existing.title)))
            .bind(("description", data.description.unwrap_or(existing.description)))
            .bind(("category", data.category.unwrap_or(existing.category)))
            .bind(("department", data.department.unwrap_or(existing.department)))
            .bind(("priority", data.priority.unwrap_or(existing.priority)))
            .bind(("status", status))
            .bind(("progress", progress))
            .bind(("start_date", data.start_date.unwrap_or(existing.start_date)))
            .bind(("due_date", data.due_date.unwrap_or(existing.due_date)))
            .bind(("completed_date", completed_date))
            .bind(("now", now))
            .await?;

        result
            .take::<Option<Task>>(0)?
            .ok_or_else(|| RepoError::NotFound("Task not found".to_string()))
    }

    /// Hand a task to a staff member. Used both for claiming pool tasks and
    /// for re-assignment; the task moves to in_progress.
    pub async fn assign(
        &self,
        id: &str,
        assignee: RecordId,
        assigned_by: RecordId,
    ) -> RepoResult<Task> {
        let thing = parse_id(id)?;
        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    assignedTo = $assignee,
                    assignedBy = $assigned_by,
                    status = $status,
                    updatedAt = $now
                RETURN AFTER"#,
            )
            .bind(("thing", thing))
            .bind(("assignee", assignee))
            .bind(("assigned_by", assigned_by))
            .bind(("status", TaskStatus::InProgress))
            .bind(("now", now_millis()))
            .await?;

        result
            .take::<Option<Task>>(0)?
            .ok_or_else(|| RepoError::NotFound("Task not found".to_string()))
    }

    pub async fn add_comment(&self, id: &str, comment: TaskComment) -> RepoResult<Task> {
        let thing = parse_id(id)?;
        let mut result = self
            .base
            .db()
            .query("UPDATE $thing SET comments += $comment, updatedAt = $now RETURN AFTER")
            .bind(("thing", thing))
            .bind(("comment", comment))
            .bind(("now", now_millis()))
            .await?;
        result
            .take::<Option<Task>>(0)?
            .ok_or_else(|| RepoError::NotFound("Task not found".to_string()))
    }

    pub async fn add_attachment(&self, id: &str, attachment: TaskAttachment) -> RepoResult<Task> {
        let thing = parse_id(id)?;
        let mut result = self
            .base
            .db()
            .query("UPDATE $thing SET attachments += $attachment, updatedAt = $now RETURN AFTER")
            .bind(("thing", thing))
            .bind(("attachment", attachment))
            .bind(("now", now_millis()))
            .await?;
        result
            .take::<Option<Task>>(0)?
            .ok_or_else(|| RepoError::NotFound("Task not found".to_string()))
    }

    /// Hard delete
    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let thing = parse_id(id)?;
        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound("Task not found".to_string()))?;
        self.base
            .db()
            .query("DELETE $thing")
            .bind(("thing", thing))
            .await?;
        Ok(true)
    }

    /// Next sequential work id (`TASK0001`, `TASK0002`, ...)
    async fn next_work_id(&self) -> RepoResult<String> {
        let mut result = self.base.db().query("SELECT workId FROM task").await?;
        let rows: Vec<WorkIdRow> = result.take(0)?;
        let max = rows
            .iter()
            .filter_map(|r| r.work_id.as_deref())
            .filter_map(|s| s.strip_prefix("TASK"))
            .filter_map(|n| n.parse::<u32>().ok())
            .max()
            .unwrap_or(0);
        Ok(format!("TASK{:04}", max + 1))
    }
}
