//! Shared task handlers

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

use crate::auth::CurrentUser;
use crate::db::models::{
    Department, Priority, Role, Task, TaskAttachment, TaskCreate, TaskStatus, TaskUpdate, User,
};
use crate::db::repository::{TaskFilter, TaskRepository, TaskScope, UserRepository};
use crate::core::AppState;
use crate::reporting;
use crate::services::notifier::{Notifier, TaskEvent};
use crate::services::uploads;
use crate::utils::{
    ApiResponse, AppError, AppResult, now_millis, ok, ok_message, ok_with_message,
    validation::validate_progress,
};

/// Visibility scope for the calling role
fn scope_for(user: &CurrentUser) -> TaskScope {
    match user.role {
        Role::Admin => TaskScope::Global,
        Role::Manager => TaskScope::Department(user.department),
        Role::Staff => TaskScope::Assignee(user.id.clone()),
    }
}

fn parse_user_id(id: &str) -> AppResult<RecordId> {
    id.parse()
        .map_err(|_| AppError::validation(format!("Invalid user id: {}", id)))
}

/// Whether `user` may see `task` through the shared namespace
fn can_view(user: &CurrentUser, task: &Task) -> bool {
    match user.role {
        Role::Admin => true,
        Role::Manager => task.department == user.department,
        Role::Staff => task.is_assigned_to(&user.id),
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskListQuery {
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub department: Option<Department>,
    pub category: Option<Department>,
    pub assigned_to: Option<String>,
    pub search: Option<String>,
}

impl TaskListQuery {
    pub fn into_filter(self) -> AppResult<TaskFilter> {
        let assigned_to = self.assigned_to.as_deref().map(parse_user_id).transpose()?;
        Ok(TaskFilter {
            status: self.status,
            priority: self.priority,
            department: self.department,
            category: self.category,
            assigned_to,
            search: self.search,
            ..Default::default()
        })
    }
}

/// GET /api/tasks
pub async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<TaskListQuery>,
) -> AppResult<Json<ApiResponse<Vec<Task>>>> {
    let tasks = TaskRepository::new(state.db())
        .list(scope_for(&user), query.into_filter()?)
        .await?;
    Ok(ok(tasks))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub stats: reporting::StatusCounts,
    pub recent_tasks: Vec<Task>,
}

/// GET /api/tasks/stats
pub async fn stats(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<TaskStats>>> {
    let tasks = TaskRepository::new(state.db())
        .list(scope_for(&user), TaskFilter::default())
        .await?;
    let counts = reporting::status_counts(&tasks, now_millis());
    let recent_tasks = tasks.into_iter().take(5).collect();
    Ok(ok(TaskStats {
        stats: counts,
        recent_tasks,
    }))
}

/// GET /api/tasks/{id}
///
/// Out-of-scope tasks answer 404, not 403, so ids cannot be probed.
pub async fn get_task(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Task>>> {
    let task = TaskRepository::new(state.db())
        .find_by_id(&id)
        .await?
        .filter(|t| can_view(&user, t))
        .ok_or_else(|| AppError::not_found("Task not found"))?;
    Ok(ok(task))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 2000, message = "Description must be 1-2000 characters"))]
    pub description: String,
    #[serde(default)]
    pub department: Option<Department>,
    #[serde(default)]
    pub category: Option<Department>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub start_date: Option<i64>,
    pub due_date: i64,
}

/// Resolve and vet an assignee id for the caller's role
async fn resolve_assignee(
    users: &UserRepository,
    caller: &CurrentUser,
    assigned_to: Option<&str>,
) -> AppResult<Option<User>> {
    let Some(raw) = assigned_to else {
        return Ok(None);
    };
    let id = parse_user_id(raw)?;
    let assignee = users
        .find_by_id(&id.to_string())
        .await?
        .ok_or_else(|| AppError::validation("Assignee does not exist"))?;

    // Managers hand tasks to their own staff; admins may assign anyone
    if caller.role == Role::Manager
        && (assignee.role != Role::Staff || assignee.department != caller.department)
    {
        return Err(AppError::validation("Invalid staff member selected"));
    }
    Ok(Some(assignee))
}

/// POST /api/tasks (admin, manager)
///
/// Admin creations fan out to the target department's active managers;
/// manager creations notify the assignee.
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<CreateTaskRequest>,
) -> AppResult<Json<ApiResponse<Task>>> {
    payload.validate()?;

    let users = UserRepository::new(state.db());
    let department = match user.role {
        Role::Admin => payload.department.unwrap_or(user.department),
        _ => user.department,
    };
    let assignee = resolve_assignee(&users, &user, payload.assigned_to.as_deref()).await?;

    let task = TaskRepository::new(state.db())
        .create(TaskCreate {
            title: payload.title,
            description: payload.description,
            category: payload.category.unwrap_or(department),
            department,
            assigned_to: assignee.as_ref().and_then(|a| a.id.clone()),
            assigned_by: assignee.as_ref().map(|_| user.id.clone()),
            created_by: user.id.clone(),
            priority: payload.priority.unwrap_or(Priority::Medium),
            start_date: payload.start_date.unwrap_or_else(now_millis),
            due_date: payload.due_date,
        })
        .await?;

    let notifier = Notifier::new(state.db());
    match user.role {
        Role::Admin => {
            notifier.task_created(&task, &user).await?;
        }
        _ => {
            if let Some(assignee) = &assignee {
                notifier.task_assigned(&task, assignee, &user).await?;
            }
        }
    }

    tracing::info!(work_id = %task.work_id, by = %user.username, "task created");
    Ok(ok_with_message(task, "Task created"))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 2000, message = "Description must be 1-2000 characters"))]
    pub description: Option<String>,
    pub category: Option<Department>,
    pub department: Option<Department>,
    pub priority: Option<Priority>,
    pub status: Option<TaskStatus>,
    pub progress: Option<u8>,
    pub start_date: Option<i64>,
    pub due_date: Option<i64>,
}

/// PUT /api/tasks/{id}
///
/// Staff may only touch their own tasks and only status/progress; managers
/// are confined to their department. Setting status to completed forces
/// progress to 100 and stamps the completion date.
pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateTaskRequest>,
) -> AppResult<Json<ApiResponse<Task>>> {
    payload.validate()?;
    if let Some(progress) = payload.progress {
        validate_progress(progress)?;
    }

    let repo = TaskRepository::new(state.db());
    let existing = repo
        .find_by_id(&id)
        .await?
        .filter(|t| can_view(&user, t))
        .ok_or_else(|| AppError::not_found("Task not found"))?;
    let old_status = existing.status;

    let update = match user.role {
        Role::Staff => TaskUpdate {
            status: payload.status,
            progress: payload.progress,
            ..Default::default()
        },
        _ => TaskUpdate {
            title: payload.title,
            description: payload.description,
            category: payload.category,
            department: payload.department,
            priority: payload.priority,
            status: payload.status,
            progress: payload.progress,
            start_date: payload.start_date,
            due_date: payload.due_date,
        },
    };

    let updated = repo.update(&id, update).await?;

    if updated.status != old_status {
        let notifier = Notifier::new(state.db());
        match user.role {
            Role::Staff => {
                notifier
                    .task_event(
                        &updated,
                        &user,
                        TaskEvent::StatusChanged {
                            from: old_status,
                            to: updated.status,
                        },
                    )
                    .await?;
            }
            _ => {
                notifier.status_changed(&updated, &user).await?;
            }
        }
    }

    Ok(ok_with_message(updated, "Task updated"))
}

/// DELETE /api/tasks/{id} (admin)
pub async fn remove(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    TaskRepository::new(state.db()).delete(&id).await?;
    tracing::info!(task = %id, by = %user.username, "task deleted");
    Ok(ok_message("Task deleted"))
}

/// POST /api/tasks/{id}/attachment (admin, manager)
pub async fn upload_attachment(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    multipart: Multipart,
) -> AppResult<Json<ApiResponse<Task>>> {
    let repo = TaskRepository::new(state.db());
    repo.find_by_id(&id)
        .await?
        .filter(|t| can_view(&user, t))
        .ok_or_else(|| AppError::not_found("Task not found"))?;

    let stored = uploads::receive_file(&state.config().uploads_dir(), multipart).await?;
    let updated = repo
        .add_attachment(
            &id,
            TaskAttachment {
                filename: stored.original_name,
                path: stored.relative_path,
                uploaded_at: now_millis(),
            },
        )
        .await?;
    Ok(ok_with_message(updated, "Attachment uploaded"))
}
