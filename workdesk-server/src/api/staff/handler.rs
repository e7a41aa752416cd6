//! Staff handlers
//!
//! A task that exists but is assigned to someone else answers 404, the same
//! as a task that does not exist, so assignment cannot be probed.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::CurrentUser;
use crate::core::AppState;
use crate::db::models::{Notification, Priority, Task, TaskComment, TaskStatus, TaskUpdate};
use crate::db::repository::{NotificationRepository, TaskFilter, TaskRepository, TaskScope};
use crate::reporting;
use crate::services::notifier::{Notifier, TaskEvent};
use crate::utils::{
    ApiResponse, AppError, AppResult, now_millis, ok, ok_with_message,
    validation::{MAX_COMMENT_LENGTH, validate_progress, validate_required_text},
};

/// Fetch a task and hide it unless it is assigned to the caller
async fn own_task(repo: &TaskRepository, user: &CurrentUser, id: &str) -> AppResult<Task> {
    repo.find_by_id(id)
        .await?
        .filter(|t| t.is_assigned_to(&user.id))
        .ok_or_else(|| AppError::not_found("Task not found or not assigned to you"))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffDashboard {
    pub tasks: reporting::StatusCounts,
    pub recent_tasks: Vec<Task>,
    pub unread_notifications: Vec<Notification>,
}

/// GET /api/staff/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<StaffDashboard>>> {
    let tasks = TaskRepository::new(state.db())
        .list(TaskScope::Assignee(user.id.clone()), TaskFilter::default())
        .await?;
    let unread = NotificationRepository::new(state.db())
        .unread_for_user(&user.id, 5)
        .await?;

    Ok(ok(StaffDashboard {
        tasks: reporting::status_counts(&tasks, now_millis()),
        recent_tasks: tasks.into_iter().take(5).collect(),
        unread_notifications: unread,
    }))
}

#[derive(Debug, Default, Deserialize)]
pub struct MyTasksQuery {
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub search: Option<String>,
}

/// GET /api/staff/tasks
///
/// Own tasks, most urgent due date first.
pub async fn my_tasks(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<MyTasksQuery>,
) -> AppResult<Json<ApiResponse<Vec<Task>>>> {
    let mut tasks = TaskRepository::new(state.db())
        .list(
            TaskScope::Assignee(user.id.clone()),
            TaskFilter {
                status: query.status,
                priority: query.priority,
                search: query.search,
                ..Default::default()
            },
        )
        .await?;
    tasks.sort_by_key(|t| t.due_date);
    Ok(ok(tasks))
}

/// GET /api/staff/tasks/{id}
pub async fn task_details(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Task>>> {
    let repo = TaskRepository::new(state.db());
    let task = own_task(&repo, &user, &id).await?;
    Ok(ok(task))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProgressRequest {
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub progress: Option<u8>,
    /// Optional comment recorded alongside the change
    #[serde(default)]
    #[validate(length(max = 500, message = "Comment too long"))]
    pub comment: Option<String>,
}

/// PUT /api/staff/tasks/{id}/progress
///
/// Setting status to completed forces progress to 100 and stamps the
/// completion date. Changes fan out to admins, the department manager and
/// the task creator.
pub async fn update_progress(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateProgressRequest>,
) -> AppResult<Json<ApiResponse<Task>>> {
    payload.validate()?;
    if let Some(progress) = payload.progress {
        validate_progress(progress)?;
    }

    let repo = TaskRepository::new(state.db());
    let existing = own_task(&repo, &user, &id).await?;
    let old_status = existing.status;

    let mut updated = repo
        .update(
            &id,
            TaskUpdate {
                status: payload.status,
                progress: payload.progress,
                ..Default::default()
            },
        )
        .await?;

    let comment = payload
        .comment
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string);
    if let Some(text) = &comment {
        updated = repo
            .add_comment(
                &id,
                TaskComment {
                    user: user.id.clone(),
                    text: text.clone(),
                    created_at: now_millis(),
                },
            )
            .await?;
    }

    let notifier = Notifier::new(state.db());
    if updated.status != old_status {
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
    if let Some(text) = comment {
        notifier
            .task_event(&updated, &user, TaskEvent::Commented { text })
            .await?;
    }

    Ok(ok_with_message(updated, "Task updated"))
}

#[derive(Debug, Deserialize)]
pub struct AddCommentRequest {
    pub text: String,
}

/// POST /api/staff/tasks/{id}/comments
pub async fn add_comment(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<AddCommentRequest>,
) -> AppResult<Json<ApiResponse<Task>>> {
    validate_required_text(&payload.text, "Comment", MAX_COMMENT_LENGTH)?;
    let text = payload.text.trim().to_string();

    let repo = TaskRepository::new(state.db());
    own_task(&repo, &user, &id).await?;

    let updated = repo
        .add_comment(
            &id,
            TaskComment {
                user: user.id.clone(),
                text: text.clone(),
                created_at: now_millis(),
            },
        )
        .await?;

    Notifier::new(state.db())
        .task_event(&updated, &user, TaskEvent::Commented { text })
        .await?;

    Ok(ok_with_message(updated, "Comment added"))
}
