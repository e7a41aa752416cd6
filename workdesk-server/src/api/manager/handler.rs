//! Manager handlers
//!
//! Tasks and team members outside the caller's department answer 404, the
//! same as ids that do not exist.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::tasks::handler::TaskListQuery;
use crate::auth::CurrentUser;
use crate::core::AppState;
use crate::db::models::{
    Department, Position, Priority, Role, Task, TaskCreate, TaskStatus, TaskUpdate, User,
    UserCreate,
};
use crate::db::repository::{TaskFilter, TaskRepository, TaskScope, UserRepository};
use crate::reporting;
use crate::services::notifier::Notifier;
use crate::utils::{ApiResponse, AppError, AppResult, now_millis, ok, ok_with_message};

/// Fetch a task and hide it unless it belongs to the caller's department
async fn department_task(
    repo: &TaskRepository,
    manager: &CurrentUser,
    id: &str,
) -> AppResult<Task> {
    repo.find_by_id(id)
        .await?
        .filter(|t| t.department == manager.department)
        .ok_or_else(|| AppError::not_found("Task not found"))
}

/// Fetch a staff member and hide them unless they are on the caller's team
async fn team_member(
    users: &UserRepository,
    manager: &CurrentUser,
    id: &str,
) -> AppResult<User> {
    users
        .find_by_id(id)
        .await?
        .filter(|u| u.role == Role::Staff && u.department == manager.department)
        .ok_or_else(|| AppError::not_found("Team member not found"))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerDashboard {
    pub team_size: usize,
    pub tasks: reporting::StatusCounts,
    pub completion_rate: f64,
    pub team_performance: Vec<reporting::MemberPerformance>,
    pub recent_tasks: Vec<Task>,
}

/// GET /api/manager/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    manager: CurrentUser,
) -> AppResult<Json<ApiResponse<ManagerDashboard>>> {
    let users = UserRepository::new(state.db());
    let team = users.team_members(manager.department, None).await?;
    let colleagues = users.find_by_department(manager.department).await?;
    let tasks = TaskRepository::new(state.db())
        .list(TaskScope::Department(manager.department), TaskFilter::default())
        .await?;

    let counts = reporting::status_counts(&tasks, now_millis());
    let names = reporting::name_map(&colleagues);

    Ok(ok(ManagerDashboard {
        team_size: team.len(),
        completion_rate: reporting::completion_rate(counts.completed, counts.total),
        tasks: counts,
        team_performance: reporting::team_performance(&tasks, &names),
        recent_tasks: tasks.into_iter().take(8).collect(),
    }))
}

#[derive(Debug, Default, Deserialize)]
pub struct TeamQuery {
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub user: User,
    pub tasks: reporting::StatusCounts,
}

/// GET /api/manager/team
pub async fn team(
    State(state): State<AppState>,
    manager: CurrentUser,
    Query(query): Query<TeamQuery>,
) -> AppResult<Json<ApiResponse<Vec<TeamMember>>>> {
    let members = UserRepository::new(state.db())
        .team_members(manager.department, query.search.as_deref())
        .await?;
    let dept_tasks = TaskRepository::new(state.db())
        .list(TaskScope::Department(manager.department), TaskFilter::default())
        .await?;

    let now = now_millis();
    let rows = members
        .into_iter()
        .map(|user| {
            let member_tasks: Vec<Task> = user
                .id
                .as_ref()
                .map(|id| {
                    reporting::tasks_by_assignee(&dept_tasks, id)
                        .into_iter()
                        .cloned()
                        .collect()
                })
                .unwrap_or_default();
            TeamMember {
                tasks: reporting::status_counts(&member_tasks, now),
                user,
            }
        })
        .collect();
    Ok(ok(rows))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddStaffRequest {
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 6, max = 128, message = "Password must be 6-128 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 200, message = "Full name is required"))]
    pub full_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub position: Option<Position>,
}

/// POST /api/manager/team
///
/// New accounts land as staff in the manager's own department.
pub async fn add_staff(
    State(state): State<AppState>,
    manager: CurrentUser,
    Json(payload): Json<AddStaffRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    payload.validate()?;

    let user = UserRepository::new(state.db())
        .create(UserCreate {
            username: payload.username,
            email: payload.email,
            password: payload.password,
            full_name: payload.full_name,
            role: Role::Staff,
            department: manager.department,
            phone: payload.phone,
            position: payload.position.unwrap_or(Position::Staff),
        })
        .await?;

    tracing::info!(user = %user.username, by = %manager.username, "staff added");
    Ok(ok_with_message(user, "Staff member added"))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDetails {
    pub user: User,
    pub performance: reporting::PerformanceDetail,
    pub recent_tasks: Vec<Task>,
}

/// GET /api/manager/team/{id}
pub async fn member_details(
    State(state): State<AppState>,
    manager: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<MemberDetails>>> {
    let users = UserRepository::new(state.db());
    let user = team_member(&users, &manager, &id).await?;
    let member_id = user
        .id
        .clone()
        .ok_or_else(|| AppError::internal("User row without id"))?;

    let tasks = TaskRepository::new(state.db())
        .list(TaskScope::Assignee(member_id), TaskFilter::default())
        .await?;

    Ok(ok(MemberDetails {
        performance: reporting::performance_detail(&tasks),
        recent_tasks: tasks.into_iter().take(5).collect(),
        user,
    }))
}

/// GET /api/manager/team/{id}/tasks
pub async fn member_tasks(
    State(state): State<AppState>,
    manager: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Vec<Task>>>> {
    let users = UserRepository::new(state.db());
    let user = team_member(&users, &manager, &id).await?;
    let member_id = user
        .id
        .ok_or_else(|| AppError::internal("User row without id"))?;

    let tasks = TaskRepository::new(state.db())
        .list(TaskScope::Assignee(member_id), TaskFilter::default())
        .await?;
    Ok(ok(tasks))
}

/// GET /api/manager/tasks
pub async fn department_tasks(
    State(state): State<AppState>,
    manager: CurrentUser,
    Query(query): Query<TaskListQuery>,
) -> AppResult<Json<ApiResponse<Vec<Task>>>> {
    let tasks = TaskRepository::new(state.db())
        .list(
            TaskScope::Department(manager.department),
            query.into_filter()?,
        )
        .await?;
    Ok(ok(tasks))
}

/// GET /api/manager/tasks/unassigned
pub async fn unassigned_tasks(
    State(state): State<AppState>,
    manager: CurrentUser,
) -> AppResult<Json<ApiResponse<Vec<Task>>>> {
    let tasks = TaskRepository::new(state.db())
        .list(
            TaskScope::Department(manager.department),
            TaskFilter {
                unassigned_only: true,
                ..Default::default()
            },
        )
        .await?;
    Ok(ok(tasks))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AssignTaskRequest {
    /// Existing pool task to claim; omitted to create a new assigned task
    #[serde(default)]
    pub task_id: Option<String>,
    pub assigned_to: String,
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 2000, message = "Description must be 1-2000 characters"))]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<Department>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub due_date: Option<i64>,
}

/// POST /api/manager/tasks/assign
///
/// Two modes: claim an existing department task for a staff member, or
/// create a new task already assigned. Claiming moves it to in_progress.
pub async fn assign_task(
    State(state): State<AppState>,
    manager: CurrentUser,
    Json(payload): Json<AssignTaskRequest>,
) -> AppResult<Json<ApiResponse<Task>>> {
    payload.validate()?;

    let users = UserRepository::new(state.db());
    let assignee_id: surrealdb::RecordId = payload
        .assigned_to
        .parse()
        .map_err(|_| AppError::validation("Invalid staff member selected"))?;
    let assignee = users
        .find_by_id(&payload.assigned_to)
        .await?
        .filter(|u| u.role == Role::Staff && u.department == manager.department)
        .ok_or_else(|| AppError::validation("Invalid staff member selected"))?;

    let repo = TaskRepository::new(state.db());
    let task = match payload.task_id {
        Some(task_id) => {
            department_task(&repo, &manager, &task_id).await?;
            repo.assign(&task_id, assignee_id, manager.id.clone()).await?
        }
        None => {
            let title = payload
                .title
                .ok_or_else(|| AppError::validation("Title is required"))?;
            let description = payload
                .description
                .ok_or_else(|| AppError::validation("Description is required"))?;
            let due_date = payload
                .due_date
                .ok_or_else(|| AppError::validation("Due date is required"))?;

            repo.create(TaskCreate {
                title,
                description,
                category: payload.category.unwrap_or(manager.department),
                department: manager.department,
                assigned_to: Some(assignee_id),
                assigned_by: Some(manager.id.clone()),
                created_by: manager.id.clone(),
                priority: payload.priority.unwrap_or(Priority::Medium),
                start_date: now_millis(),
                due_date,
            })
            .await?
        }
    };

    Notifier::new(state.db())
        .task_assigned(&task, &assignee, &manager)
        .await?;

    tracing::info!(work_id = %task.work_id, to = %assignee.username, "task assigned");
    Ok(ok_with_message(task, "Task assigned"))
}

/// GET /api/manager/tasks/{id}
pub async fn task_details(
    State(state): State<AppState>,
    manager: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Task>>> {
    let repo = TaskRepository::new(state.db());
    let task = department_task(&repo, &manager, &id).await?;
    Ok(ok(task))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ManagerTaskUpdate {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 2000, message = "Description must be 1-2000 characters"))]
    pub description: Option<String>,
    pub category: Option<Department>,
    pub priority: Option<Priority>,
    pub status: Option<TaskStatus>,
    pub progress: Option<u8>,
    pub due_date: Option<i64>,
}

/// PUT /api/manager/tasks/{id}
pub async fn update_task(
    State(state): State<AppState>,
    manager: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<ManagerTaskUpdate>,
) -> AppResult<Json<ApiResponse<Task>>> {
    payload.validate()?;
    if let Some(progress) = payload.progress {
        crate::utils::validation::validate_progress(progress)?;
    }

    let repo = TaskRepository::new(state.db());
    let existing = department_task(&repo, &manager, &id).await?;
    let old_status = existing.status;

    let updated = repo
        .update(
            &id,
            TaskUpdate {
                title: payload.title,
                description: payload.description,
                category: payload.category,
                priority: payload.priority,
                status: payload.status,
                progress: payload.progress,
                due_date: payload.due_date,
                ..Default::default()
            },
        )
        .await?;

    if updated.status != old_status {
        Notifier::new(state.db())
            .status_changed(&updated, &manager)
            .await?;
    }
    Ok(ok_with_message(updated, "Task updated"))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: TaskStatus,
}

/// PUT /api/manager/tasks/{id}/status
pub async fn update_status(
    State(state): State<AppState>,
    manager: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<Json<ApiResponse<Task>>> {
    let repo = TaskRepository::new(state.db());
    let existing = department_task(&repo, &manager, &id).await?;
    let old_status = existing.status;

    let updated = repo
        .update(
            &id,
            TaskUpdate {
                status: Some(payload.status),
                ..Default::default()
            },
        )
        .await?;

    if updated.status != old_status {
        Notifier::new(state.db())
            .status_changed(&updated, &manager)
            .await?;
    }
    Ok(ok_with_message(updated, "Task status updated"))
}

/// GET /api/manager/performance
pub async fn team_performance(
    State(state): State<AppState>,
    manager: CurrentUser,
) -> AppResult<Json<ApiResponse<Vec<reporting::MemberPerformance>>>> {
    let colleagues = UserRepository::new(state.db())
        .find_by_department(manager.department)
        .await?;
    let tasks = TaskRepository::new(state.db())
        .list(TaskScope::Department(manager.department), TaskFilter::default())
        .await?;

    let names = reporting::name_map(&colleagues);
    Ok(ok(reporting::team_performance(&tasks, &names)))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberPerformanceDetail {
    pub user: User,
    pub performance: reporting::PerformanceDetail,
    pub recent_activity: Vec<Task>,
}

/// GET /api/manager/performance/{id}
pub async fn member_performance(
    State(state): State<AppState>,
    manager: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<MemberPerformanceDetail>>> {
    let users = UserRepository::new(state.db());
    let user = team_member(&users, &manager, &id).await?;
    let member_id = user
        .id
        .clone()
        .ok_or_else(|| AppError::internal("User row without id"))?;

    let mut tasks = TaskRepository::new(state.db())
        .list(TaskScope::Assignee(member_id), TaskFilter::default())
        .await?;
    let performance = reporting::performance_detail(&tasks);

    tasks.sort_by_key(|t| std::cmp::Reverse(t.updated_at));
    Ok(ok(MemberPerformanceDetail {
        user,
        performance,
        recent_activity: tasks.into_iter().take(5).collect(),
    }))
}
