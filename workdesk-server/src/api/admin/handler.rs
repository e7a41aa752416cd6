//! Admin handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::CurrentUser;
use crate::core::AppState;
use crate::db::models::{
    Department, Position, Role, Task, User, UserCreate, UserStatus, UserUpdate,
};
use crate::db::repository::{TaskFilter, TaskRepository, TaskScope, UserRepository};
use crate::reporting;
use crate::utils::{
    ApiResponse, AppError, AppResult, now_millis, ok, ok_message, ok_with_message,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCounts {
    pub total: usize,
    pub managers: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminDashboard {
    pub users: UserCounts,
    pub tasks: reporting::StatusCounts,
    pub recent_tasks: Vec<Task>,
    pub recent_users: Vec<User>,
}

/// GET /api/admin/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<AdminDashboard>>> {
    let users = UserRepository::new(state.db()).find_all().await?;
    let tasks = TaskRepository::new(state.db())
        .list(TaskScope::Global, TaskFilter::default())
        .await?;

    let counts = reporting::status_counts(&tasks, now_millis());
    let managers = users.iter().filter(|u| u.role == Role::Manager).count();

    Ok(ok(AdminDashboard {
        users: UserCounts {
            total: users.len(),
            managers,
        },
        tasks: counts,
        recent_tasks: tasks.into_iter().take(8).collect(),
        recent_users: users.into_iter().take(5).collect(),
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub task_distribution: Vec<reporting::DepartmentCount>,
    pub user_distribution: Vec<reporting::RoleCount>,
    pub completion_rate: f64,
}

/// GET /api/admin/analytics
pub async fn analytics(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Analytics>>> {
    let users = UserRepository::new(state.db()).find_all().await?;
    let tasks = TaskRepository::new(state.db())
        .list(TaskScope::Global, TaskFilter::default())
        .await?;

    let counts = reporting::status_counts(&tasks, now_millis());
    Ok(ok(Analytics {
        task_distribution: reporting::department_distribution(&tasks),
        user_distribution: reporting::role_distribution(&users),
        completion_rate: reporting::completion_rate(counts.completed, counts.total),
    }))
}

/// GET /api/admin/users
pub async fn list_users(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<User>>>> {
    let users = UserRepository::new(state.db()).find_all().await?;
    Ok(ok(users))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 6, max = 128, message = "Password must be 6-128 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 200, message = "Full name is required"))]
    pub full_name: String,
    pub department: Department,
    pub role: Role,
    #[serde(default)]
    pub position: Option<Position>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// POST /api/admin/users
pub async fn create_user(
    State(state): State<AppState>,
    admin: CurrentUser,
    Json(payload): Json<CreateUserRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    payload.validate()?;

    let user = UserRepository::new(state.db())
        .create(UserCreate {
            username: payload.username,
            email: payload.email,
            password: payload.password,
            full_name: payload.full_name,
            role: payload.role,
            department: payload.department,
            phone: payload.phone,
            position: payload.position.unwrap_or(Position::Staff),
        })
        .await?;

    tracing::info!(user = %user.username, by = %admin.username, "user created");
    Ok(ok_with_message(user, "User created"))
}

/// GET /api/admin/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<User>>> {
    let user = UserRepository::new(state.db())
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    Ok(ok(user))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 200, message = "Full name must be 1-200 characters"))]
    pub full_name: Option<String>,
    pub role: Option<Role>,
    pub department: Option<Department>,
    pub position: Option<Position>,
    pub status: Option<UserStatus>,
    pub phone: Option<String>,
}

/// PUT /api/admin/users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    payload.validate()?;

    let updated = UserRepository::new(state.db())
        .update(
            &id,
            UserUpdate {
                username: payload.username,
                email: payload.email,
                full_name: payload.full_name,
                role: payload.role,
                department: payload.department,
                phone: payload.phone,
                position: payload.position,
                status: payload.status,
            },
        )
        .await?;
    Ok(ok_with_message(updated, "User updated"))
}

/// DELETE /api/admin/users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    admin: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    if admin.id_string() == id {
        return Err(AppError::validation("Cannot delete your own account"));
    }
    UserRepository::new(state.db()).delete(&id).await?;
    tracing::info!(user = %id, by = %admin.username, "user deleted");
    Ok(ok_message("User deleted"))
}

/// PUT /api/admin/users/{id}/status
pub async fn toggle_user_status(
    State(state): State<AppState>,
    admin: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<User>>> {
    if admin.id_string() == id {
        return Err(AppError::validation("Cannot change your own status"));
    }
    let updated = UserRepository::new(state.db()).toggle_status(&id).await?;
    Ok(ok_with_message(updated, "User status updated"))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnassignedQuery {
    pub department: Option<Department>,
}

/// GET /api/admin/tasks/unassigned
pub async fn unassigned_tasks(
    State(state): State<AppState>,
    Query(query): Query<UnassignedQuery>,
) -> AppResult<Json<ApiResponse<Vec<Task>>>> {
    let tasks = TaskRepository::new(state.db())
        .list(
            TaskScope::Global,
            TaskFilter {
                unassigned_only: true,
                department: query.department,
                ..Default::default()
            },
        )
        .await?;
    Ok(ok(tasks))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserReport {
    pub generated_at: i64,
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    pub by_role: Vec<reporting::RoleCount>,
    pub users: Vec<User>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserReportQuery {
    pub department: Option<Department>,
}

/// GET /api/admin/reports/users
pub async fn user_report(
    State(state): State<AppState>,
    Query(query): Query<UserReportQuery>,
) -> AppResult<Json<ApiResponse<UserReport>>> {
    let mut users = UserRepository::new(state.db()).find_all().await?;
    if let Some(department) = query.department {
        users.retain(|u| u.department == department);
    }

    let active = users.iter().filter(|u| u.is_active()).count();
    Ok(ok(UserReport {
        generated_at: now_millis(),
        total: users.len(),
        active,
        inactive: users.len() - active,
        by_role: reporting::role_distribution(&users),
        users,
    }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskReportQuery {
    pub start_date: Option<i64>,
    pub end_date: Option<i64>,
    pub department: Option<Department>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskReport {
    pub generated_at: i64,
    pub stats: reporting::StatusCounts,
    pub completion_rate: f64,
    pub tasks: Vec<Task>,
}

/// GET /api/admin/reports/tasks
///
/// Optional creation-date window plus department filter.
pub async fn task_report(
    State(state): State<AppState>,
    Query(query): Query<TaskReportQuery>,
) -> AppResult<Json<ApiResponse<TaskReport>>> {
    let tasks = TaskRepository::new(state.db())
        .list(
            TaskScope::Global,
            TaskFilter {
                department: query.department,
                created_from: query.start_date,
                created_to: query.end_date,
                ..Default::default()
            },
        )
        .await?;

    let stats = reporting::status_counts(&tasks, now_millis());
    Ok(ok(TaskReport {
        generated_at: now_millis(),
        completion_rate: reporting::completion_rate(stats.completed, stats.total),
        stats,
        tasks,
    }))
}
