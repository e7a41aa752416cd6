//! Notification handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::CurrentUser;
use crate::core::AppState;
use crate::db::models::{Notification, NotificationCreate, NotificationType};
use crate::db::repository::{NotificationRepository, notification::DEFAULT_LIMIT};
use crate::utils::{ApiResponse, AppError, AppResult, ok, ok_message, ok_with_message};

/// GET /api/notifications
///
/// Latest 20 visible to the caller: their own plus broadcasts.
pub async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<Vec<Notification>>>> {
    let rows = NotificationRepository::new(state.db())
        .list_for_user(&user.id, DEFAULT_LIMIT)
        .await?;
    Ok(ok(rows))
}

#[derive(Debug, Serialize)]
pub struct UnreadCount {
    pub count: i64,
}

/// GET /api/notifications/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<UnreadCount>>> {
    let count = NotificationRepository::new(state.db())
        .unread_count(&user.id)
        .await?;
    Ok(ok(UnreadCount { count }))
}

/// PUT /api/notifications/{id}/read
///
/// Owner-scoped: someone else's notification answers 404.
pub async fn mark_read(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Notification>>> {
    let updated = NotificationRepository::new(state.db())
        .mark_read(&id, &user.id)
        .await?;
    Ok(ok_with_message(updated, "Notification marked as read"))
}

/// PUT /api/notifications/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<()>>> {
    NotificationRepository::new(state.db())
        .mark_all_read(&user.id)
        .await?;
    Ok(ok_message("All notifications marked as read"))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateNotificationRequest {
    /// Target user id; omitted means broadcast
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<NotificationType>,
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 2000, message = "Message must be 1-2000 characters"))]
    pub message: String,
    #[serde(default)]
    pub link: Option<String>,
}

/// POST /api/notifications (admin, manager)
pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<CreateNotificationRequest>,
) -> AppResult<Json<ApiResponse<Notification>>> {
    payload.validate()?;

    let target = payload
        .user
        .as_deref()
        .map(|raw| {
            raw.parse()
                .map_err(|_| AppError::validation(format!("Invalid user id: {}", raw)))
        })
        .transpose()?;

    let created = NotificationRepository::new(state.db())
        .create(NotificationCreate {
            user: target,
            kind: payload.kind.unwrap_or(NotificationType::System),
            title: payload.title,
            message: payload.message,
            link: payload.link,
            sender: Some(user.id.clone()),
            sender_name: Some(user.full_name.clone()),
        })
        .await?;
    Ok(ok_with_message(created, "Notification created"))
}
