//! Auth handlers

use axum::{Json, extract::{Multipart, State}};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::CurrentUser;
use crate::core::AppState;
use crate::db::models::{Department, Position, Role, User, UserCreate, UserUpdate};
use crate::db::repository::UserRepository;
use crate::services::uploads;
use crate::utils::{
    ApiResponse, AppError, AppResult, now_millis, ok, ok_message, ok_with_message,
};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 6, max = 128, message = "Password must be 6-128 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 200, message = "Full name is required"))]
    pub full_name: String,
    pub department: Department,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub position: Option<Position>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<Json<ApiResponse<AuthResponse>>> {
    payload.validate()?;

    let repo = UserRepository::new(state.db());
    let user = repo
        .create(UserCreate {
            username: payload.username,
            email: payload.email,
            password: payload.password,
            full_name: payload.full_name,
            role: payload.role.unwrap_or(Role::Staff),
            department: payload.department,
            phone: payload.phone,
            position: payload.position.unwrap_or(Position::Staff),
        })
        .await?;

    let user_id = user
        .id
        .as_ref()
        .ok_or_else(|| AppError::internal("User row without id"))?
        .to_string();
    let token = state
        .jwt()
        .generate_token(&user_id)
        .map_err(|e| AppError::internal(format!("Token generation failed: {}", e)))?;

    tracing::info!(user = %user.username, "registered");
    Ok(ok_with_message(
        AuthResponse { token, user },
        "Registration successful",
    ))
}

/// POST /api/auth/login
///
/// Unknown email, wrong password and inactive account all answer 401 so the
/// response does not reveal which one it was.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<AuthResponse>>> {
    payload.validate()?;

    let repo = UserRepository::new(state.db());
    let mut user = repo
        .find_by_email(&payload.email)
        .await?
        .ok_or_else(|| AppError::unauthorized("Invalid credentials"))?;

    if !user.verify_password(&payload.password) {
        return Err(AppError::unauthorized("Invalid credentials"));
    }
    if !user.is_active() {
        return Err(AppError::unauthorized("Account is inactive"));
    }

    let user_id = user
        .id
        .as_ref()
        .ok_or_else(|| AppError::internal("User row without id"))?
        .to_string();
    repo.set_last_login(&user_id).await?;
    user.last_login = Some(now_millis());

    let token = state
        .jwt()
        .generate_token(&user_id)
        .map_err(|e| AppError::internal(format!("Token generation failed: {}", e)))?;

    tracing::info!(user = %user.username, "logged in");
    Ok(ok_with_message(
        AuthResponse { token, user },
        "Login successful",
    ))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<User>>> {
    let fresh = UserRepository::new(state.db())
        .find_by_id(&user.id_string())
        .await?
        .ok_or_else(|| AppError::unauthorized("User not found"))?;
    Ok(ok(fresh))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 200, message = "Full name must be 1-200 characters"))]
    pub full_name: Option<String>,
    #[validate(length(max = 30, message = "Phone number too long"))]
    pub phone: Option<String>,
}

/// PUT /api/auth/profile
pub async fn update_profile(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    payload.validate()?;

    let updated = UserRepository::new(state.db())
        .update(
            &user.id_string(),
            UserUpdate {
                full_name: payload.full_name,
                phone: payload.phone,
                ..Default::default()
            },
        )
        .await?;
    Ok(ok_with_message(updated, "Profile updated"))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    #[validate(length(min = 6, max = 128, message = "Password must be 6-128 characters"))]
    pub new_password: String,
}

/// PUT /api/auth/password
pub async fn change_password(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    payload.validate()?;

    let repo = UserRepository::new(state.db());
    let stored = repo
        .find_by_id(&user.id_string())
        .await?
        .ok_or_else(|| AppError::unauthorized("User not found"))?;

    if !stored.verify_password(&payload.current_password) {
        return Err(AppError::validation("Current password is incorrect"));
    }

    let hash = User::hash_password(&payload.new_password)?;
    repo.set_password(&user.id_string(), hash).await?;

    tracing::info!(user = %user.username, "password changed");
    Ok(ok_message("Password changed"))
}

/// PUT /api/auth/profile/image
///
/// Single multipart field `file`; only raster image types are accepted here.
pub async fn upload_profile_image(
    State(state): State<AppState>,
    user: CurrentUser,
    multipart: Multipart,
) -> AppResult<Json<ApiResponse<User>>> {
    let stored = uploads::receive_file(&state.config().uploads_dir(), multipart).await?;
    if !stored.content_type.starts_with("image/") {
        return Err(AppError::validation("Profile image must be an image file"));
    }

    let updated = UserRepository::new(state.db())
        .set_profile_image(&user.id_string(), stored.relative_path)
        .await?;
    Ok(ok_with_message(updated, "Profile image updated"))
}
