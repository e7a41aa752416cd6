//! Authentication middleware
//!
//! `require_auth` resolves the bearer token to a live user row on every
//! request, so role changes and deactivation apply immediately.
//! `require_role` gates a router on a role allow-list.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use surrealdb::RecordId;

use crate::core::AppState;
use crate::db::models::{Department, Role, User};
use crate::db::repository::UserRepository;
use crate::security_log;
use crate::utils::AppError;

use super::jwt::{JwtError, JwtService};

/// Role allow-lists for router gates
pub const ADMIN_ONLY: &[Role] = &[Role::Admin];
pub const MANAGERS: &[Role] = &[Role::Admin, Role::Manager];
pub const ALL_ROLES: &[Role] = &[Role::Admin, Role::Manager, Role::Staff];

/// Authenticated request context, injected by [`require_auth`]
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: RecordId,
    pub username: String,
    pub full_name: String,
    pub role: Role,
    pub department: Department,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// The id in its "user:xyz" wire form
    pub fn id_string(&self) -> String {
        self.id.to_string()
    }
}

impl TryFrom<User> for CurrentUser {
    type Error = AppError;

    fn try_from(user: User) -> Result<Self, Self::Error> {
        let id = user
            .id
            .ok_or_else(|| AppError::internal("User row without id"))?;
        Ok(Self {
            id,
            username: user.username,
            full_name: user.full_name,
            role: user.role,
            department: user.department,
        })
    }
}

/// Paths under `/api/` reachable without a token
const PUBLIC_API_ROUTES: &[&str] = &["/api/auth/login", "/api/auth/register", "/api/health"];

/// Authentication middleware
///
/// Extracts and validates the `Authorization: Bearer <token>` header, loads
/// the user row behind `sub`, rejects inactive accounts and injects
/// [`CurrentUser`] into the request extensions.
///
/// Skipped for CORS preflight, non-`/api/` paths and [`PUBLIC_API_ROUTES`].
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path();

    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }
    if !path.starts_with("/api/") {
        return Ok(next.run(req).await);
    }
    if PUBLIC_API_ROUTES.contains(&path) {
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or(AppError::InvalidToken)?,
        None => {
            security_log!("WARN", "auth_missing", uri = format!("{:?}", req.uri()));
            return Err(AppError::unauthorized("Authentication required"));
        }
    };

    let claims = state.jwt().validate_token(token).map_err(|e| {
        security_log!(
            "WARN",
            "auth_failed",
            error = format!("{}", e),
            uri = format!("{:?}", req.uri())
        );
        match e {
            JwtError::ExpiredToken => AppError::TokenExpired,
            _ => AppError::InvalidToken,
        }
    })?;

    let user = UserRepository::new(state.db())
        .find_by_id(&claims.sub)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::unauthorized("User not found"))?;

    if !user.is_active() {
        security_log!("WARN", "auth_inactive", user_id = claims.sub.clone());
        return Err(AppError::unauthorized("Account is inactive"));
    }

    req.extensions_mut().insert(CurrentUser::try_from(user)?);
    Ok(next.run(req).await)
}

/// Role gate middleware factory
///
/// ```ignore
/// Router::new()
///     .route("/dashboard", get(handler::dashboard))
///     .layer(middleware::from_fn(require_role(MANAGERS)));
/// ```
pub fn require_role(
    allowed: &'static [Role],
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AppError>> + Send>>
+ Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let user = req
                .extensions()
                .get::<CurrentUser>()
                .ok_or_else(|| AppError::unauthorized("Authentication required"))?;

            if !allowed.contains(&user.role) {
                security_log!(
                    "WARN",
                    "role_denied",
                    user_id = user.id_string(),
                    username = user.username.clone(),
                    user_role = user.role.as_str()
                );
                return Err(AppError::forbidden(format!(
                    "role '{}' not permitted here",
                    user.role
                )));
            }

            Ok(next.run(req).await)
        })
    }
}
