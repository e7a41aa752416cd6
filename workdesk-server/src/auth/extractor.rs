//! Axum extractor for the authenticated user
//!
//! Handlers take `user: CurrentUser` directly; the value is whatever
//! `require_auth` injected into the request extensions.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::core::AppState;
use crate::utils::AppError;

use super::middleware::CurrentUser;

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| AppError::unauthorized("Authentication required"))
    }
}
