//! Staff namespace: own tasks, progress and comments
//!
//! Open to every authenticated role; everything operates on tasks assigned
//! to the caller.

pub mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::{ALL_ROLES, require_role};
use crate::core::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/staff", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(handler::dashboard))
        .route("/tasks", get(handler::my_tasks))
        .route("/tasks/{id}", get(handler::task_details))
        .route("/tasks/{id}/progress", put(handler::update_progress))
        .route("/tasks/{id}/comments", post(handler::add_comment))
        .layer(middleware::from_fn(require_role(ALL_ROLES)))
}
