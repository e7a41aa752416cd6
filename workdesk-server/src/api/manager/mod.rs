//! Manager namespace: team administration and department task flow
//!
//! Everything here is scoped to the caller's department.

pub mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::{MANAGERS, require_role};
use crate::core::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/manager", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(handler::dashboard))
        .route("/team", get(handler::team).post(handler::add_staff))
        .route("/team/{id}", get(handler::member_details))
        .route("/team/{id}/tasks", get(handler::member_tasks))
        .route("/tasks", get(handler::department_tasks))
        .route("/tasks/unassigned", get(handler::unassigned_tasks))
        .route("/tasks/assign", post(handler::assign_task))
        .route(
            "/tasks/{id}",
            get(handler::task_details).put(handler::update_task),
        )
        .route("/tasks/{id}/status", put(handler::update_status))
        .route("/performance", get(handler::team_performance))
        .route("/performance/{id}", get(handler::member_performance))
        .layer(middleware::from_fn(require_role(MANAGERS)))
}
