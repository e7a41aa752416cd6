//! Admin namespace: user administration, org-wide dashboard and reports

pub mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::api::tasks;
use crate::auth::{ADMIN_ONLY, require_role};
use crate::core::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/admin", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(handler::dashboard))
        .route("/analytics", get(handler::analytics))
        .route("/users", get(handler::list_users).post(handler::create_user))
        .route(
            "/users/{id}",
            get(handler::get_user)
                .put(handler::update_user)
                .delete(handler::delete_user),
        )
        .route("/users/{id}/status", put(handler::toggle_user_status))
        // Creation shares the common handler; the role branch inside it
        // performs the admin fan-out
        .route("/tasks", post(tasks::handler::create))
        .route("/tasks/unassigned", get(handler::unassigned_tasks))
        .route("/reports/users", get(handler::user_report))
        .route("/reports/tasks", get(handler::task_report))
        .layer(middleware::from_fn(require_role(ADMIN_ONLY)))
}
