//! Shared task namespace
//!
//! Reads are visible to every authenticated role, scoped by who is asking.
//! Creation and attachments are for admins and managers; deletion is
//! admin-only.

pub mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, post},
};

use crate::auth::{ADMIN_ONLY, MANAGERS, require_role};
use crate::core::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/tasks", routes())
}

fn routes() -> Router<AppState> {
    let open_routes = Router::new()
        .route("/", get(handler::list))
        .route("/stats", get(handler::stats))
        .route("/{id}", get(handler::get_task).put(handler::update));

    let manage_routes = Router::new()
        .route("/", post(handler::create))
        .route("/{id}/attachment", post(handler::upload_attachment))
        .layer(middleware::from_fn(require_role(MANAGERS)));

    let admin_routes = Router::new()
        .route("/{id}", delete(handler::remove))
        .layer(middleware::from_fn(require_role(ADMIN_ONLY)));

    open_routes.merge(manage_routes).merge(admin_routes)
}
