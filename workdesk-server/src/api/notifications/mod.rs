//! Notification namespace
//!
//! Reads and read-marking for every authenticated user; manual creation is
//! for admins and managers (omitting the target user makes it a broadcast).

pub mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::{MANAGERS, require_role};
use crate::core::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/notifications", routes())
}

fn routes() -> Router<AppState> {
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/unread-count", get(handler::unread_count))
        .route("/read-all", put(handler::mark_all_read))
        .route("/{id}/read", put(handler::mark_read));

    let manage_routes = Router::new()
        .route("/", post(handler::create))
        .layer(middleware::from_fn(require_role(MANAGERS)));

    read_routes.merge(manage_routes)
}
