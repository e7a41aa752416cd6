//! Auth namespace: registration, login, own profile
//!
//! `register` and `login` are public; everything else goes through the
//! global auth middleware.

pub mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/auth", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handler::register))
        .route("/login", post(handler::login))
        .route("/me", get(handler::me))
        .route("/profile", put(handler::update_profile))
        .route("/password", put(handler::change_password))
        .route("/profile/image", put(handler::upload_profile_image))
}
