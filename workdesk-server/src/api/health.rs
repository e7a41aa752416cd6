//! Health check (public)

use axum::{Json, Router, routing::get};
use serde::Serialize;

use crate::core::AppState;
use crate::utils::{ApiResponse, now_millis, ok};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Health {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: i64,
}

pub async fn health() -> Json<ApiResponse<Health>> {
    ok(Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: now_millis(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/health", get(health))
}
