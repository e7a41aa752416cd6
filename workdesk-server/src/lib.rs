//! Workdesk Server - role-based work assignment tracker
//!
//! A REST backend for tracking tasks across three fixed departments, with
//! three access roles (admin, manager, staff), JWT authentication and
//! polling-based notifications.
//!
//! # Module structure
//!
//! ```text
//! workdesk-server/src/
//! ├── core/          # config, state, server lifecycle
//! ├── auth/          # JWT, auth middleware, role gates
//! ├── db/            # embedded SurrealDB: models + repositories
//! ├── services/      # notification fan-out, upload intake
//! ├── reporting/     # dashboard/report aggregation
//! ├── api/           # HTTP routes and handlers
//! └── utils/         # errors, envelope, logging, validation
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod reporting;
pub mod services;
pub mod utils;

// Re-export public types
pub use auth::{CurrentUser, JwtService};
pub use core::{AppState, Config, Server};
pub use utils::{ApiResponse, AppError, AppResult};

// Security logging macro - tracing with a fixed target
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr $(, $key:ident = $value:expr)*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}
