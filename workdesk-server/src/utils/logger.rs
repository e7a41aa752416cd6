//! Logging initialization
//!
//! Console logging by default; when a log directory exists a daily-rolling
//! file appender is used instead. Filtering follows `RUST_LOG` when set.

use std::path::Path;

use tracing_subscriber::EnvFilter;

/// Initialize console logging with the default level
pub fn init_logger() {
    init_logger_with(None, None);
}

/// Initialize logging with an optional level override and log directory
pub fn init_logger_with(level: Option<&str>, log_dir: Option<&Path>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.unwrap_or("info")));

    if let Some(dir) = log_dir {
        if dir.exists() {
            let appender = tracing_appender::rolling::daily(dir, "workdesk-server.log");
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(appender)
                .with_ansi(false)
                .with_target(false)
                .init();
            return;
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
