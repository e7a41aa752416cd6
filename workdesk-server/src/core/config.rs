//! Server configuration
//!
//! Everything comes from environment variables with development defaults.
//! `.env` is loaded in `main` before this runs.

use std::path::PathBuf;

use crate::auth::JwtConfig;

#[derive(Debug, Clone)]
pub struct Config {
    /// Root directory for persistent state (database, uploads, logs)
    pub work_dir: String,
    /// HTTP listen port
    pub http_port: u16,
    /// "development" or "production"
    pub environment: String,
    pub jwt: JwtConfig,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".to_string()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
            jwt: JwtConfig::default(),
        }
    }

    /// Config rooted at an explicit directory, for tests
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        Self {
            work_dir: work_dir.into(),
            http_port,
            ..Self::from_env()
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn work_dir_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir)
    }

    pub fn database_dir(&self) -> PathBuf {
        self.work_dir_path().join("database")
    }

    pub fn uploads_dir(&self) -> PathBuf {
        self.work_dir_path().join("uploads")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.work_dir_path().join("logs")
    }

    /// Create the work directory layout if missing
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        std::fs::create_dir_all(self.uploads_dir())?;
        std::fs::create_dir_all(self.logs_dir())?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn work_dir_layout() {
        let config = Config::with_overrides("/tmp/workdesk-test", 0);
        assert_eq!(
            config.database_dir(),
            PathBuf::from("/tmp/workdesk-test/database")
        );
        assert_eq!(
            config.uploads_dir(),
            PathBuf::from("/tmp/workdesk-test/uploads")
        );
    }
}
