//! Shared application state

use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::JwtService;
use crate::db::Database;
use crate::utils::{AppError, AppResult};

use super::config::Config;

/// Cloneable handle to everything the handlers need
#[derive(Clone)]
pub struct AppState {
    config: Config,
    db: Surreal<Db>,
    jwt: Arc<JwtService>,
}

impl AppState {
    /// Build production state: ensure the work directory layout and open the
    /// RocksDB database. A failure here is fatal for the process.
    pub async fn initialize(config: &Config) -> AppResult<Self> {
        config
            .ensure_work_dir_structure()
            .map_err(|e| AppError::internal(format!("Failed to create work dir: {}", e)))?;

        let db = Database::open(&config.database_dir()).await?;
        tracing::info!(path = %config.database_dir().display(), "database ready");

        Ok(Self::with_db(config.clone(), db))
    }

    /// State over an already-open database (tests use the Mem engine)
    pub fn with_db(config: Config, db: Surreal<Db>) -> Self {
        let jwt = Arc::new(JwtService::with_config(config.jwt.clone()));
        Self { config, db, jwt }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn db(&self) -> Surreal<Db> {
        self.db.clone()
    }

    pub fn jwt(&self) -> Arc<JwtService> {
        self.jwt.clone()
    }
}
