//! Embedded SurrealDB setup
//!
//! RocksDB-backed in production, in-memory for tests. Table and index
//! definitions run at startup; enum-valued fields are constrained by the
//! closed Rust types in `models::enums` rather than by stored assertions.

pub mod models;
pub mod repository;

use std::path::Path;

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, RocksDb};

use crate::utils::{AppError, AppResult};

const NAMESPACE: &str = "workdesk";
const DATABASE: &str = "workdesk";

pub struct Database;

impl Database {
    /// Open (or create) the RocksDB-backed database at `path`
    pub async fn open(path: &Path) -> AppResult<Surreal<Db>> {
        let db = Surreal::new::<RocksDb>(path)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {}", e)))?;
        Self::prepare(&db).await?;
        Ok(db)
    }

    /// In-memory database for tests
    pub async fn memory() -> AppResult<Surreal<Db>> {
        let db = Surreal::new::<Mem>(())
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {}", e)))?;
        Self::prepare(&db).await?;
        Ok(db)
    }

    async fn prepare(db: &Surreal<Db>) -> AppResult<()> {
        db.use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {}", e)))?;
        define_schema(db).await
    }
}

async fn define_schema(db: &Surreal<Db>) -> AppResult<()> {
    db.query(
        r#"
        DEFINE TABLE IF NOT EXISTS user SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS user_username_unique ON user FIELDS username UNIQUE;
        DEFINE INDEX IF NOT EXISTS user_email_unique ON user FIELDS email UNIQUE;

        DEFINE TABLE IF NOT EXISTS task SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS task_created_at ON task FIELDS createdAt;

        DEFINE TABLE IF NOT EXISTS notification SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS notification_user ON notification FIELDS user;
        "#,
    )
    .await
    .map_err(|e| AppError::database(format!("Failed to define schema: {}", e)))?;
    Ok(())
}
