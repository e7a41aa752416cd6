//! Notification repository
//!
//! Rows with `user = NONE` are broadcasts; list queries always include them.

use serde::Deserialize;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::{BaseRepository, RepoError, RepoResult, parse_id};
use crate::db::models::{Notification, NotificationCreate};
use crate::utils::now_millis;

/// Default page size for notification lists
pub const DEFAULT_LIMIT: usize = 20;

#[derive(Clone)]
pub struct NotificationRepository {
    base: BaseRepository,
}

#[derive(Deserialize)]
struct CountRow {
    count: i64,
}

impl NotificationRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn create(&self, data: NotificationCreate) -> RepoResult<Notification> {
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE notification SET
                    user = $user,
                    `type` = $kind,
                    title = $title,
                    message = $message,
                    link = $link,
                    sender = $sender,
                    senderName = $sender_name,
                    isRead = false,
                    isArchived = false,
                    createdAt = $now
                RETURN AFTER"#,
            )
            .bind(("user", data.user))
            .bind(("kind", data.kind))
            .bind(("title", data.title))
            .bind(("message", data.message))
            .bind(("link", data.link))
            .bind(("sender", data.sender))
            .bind(("sender_name", data.sender_name))
            .bind(("now", now_millis()))
            .await?;

        let created: Option<Notification> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create notification".to_string()))
    }

    /// Insert a batch, returning how many were written
    pub async fn insert_many(&self, batch: Vec<NotificationCreate>) -> RepoResult<usize> {
        let mut written = 0;
        for item in batch {
            self.create(item).await?;
            written += 1;
        }
        Ok(written)
    }

    /// Latest notifications visible to a user: their own plus broadcasts
    pub async fn list_for_user(
        &self,
        user: &RecordId,
        limit: usize,
    ) -> RepoResult<Vec<Notification>> {
        let sql = format!(
            "SELECT * FROM notification WHERE (user = $user OR user = NONE) \
             ORDER BY createdAt DESC LIMIT {}",
            limit
        );
        let rows: Vec<Notification> = self
            .base
            .db()
            .query(sql)
            .bind(("user", user.clone()))
            .await?
            .take(0)?;
        Ok(rows)
    }

    /// Latest unread notifications addressed to a user
    pub async fn unread_for_user(
        &self,
        user: &RecordId,
        limit: usize,
    ) -> RepoResult<Vec<Notification>> {
        let sql = format!(
            "SELECT * FROM notification WHERE user = $user AND isRead = false \
             ORDER BY createdAt DESC LIMIT {}",
            limit
        );
        let rows: Vec<Notification> = self
            .base
            .db()
            .query(sql)
            .bind(("user", user.clone()))
            .await?
            .take(0)?;
        Ok(rows)
    }

    pub async fn unread_count(&self, user: &RecordId) -> RepoResult<i64> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT count() FROM notification WHERE user = $user AND isRead = false GROUP ALL",
            )
            .bind(("user", user.clone()))
            .await?;
        let row: Option<CountRow> = result.take(0)?;
        Ok(row.map(|r| r.count).unwrap_or(0))
    }

    /// Mark one notification read. Scoped to the owner: a foreign id behaves
    /// as if the row did not exist.
    pub async fn mark_read(&self, id: &str, user: &RecordId) -> RepoResult<Notification> {
        let thing = parse_id(id)?;
        let mut result = self
            .base
            .db()
            .query("UPDATE $thing SET isRead = true WHERE user = $user RETURN AFTER")
            .bind(("thing", thing))
            .bind(("user", user.clone()))
            .await?;
        result
            .take::<Option<Notification>>(0)?
            .ok_or_else(|| RepoError::NotFound("Notification not found".to_string()))
    }

    pub async fn mark_all_read(&self, user: &RecordId) -> RepoResult<()> {
        self.base
            .db()
            .query("UPDATE notification SET isRead = true WHERE user = $user AND isRead = false")
            .bind(("user", user.clone()))
            .await?;
        Ok(())
    }
}
