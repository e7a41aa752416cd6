//! Notification model
//!
//! A row with `user = NONE` is a broadcast visible to everyone.

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::enums::NotificationType;
use super::serde_helpers;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub user: Option<RecordId>,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub sender: Option<RecordId>,
    #[serde(default)]
    pub sender_name: Option<String>,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub is_archived: bool,
    pub created_at: i64,
}

/// Fields for creating a notification. `user: None` makes it a broadcast.
#[derive(Debug, Clone)]
pub struct NotificationCreate {
    pub user: Option<RecordId>,
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
    pub sender: Option<RecordId>,
    pub sender_name: Option<String>,
}
