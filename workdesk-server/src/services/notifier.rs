//! Notification fan-out
//!
//! All notification writes triggered by task activity go through here so the
//! recipient rules live in one place:
//!
//! - admin creates a task: every active manager of the target department is
//!   told, plus the assignee when one was set and is not already a manager
//! - manager assigns a task: the assignee is told
//! - a task changes under someone's hands (status/comment): admins, the
//!   department manager and the task creator are told, deduplicated, with the
//!   actor excluded

use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::CurrentUser;
use crate::db::models::{
    NotificationCreate, NotificationType, Role, Task, TaskStatus, User,
};
use crate::db::repository::{NotificationRepository, UserRepository};
use crate::utils::AppResult;

/// What happened to a task
#[derive(Debug, Clone)]
pub enum TaskEvent {
    StatusChanged { from: TaskStatus, to: TaskStatus },
    Commented { text: String },
}

#[derive(Clone)]
pub struct Notifier {
    users: UserRepository,
    notifications: NotificationRepository,
}

impl Notifier {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            users: UserRepository::new(db.clone()),
            notifications: NotificationRepository::new(db),
        }
    }

    fn task_link(task: &Task) -> Option<String> {
        task.id.as_ref().map(|id| format!("/tasks/{}", id))
    }

    /// Fan-out for an admin-created task. Returns how many notifications were
    /// written.
    pub async fn task_created(&self, task: &Task, creator: &CurrentUser) -> AppResult<usize> {
        let managers = self.users.find_managers(task.department, true).await?;
        let manager_ids: Vec<RecordId> = managers.iter().filter_map(|m| m.id.clone()).collect();

        let mut batch = Vec::new();
        for manager in &managers {
            let Some(manager_id) = manager.id.clone() else {
                continue;
            };
            let message = if task.is_assigned_to(&manager_id) {
                format!(
                    "{} assigned you a new task: {}",
                    creator.full_name, task.title
                )
            } else {
                format!(
                    "New task created in your department: {}",
                    task.title
                )
            };
            batch.push(NotificationCreate {
                user: Some(manager_id),
                kind: NotificationType::TaskAssigned,
                title: "New Task".to_string(),
                message,
                link: Self::task_link(task),
                sender: Some(creator.id.clone()),
                sender_name: Some(creator.full_name.clone()),
            });
        }

        if let Some(assignee) = &task.assigned_to
            && !manager_ids.contains(assignee)
        {
            batch.push(NotificationCreate {
                user: Some(assignee.clone()),
                kind: NotificationType::TaskAssigned,
                title: "New Task".to_string(),
                message: format!(
                    "{} assigned you a new task: {}",
                    creator.full_name, task.title
                ),
                link: Self::task_link(task),
                sender: Some(creator.id.clone()),
                sender_name: Some(creator.full_name.clone()),
            });
        }

        let written = self.notifications.insert_many(batch).await?;
        tracing::debug!(task = %task.work_id, recipients = written, "task_created fan-out");
        Ok(written)
    }

    /// Single notification to the assignee of a task
    pub async fn task_assigned(
        &self,
        task: &Task,
        assignee: &User,
        sender: &CurrentUser,
    ) -> AppResult<()> {
        let Some(assignee_id) = assignee.id.clone() else {
            return Ok(());
        };
        if assignee_id == sender.id {
            return Ok(());
        }
        self.notifications
            .create(NotificationCreate {
                user: Some(assignee_id),
                kind: NotificationType::TaskAssigned,
                title: "Task Assigned".to_string(),
                message: format!("{} assigned you a task: {}", sender.full_name, task.title),
                link: Self::task_link(task),
                sender: Some(sender.id.clone()),
                sender_name: Some(sender.full_name.clone()),
            })
            .await?;
        Ok(())
    }

    /// Tell the assignee that a manager changed their task's status
    pub async fn status_changed(
        &self,
        task: &Task,
        manager: &CurrentUser,
    ) -> AppResult<()> {
        let Some(assignee) = task.assigned_to.clone() else {
            return Ok(());
        };
        if assignee == manager.id {
            return Ok(());
        }
        self.notifications
            .create(NotificationCreate {
                user: Some(assignee),
                kind: NotificationType::TaskUpdated,
                title: "Task Status Updated".to_string(),
                message: format!(
                    "{} updated your task \"{}\" status to {}",
                    manager.full_name, task.title, task.status
                ),
                link: Self::task_link(task),
                sender: Some(manager.id.clone()),
                sender_name: Some(manager.full_name.clone()),
            })
            .await?;
        Ok(())
    }

    /// Fan-out for a task changing under the actor's hands. Recipients are
    /// admins, the department manager and the task creator, deduplicated,
    /// with the actor excluded. Returns how many notifications were written.
    pub async fn task_event(
        &self,
        task: &Task,
        actor: &CurrentUser,
        event: TaskEvent,
    ) -> AppResult<usize> {
        let admins = self.users.find_by_role(Role::Admin).await?;
        let admin_ids: Vec<RecordId> = admins.iter().filter_map(|a| a.id.clone()).collect();
        let manager_id = self
            .users
            .find_managers(task.department, false)
            .await?
            .into_iter()
            .filter_map(|m| m.id)
            .next();

        let recipients = recipients_for_task_event(
            &admin_ids,
            manager_id.as_ref(),
            Some(&task.created_by),
            &actor.id,
        );

        let (kind, title, message) = match &event {
            TaskEvent::StatusChanged { from, to } => {
                if *to == TaskStatus::Completed {
                    (
                        NotificationType::TaskCompleted,
                        "Task Completed".to_string(),
                        format!(
                            "{} marked task \"{}\" as completed",
                            actor.full_name, task.title
                        ),
                    )
                } else {
                    (
                        NotificationType::TaskUpdated,
                        "Task Status Updated".to_string(),
                        format!(
                            "{} updated task \"{}\" status from {} to {}",
                            actor.full_name, task.title, from, to
                        ),
                    )
                }
            }
            TaskEvent::Commented { text } => (
                NotificationType::TaskComment,
                "New Comment".to_string(),
                format!(
                    "{} commented on task \"{}\": \"{}\"",
                    actor.full_name,
                    task.title,
                    snippet(text, 50)
                ),
            ),
        };

        let batch: Vec<NotificationCreate> = recipients
            .into_iter()
            .map(|recipient| NotificationCreate {
                user: Some(recipient),
                kind,
                title: title.clone(),
                message: message.clone(),
                link: Self::task_link(task),
                sender: Some(actor.id.clone()),
                sender_name: Some(actor.full_name.clone()),
            })
            .collect();

        let written = self.notifications.insert_many(batch).await?;
        tracing::debug!(task = %task.work_id, recipients = written, "task_event fan-out");
        Ok(written)
    }
}

/// The recipient set for a task event: admins, then the department manager,
/// then the creator; first occurrence wins, the actor is never included.
pub fn recipients_for_task_event(
    admins: &[RecordId],
    manager: Option<&RecordId>,
    creator: Option<&RecordId>,
    actor: &RecordId,
) -> Vec<RecordId> {
    let mut recipients: Vec<RecordId> = Vec::new();
    let candidates = admins
        .iter()
        .chain(manager.into_iter())
        .chain(creator.into_iter());
    for candidate in candidates {
        if candidate == actor {
            continue;
        }
        if !recipients.contains(candidate) {
            recipients.push(candidate.clone());
        }
    }
    recipients
}

/// First `max` characters of a comment, with an ellipsis when truncated
fn snippet(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uid(key: &str) -> RecordId {
        RecordId::from_table_key("user", key)
    }

    #[test]
    fn recipients_are_deduplicated() {
        let admins = vec![uid("admin1"), uid("admin2")];
        let manager = uid("admin1"); // manager is also an admin
        let creator = uid("admin2"); // creator is also an admin
        let actor = uid("staff1");

        let recipients =
            recipients_for_task_event(&admins, Some(&manager), Some(&creator), &actor);
        assert_eq!(recipients, vec![uid("admin1"), uid("admin2")]);
    }

    #[test]
    fn actor_is_excluded() {
        let admins = vec![uid("admin1")];
        let manager = uid("manager1");
        let creator = uid("admin1");

        // The manager themselves changed the task
        let recipients =
            recipients_for_task_event(&admins, Some(&manager), Some(&creator), &manager);
        assert_eq!(recipients, vec![uid("admin1")]);
    }

    #[test]
    fn distinct_parties_all_receive() {
        let admins = vec![uid("admin1")];
        let manager = uid("manager1");
        let creator = uid("admin2");
        let actor = uid("staff1");

        let recipients =
            recipients_for_task_event(&admins, Some(&manager), Some(&creator), &actor);
        assert_eq!(
            recipients,
            vec![uid("admin1"), uid("manager1"), uid("admin2")]
        );
    }

    #[test]
    fn missing_manager_and_creator_are_skipped() {
        let admins = vec![uid("admin1")];
        let recipients = recipients_for_task_event(&admins, None, None, &uid("staff1"));
        assert_eq!(recipients, vec![uid("admin1")]);
    }

    #[test]
    fn comment_snippet_truncates() {
        assert_eq!(snippet("short", 50), "short");
        let long = "x".repeat(60);
        let cut = snippet(&long, 50);
        assert_eq!(cut.chars().count(), 53);
        assert!(cut.ends_with("..."));
    }
}
