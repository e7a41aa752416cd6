pub mod enums;
pub mod notification;
pub mod serde_helpers;
pub mod task;
pub mod user;

pub use enums::{Department, NotificationType, Position, Priority, Role, TaskStatus, UserStatus};
pub use notification::{Notification, NotificationCreate};
pub use task::{Task, TaskAttachment, TaskComment, TaskCreate, TaskUpdate};
pub use user::{User, UserCreate, UserUpdate};
