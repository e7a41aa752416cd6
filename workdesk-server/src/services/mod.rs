//! Domain services shared between API namespaces

pub mod notifier;
pub mod uploads;

pub use notifier::{Notifier, TaskEvent, recipients_for_task_event};
pub use uploads::{MAX_UPLOAD_SIZE, StoredFile, receive_file};
