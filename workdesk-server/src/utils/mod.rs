pub mod error;
pub mod logger;
pub mod result;
pub mod time;
pub mod validation;

pub use error::{ApiResponse, AppError, ok, ok_message, ok_with_message};
pub use result::AppResult;
pub use time::now_millis;
