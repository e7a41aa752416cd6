//! Shared test harness: in-memory database state and account helpers

use tempfile::TempDir;

use workdesk_server::auth::CurrentUser;
use workdesk_server::core::{AppState, Config};
use workdesk_server::db::Database;
use workdesk_server::db::models::{Department, Position, Role, User, UserCreate};
use workdesk_server::db::repository::UserRepository;

pub struct TestContext {
    pub state: AppState,
    // Held so the work dir outlives the test
    pub _work_dir: TempDir,
}

pub async fn setup() -> TestContext {
    let work_dir = tempfile::tempdir().expect("tempdir");
    let mut config = Config::with_overrides(work_dir.path().to_string_lossy().to_string(), 0);
    config.jwt.secret = "integration-test-secret-key-0123456789!!".to_string();

    let db = Database::memory().await.expect("in-memory database");
    TestContext {
        state: AppState::with_db(config, db),
        _work_dir: work_dir,
    }
}

pub async fn create_user(
    state: &AppState,
    username: &str,
    role: Role,
    department: Department,
) -> User {
    UserRepository::new(state.db())
        .create(UserCreate {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password: "password123".to_string(),
            full_name: format!("{} Person", username),
            role,
            department,
            phone: None,
            position: Position::Staff,
        })
        .await
        .expect("create user")
}

pub fn current(user: &User) -> CurrentUser {
    CurrentUser::try_from(user.clone()).expect("user has id")
}

pub fn id_of(user: &User) -> String {
    user.id.as_ref().expect("user has id").to_string()
}
