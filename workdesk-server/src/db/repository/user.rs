//! User repository

use serde::Deserialize;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult, parse_id};
use crate::db::models::{Department, Role, User, UserCreate, UserStatus, UserUpdate};
use crate::utils::now_millis;

#[derive(Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

#[derive(Deserialize)]
struct StaffIdRow {
    #[serde(rename = "staffId", default)]
    staff_id: Option<String>,
}

impl UserRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// All users, newest first
    pub async fn find_all(&self) -> RepoResult<Vec<User>> {
        let users: Vec<User> = self
            .base
            .db()
            .query("SELECT * FROM user ORDER BY createdAt DESC")
            .await?
            .take(0)?;
        Ok(users)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<User>> {
        let thing = parse_id(id)?;
        let user: Option<User> = self.base.db().select(thing).await?;
        Ok(user)
    }

    pub async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let username = username.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM user WHERE username = $username LIMIT 1")
            .bind(("username", username))
            .await?;
        let users: Vec<User> = result.take(0)?;
        Ok(users.into_iter().next())
    }

    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let email = email.trim().to_lowercase();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM user WHERE email = $email LIMIT 1")
            .bind(("email", email))
            .await?;
        let users: Vec<User> = result.take(0)?;
        Ok(users.into_iter().next())
    }

    /// Create a user. Hashes the password, normalizes the email and assigns
    /// the next staff id for non-admin roles.
    pub async fn create(&self, data: UserCreate) -> RepoResult<User> {
        if self.find_by_username(&data.username).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Username '{}' already exists",
                data.username
            )));
        }
        let email = data.email.trim().to_lowercase();
        if self.find_by_email(&email).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Email '{}' already exists",
                email
            )));
        }

        let password_hash = User::hash_password(&data.password)
            .map_err(|e| RepoError::Database(format!("Failed to hash password: {}", e)))?;

        let staff_id = if data.role == Role::Admin {
            None
        } else {
            Some(self.next_staff_id().await?)
        };

        let now = now_millis();
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE user SET
                    username = $username,
                    email = $email,
                    passwordHash = $password_hash,
                    fullName = $full_name,
                    role = $role,
                    department = $department,
                    phone = $phone,
                    position = $position,
                    status = $status,
                    profileImage = NONE,
                    lastLogin = NONE,
                    staffId = $staff_id,
                    createdAt = $now,
                    updatedAt = $now
                RETURN AFTER"#,
            )
            .bind(("username", data.username))
            .bind(("email", email))
            .bind(("password_hash", password_hash))
            .bind(("full_name", data.full_name))
            .bind(("role", data.role))
            .bind(("department", data.department))
            .bind(("phone", data.phone))
            .bind(("position", data.position))
            .bind(("status", UserStatus::Active))
            .bind(("staff_id", staff_id))
            .bind(("now", now))
            .await?;

        let created: Option<User> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create user".to_string()))
    }

    /// Partial update. `staff_id` is never touched here, so once assigned it
    /// stays stable for the lifetime of the account.
    pub async fn update(&self, id: &str, data: UserUpdate) -> RepoResult<User> {
        let thing = parse_id(id)?;
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound("User not found".to_string()))?;

        if let Some(ref new_username) = data.username
            && new_username != &existing.username
            && self.find_by_username(new_username).await?.is_some()
        {
            return Err(RepoError::Duplicate(format!(
                "Username '{}' already exists",
                new_username
            )));
        }
        let email = data.email.map(|e| e.trim().to_lowercase());
        if let Some(ref new_email) = email
            && new_email != &existing.email
            && self.find_by_email(new_email).await?.is_some()
        {
            return Err(RepoError::Duplicate(format!(
                "Email '{}' already exists",
                new_email
            )));
        }

        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    username = $username OR username,
                    email = $email OR email,
                    fullName = $full_name OR fullName,
                    phone = $phone OR phone,
                    role = IF $has_role THEN $role ELSE role END,
                    department = IF $has_department THEN $department ELSE department END,
                    position = IF $has_position THEN $position ELSE position END,
                    status = IF $has_status THEN $status ELSE status END,
                    updatedAt = $now
                RETURN AFTER"#,
            )
            .bind(("thing", thing))
            .bind(("username", data.username))
            .bind(("email", email))
            .bind(("full_name", data.full_name))
            .bind(("phone", data.phone))
            .bind(("has_role", data.role.is_some()))
            .bind(("role", data.role))
            .bind(("has_department", data.department.is_some()))
            .bind(("department", data.department))
            .bind(("has_position", data.position.is_some()))
            .bind(("position", data.position))
            .bind(("has_status", data.status.is_some()))
            .bind(("status", data.status))
            .bind(("now", now_millis()))
            .await?;

        result
            .take::<Option<User>>(0)?
            .ok_or_else(|| RepoError::NotFound("User not found".to_string()))
    }

    /// Flip active/inactive
    pub async fn toggle_status(&self, id: &str) -> RepoResult<User> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound("User not found".to_string()))?;

        self.update(
            id,
            UserUpdate {
                status: Some(existing.status.toggled()),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn set_password(&self, id: &str, password_hash: String) -> RepoResult<()> {
        let thing = parse_id(id)?;
        self.base
            .db()
            .query("UPDATE $thing SET passwordHash = $password_hash, updatedAt = $now")
            .bind(("thing", thing))
            .bind(("password_hash", password_hash))
            .bind(("now", now_millis()))
            .await?;
        Ok(())
    }

    pub async fn set_profile_image(&self, id: &str, path: String) -> RepoResult<User> {
        let thing = parse_id(id)?;
        let mut result = self
            .base
            .db()
            .query("UPDATE $thing SET profileImage = $path, updatedAt = $now RETURN AFTER")
            .bind(("thing", thing))
            .bind(("path", path))
            .bind(("now", now_millis()))
            .await?;
        result
            .take::<Option<User>>(0)?
            .ok_or_else(|| RepoError::NotFound("User not found".to_string()))
    }

    pub async fn set_last_login(&self, id: &str) -> RepoResult<()> {
        let thing = parse_id(id)?;
        self.base
            .db()
            .query("UPDATE $thing SET lastLogin = $now")
            .bind(("thing", thing))
            .bind(("now", now_millis()))
            .await?;
        Ok(())
    }

    /// Hard delete
    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let thing = parse_id(id)?;
        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound("User not found".to_string()))?;
        self.base
            .db()
            .query("DELETE $thing")
            .bind(("thing", thing))
            .await?;
        Ok(true)
    }

    pub async fn find_by_role(&self, role: Role) -> RepoResult<Vec<User>> {
        let users: Vec<User> = self
            .base
            .db()
            .query("SELECT * FROM user WHERE role = $role")
            .bind(("role", role))
            .await?
            .take(0)?;
        Ok(users)
    }

    /// Managers of a department, optionally restricted to active accounts
    pub async fn find_managers(
        &self,
        department: Department,
        active_only: bool,
    ) -> RepoResult<Vec<User>> {
        let mut sql = String::from(
            "SELECT * FROM user WHERE role = $role AND department = $department",
        );
        if active_only {
            sql.push_str(" AND status = $status");
        }
        let mut query = self
            .base
            .db()
            .query(sql)
            .bind(("role", Role::Manager))
            .bind(("department", department));
        if active_only {
            query = query.bind(("status", UserStatus::Active));
        }
        let users: Vec<User> = query.await?.take(0)?;
        Ok(users)
    }

    /// All users of a department regardless of role or status
    pub async fn find_by_department(&self, department: Department) -> RepoResult<Vec<User>> {
        let users: Vec<User> = self
            .base
            .db()
            .query("SELECT * FROM user WHERE department = $department")
            .bind(("department", department))
            .await?
            .take(0)?;
        Ok(users)
    }

    /// Active staff of a department, with an optional search over name,
    /// email and staff id
    pub async fn team_members(
        &self,
        department: Department,
        search: Option<&str>,
    ) -> RepoResult<Vec<User>> {
        let mut sql = String::from(
            "SELECT * FROM user WHERE role = $role AND department = $department AND status = $status",
        );
        if search.is_some() {
            sql.push_str(
                " AND (string::lowercase(fullName) CONTAINS $search \
                 OR string::lowercase(email) CONTAINS $search \
                 OR string::lowercase(staffId) CONTAINS $search)",
            );
        }
        sql.push_str(" ORDER BY fullName");

        let mut query = self
            .base
            .db()
            .query(sql)
            .bind(("role", Role::Staff))
            .bind(("department", department))
            .bind(("status", UserStatus::Active));
        if let Some(s) = search {
            query = query.bind(("search", s.trim().to_lowercase()));
        }
        let users: Vec<User> = query.await?.take(0)?;
        Ok(users)
    }

    /// Next sequential staff id (`EMP0001`, `EMP0002`, ...)
    async fn next_staff_id(&self) -> RepoResult<String> {
        let mut result = self.base.db().query("SELECT staffId FROM user").await?;
        let rows: Vec<StaffIdRow> = result.take(0)?;
        let max = rows
            .iter()
            .filter_map(|r| r.staff_id.as_deref())
            .filter_map(|s| s.strip_prefix("EMP"))
            .filter_map(|n| n.parse::<u32>().ok())
            .max()
            .unwrap_or(0);
        Ok(format!("EMP{:04}", max + 1))
    }
}
