//! User account model

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::enums::{Department, Position, Role, UserStatus};
use super::serde_helpers;
use crate::utils::{AppError, AppResult};

/// A user account row
///
/// `password_hash` is readable from the database but never serialized, so no
/// response path can leak it. `staff_id` exists only for non-admin accounts
/// and never changes once assigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: String,
    pub role: Role,
    pub department: Department,
    #[serde(default)]
    pub phone: Option<String>,
    pub position: Position,
    pub status: UserStatus,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub last_login: Option<i64>,
    #[serde(default)]
    pub staff_id: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl User {
    /// Hash a plaintext password with argon2
    pub fn hash_password(password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {}", e)))?;
        Ok(hash.to_string())
    }

    /// Verify a plaintext password against the stored hash
    pub fn verify_password(&self, password: &str) -> bool {
        match PasswordHash::new(&self.password_hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}

/// Fields for creating a user. The repository hashes the password and assigns
/// `staff_id` for non-admin roles.
#[derive(Debug, Clone)]
pub struct UserCreate {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role: Role,
    pub department: Department,
    pub phone: Option<String>,
    pub position: Position,
}

/// Partial update; absent fields keep their stored value
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub role: Option<Role>,
    pub department: Option<Department>,
    pub phone: Option<String>,
    pub position: Option<Position>,
    pub status: Option<UserStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::now_millis;

    fn sample_user(hash: String) -> User {
        User {
            id: Some(RecordId::from_table_key("user", "u1")),
            username: "alice".into(),
            email: "alice@example.com".into(),
            password_hash: hash,
            full_name: "Alice Zhang".into(),
            role: Role::Staff,
            department: Department::Diary,
            phone: None,
            position: Position::Staff,
            status: UserStatus::Active,
            profile_image: None,
            last_login: None,
            staff_id: Some("EMP0001".into()),
            created_at: now_millis(),
            updated_at: now_millis(),
        }
    }

    #[test]
    fn password_round_trip() {
        let hash = User::hash_password("secret123").unwrap();
        let user = sample_user(hash);
        assert!(user.verify_password("secret123"));
        assert!(!user.verify_password("wrong"));
    }

    #[test]
    fn serialized_user_never_contains_the_hash() {
        let user = sample_user(User::hash_password("secret123").unwrap());
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["staffId"], "EMP0001");
        assert_eq!(json["id"], "user:u1");
    }
}
