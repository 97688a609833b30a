//! User types for Plaza.
//!
//! Users are referenced, not owned, by the messaging core: they are
//! created by the registration flow outside this crate's scope.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::datetime::parse_timestamp;

/// A user account.
#[derive(Debug, Clone)]
pub struct User {
    /// User ID.
    pub id: i64,
    /// Unique username.
    pub username: String,
    /// Argon2 password hash.
    pub password: String,
    /// Administrator flag.
    pub is_admin: bool,
    /// Soft-delete marker.
    pub is_deleted: bool,
    /// Account creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Public summary shape denormalized into mail and chat payloads.
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            username: self.username.clone(),
        }
    }
}

/// Database row type for User.
#[derive(sqlx::FromRow)]
pub(crate) struct UserRow {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub is_admin: i64,
    pub is_deleted: i64,
    pub created_at: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            password: row.password,
            is_admin: row.is_admin != 0,
            is_deleted: row.is_deleted != 0,
            created_at: parse_timestamp(&row.created_at),
        }
    }
}

/// Public user summary attached to messages and chat payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct UserSummary {
    /// User ID.
    pub id: i64,
    /// Username.
    pub username: String,
}

/// New user for creation.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Unique username.
    pub username: String,
    /// Argon2 password hash.
    pub password: String,
    /// Administrator flag.
    pub is_admin: bool,
}

impl NewUser {
    /// Create a new user with a pre-hashed password.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            is_admin: false,
        }
    }

    /// Mark the user as an administrator.
    pub fn admin(mut self) -> Self {
        self.is_admin = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user() {
        let user = NewUser::new("alice", "hash");
        assert_eq!(user.username, "alice");
        assert_eq!(user.password, "hash");
        assert!(!user.is_admin);
    }

    #[test]
    fn test_new_user_admin() {
        let user = NewUser::new("root", "hash").admin();
        assert!(user.is_admin);
    }

    #[test]
    fn test_user_summary() {
        let user = User {
            id: 7,
            username: "alice".to_string(),
            password: "hash".to_string(),
            is_admin: false,
            is_deleted: false,
            created_at: Utc::now(),
        };
        let summary = user.summary();
        assert_eq!(summary.id, 7);
        assert_eq!(summary.username, "alice");
    }
}
