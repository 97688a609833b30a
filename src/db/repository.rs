//! User repository for Plaza.
//!
//! This module provides the user lookups the messaging core needs.

use sqlx::SqlitePool;

use super::user::{NewUser, User, UserRow, UserSummary};
use crate::{PlazaError, Result};

/// Repository for user operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new user in the database.
    ///
    /// Returns the created user with the assigned ID.
    pub async fn create(&self, new_user: &NewUser) -> Result<User> {
        let result = sqlx::query(
            "INSERT INTO users (username, password, is_admin) VALUES (?, ?, ?)",
        )
        .bind(&new_user.username)
        .bind(&new_user.password)
        .bind(new_user.is_admin)
        .execute(self.pool)
        .await
        .map_err(|e| PlazaError::Database(e.to_string()))?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| PlazaError::NotFound("user".to_string()))
    }

    /// Get a user by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let result = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, password, is_admin, is_deleted, created_at
             FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| PlazaError::Database(e.to_string()))?;

        Ok(result.map(User::from))
    }

    /// Get an active (not soft-deleted) user by ID.
    pub async fn get_active_by_id(&self, id: i64) -> Result<Option<User>> {
        let result = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, password, is_admin, is_deleted, created_at
             FROM users WHERE id = ? AND is_deleted = 0",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| PlazaError::Database(e.to_string()))?;

        Ok(result.map(User::from))
    }

    /// Get a user by username (case-insensitive).
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let result = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, password, is_admin, is_deleted, created_at
             FROM users WHERE username = ? COLLATE NOCASE",
        )
        .bind(username)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| PlazaError::Database(e.to_string()))?;

        Ok(result.map(User::from))
    }

    /// Get the public summary for a user.
    ///
    /// Soft-deleted users still resolve: their past messages keep showing
    /// the historical username.
    pub async fn get_summary(&self, id: i64) -> Result<Option<UserSummary>> {
        let result: Option<(i64, String)> =
            sqlx::query_as("SELECT id, username FROM users WHERE id = ?")
                .bind(id)
                .fetch_optional(self.pool)
                .await
                .map_err(|e| PlazaError::Database(e.to_string()))?;

        Ok(result.map(|(id, username)| UserSummary { id, username }))
    }

    /// Soft-delete a user.
    ///
    /// Returns true if a user was marked, false if not found.
    pub async fn soft_delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET is_deleted = 1 WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| PlazaError::Database(e.to_string()))?;
        Ok(result.rows_affected() > 0)
    }

    /// Count all users.
    pub async fn count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool)
            .await
            .map_err(|e| PlazaError::Database(e.to_string()))?;
        Ok(count.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    async fn setup_db() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    #[tokio::test]
    async fn test_create_user() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        let user = repo.create(&NewUser::new("alice", "hash")).await.unwrap();

        assert_eq!(user.id, 1);
        assert_eq!(user.username, "alice");
        assert!(!user.is_admin);
        assert!(!user.is_deleted);
    }

    #[tokio::test]
    async fn test_create_admin_user() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        let user = repo
            .create(&NewUser::new("root", "hash").admin())
            .await
            .unwrap();

        assert!(user.is_admin);
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        let result = repo.get_by_id(999).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_get_by_username_case_insensitive() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());
        repo.create(&NewUser::new("Alice", "hash")).await.unwrap();

        let user = repo.get_by_username("alice").await.unwrap().unwrap();
        assert_eq!(user.username, "Alice");
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());
        repo.create(&NewUser::new("alice", "hash")).await.unwrap();

        let result = repo.create(&NewUser::new("alice", "other")).await;
        assert!(matches!(result, Err(PlazaError::Database(_))));
    }

    #[tokio::test]
    async fn test_soft_delete() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());
        let user = repo.create(&NewUser::new("alice", "hash")).await.unwrap();

        assert!(repo.soft_delete(user.id).await.unwrap());

        // Still resolvable by id, but not as an active user
        assert!(repo.get_by_id(user.id).await.unwrap().unwrap().is_deleted);
        assert!(repo.get_active_by_id(user.id).await.unwrap().is_none());

        // Summary still resolves for historical payloads
        let summary = repo.get_summary(user.id).await.unwrap().unwrap();
        assert_eq!(summary.username, "alice");
    }

    #[tokio::test]
    async fn test_count() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        assert_eq!(repo.count().await.unwrap(), 0);
        repo.create(&NewUser::new("alice", "hash")).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 1);
    }
}
