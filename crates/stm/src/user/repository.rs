//! User repository for database operations.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::{debug, instrument};

use super::models::{User, UserCredentials, UserInfo};

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a user whose password is already hashed.
    #[instrument(skip(self, password_hash))]
    pub async fn create(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        role_id: i64,
    ) -> Result<User> {
        debug!("Creating user: {}", email);

        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password, role_id)
            VALUES (?, ?, ?, ?)
            RETURNING id, name, email, password, role_id, created_at
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(role_id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to insert user")
    }

    /// Get login credentials by email.
    #[instrument(skip(self))]
    pub async fn get_credentials_by_email(&self, email: &str) -> Result<Option<UserCredentials>> {
        sqlx::query_as::<_, UserCredentials>(
            r#"
            SELECT u.id, u.name, u.email, r.name AS role, u.password
            FROM users u
            JOIN roles r ON r.id = u.role_id
            WHERE u.email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch user credentials")
    }

    /// Get public info for one user.
    #[instrument(skip(self))]
    pub async fn get_info(&self, id: i64) -> Result<Option<UserInfo>> {
        sqlx::query_as::<_, UserInfo>(
            r#"
            SELECT u.id, u.name, u.email, r.name AS role
            FROM users u
            JOIN roles r ON r.id = u.role_id
            WHERE u.id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch user")
    }

    /// List every user with their role name.
    #[instrument(skip(self))]
    pub async fn list_with_roles(&self) -> Result<Vec<UserInfo>> {
        sqlx::query_as::<_, UserInfo>(
            r#"
            SELECT u.id, u.name, u.email, r.name AS role
            FROM users u
            JOIN roles r ON r.id = u.role_id
            ORDER BY u.id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list users")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{ConstraintViolation, Database, constraint_violation};
    use crate::role::RoleRepository;

    async fn setup() -> (UserRepository, i64) {
        let db = Database::in_memory().await.unwrap();
        let roles = RoleRepository::new(db.pool().clone());
        roles.seed_defaults().await.unwrap();
        let support = roles.get_by_name("SUPPORT").await.unwrap().unwrap();
        (UserRepository::new(db.pool().clone()), support.id)
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let (repo, role_id) = setup().await;
        let user = repo
            .create("Sam", "sam@example.com", "hash", role_id)
            .await
            .unwrap();
        assert_eq!(user.role_id, role_id);
        assert!(!user.created_at.is_empty());

        let creds = repo
            .get_credentials_by_email("sam@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(creds.password_hash, "hash");
        assert_eq!(creds.info.role, "SUPPORT");

        let info = repo.get_info(user.id).await.unwrap().unwrap();
        assert_eq!(info, creds.info);
        assert!(repo.get_info(user.id + 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_unique_violation() {
        let (repo, role_id) = setup().await;
        repo.create("A", "dup@example.com", "h", role_id).await.unwrap();
        let err = repo
            .create("B", "dup@example.com", "h", role_id)
            .await
            .unwrap_err();
        assert_eq!(constraint_violation(&err), Some(ConstraintViolation::Unique));
    }

    #[tokio::test]
    async fn test_unknown_role_is_foreign_key_violation() {
        let (repo, _) = setup().await;
        let err = repo.create("A", "a@example.com", "h", 999).await.unwrap_err();
        assert_eq!(
            constraint_violation(&err),
            Some(ConstraintViolation::ForeignKey)
        );
    }

    #[tokio::test]
    async fn test_list_with_roles() {
        let (repo, role_id) = setup().await;
        repo.create("A", "a@example.com", "h", role_id).await.unwrap();
        repo.create("B", "b@example.com", "h", role_id).await.unwrap();

        let users = repo.list_with_roles().await.unwrap();
        assert_eq!(users.len(), 2);
        assert!(users.iter().all(|u| u.role == "SUPPORT"));
    }
}
