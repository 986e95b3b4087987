//! Role repository for database operations.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::{debug, instrument};

use super::models::RoleRecord;
use crate::auth::Role;

/// Repository for role database operations.
#[derive(Debug, Clone)]
pub struct RoleRepository {
    pool: SqlitePool,
}

impl RoleRepository {
    /// Create a new role repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert MANAGER, SUPPORT and USER if they are missing.
    #[instrument(skip(self))]
    pub async fn seed_defaults(&self) -> Result<()> {
        for role in Role::ALL {
            sqlx::query("INSERT OR IGNORE INTO roles (name) VALUES (?)")
                .bind(role.as_str())
                .execute(&self.pool)
                .await
                .with_context(|| format!("Failed to seed role {}", role))?;
        }
        debug!("Default roles present");
        Ok(())
    }

    /// Create a new role.
    #[instrument(skip(self))]
    pub async fn create(&self, name: &str) -> Result<RoleRecord> {
        sqlx::query_as::<_, RoleRecord>("INSERT INTO roles (name) VALUES (?) RETURNING id, name")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .context("Failed to insert role")
    }

    /// List all roles.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<RoleRecord>> {
        sqlx::query_as::<_, RoleRecord>("SELECT id, name FROM roles ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list roles")
    }

    /// Get a role by ID.
    #[instrument(skip(self))]
    pub async fn get(&self, id: i64) -> Result<Option<RoleRecord>> {
        sqlx::query_as::<_, RoleRecord>("SELECT id, name FROM roles WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch role")
    }

    /// Get a role by name.
    #[instrument(skip(self))]
    pub async fn get_by_name(&self, name: &str) -> Result<Option<RoleRecord>> {
        sqlx::query_as::<_, RoleRecord>("SELECT id, name FROM roles WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch role by name")
    }

    /// Rename a role. Returns `None` when no role has this ID.
    #[instrument(skip(self))]
    pub async fn update(&self, id: i64, name: &str) -> Result<Option<RoleRecord>> {
        sqlx::query_as::<_, RoleRecord>(
            "UPDATE roles SET name = ? WHERE id = ? RETURNING id, name",
        )
        .bind(name)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to update role")
    }

    /// Delete a role. Returns `false` when no role has this ID.
    ///
    /// Fails with a foreign-key violation while users still reference it.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM roles WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete role")?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{ConstraintViolation, Database, constraint_violation};

    async fn repo() -> RoleRepository {
        let db = Database::in_memory().await.unwrap();
        RoleRepository::new(db.pool().clone())
    }

    #[tokio::test]
    async fn test_seed_defaults_is_idempotent() {
        let repo = repo().await;
        repo.seed_defaults().await.unwrap();
        repo.seed_defaults().await.unwrap();

        let names: Vec<String> = repo.list().await.unwrap().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["MANAGER", "SUPPORT", "USER"]);
    }

    #[tokio::test]
    async fn test_create_get_update_delete() {
        let repo = repo().await;
        let role = repo.create("AUDITOR").await.unwrap();
        assert_eq!(repo.get(role.id).await.unwrap(), Some(role.clone()));

        let renamed = repo.update(role.id, "REVIEWER").await.unwrap().unwrap();
        assert_eq!(renamed.name, "REVIEWER");
        assert_eq!(
            repo.get_by_name("REVIEWER").await.unwrap().map(|r| r.id),
            Some(role.id)
        );

        assert!(repo.delete(role.id).await.unwrap());
        assert!(!repo.delete(role.id).await.unwrap());
        assert!(repo.get(role.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_missing_role_returns_none() {
        let repo = repo().await;
        assert!(repo.update(404, "GHOST").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_name_is_unique_violation() {
        let repo = repo().await;
        repo.create("MANAGER").await.unwrap();
        let err = repo.create("MANAGER").await.unwrap_err();
        assert_eq!(constraint_violation(&err), Some(ConstraintViolation::Unique));
    }

    #[tokio::test]
    async fn test_delete_role_in_use_is_foreign_key_violation() {
        let db = Database::in_memory().await.unwrap();
        let repo = RoleRepository::new(db.pool().clone());
        repo.seed_defaults().await.unwrap();
        let user_role = repo.get_by_name("USER").await.unwrap().unwrap();

        sqlx::query("INSERT INTO users (name, email, password, role_id) VALUES (?, ?, ?, ?)")
            .bind("Uma")
            .bind("uma@example.com")
            .bind("hash")
            .bind(user_role.id)
            .execute(db.pool())
            .await
            .unwrap();

        let err = repo.delete(user_role.id).await.unwrap_err();
        assert_eq!(
            constraint_violation(&err),
            Some(ConstraintViolation::ForeignKey)
        );
        assert!(repo.get(user_role.id).await.unwrap().is_some());
    }
}
