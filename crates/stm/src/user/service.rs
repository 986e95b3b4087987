//! User service for business logic.

use anyhow::{Context, Result};
use tracing::{info, instrument};

use super::models::{NewUser, User, UserInfo};
use super::repository::UserRepository;

/// Service for registration and login.
#[derive(Debug, Clone)]
pub struct UserService {
    repo: UserRepository,
    bcrypt_cost: u32,
}

impl UserService {
    /// Create a new user service.
    pub fn new(repo: UserRepository, bcrypt_cost: u32) -> Self {
        Self { repo, bcrypt_cost }
    }

    /// Hash the password and store the user.
    ///
    /// Duplicate emails and unknown role ids surface as constraint violations
    /// in the error chain.
    #[instrument(skip(self, new_user), fields(email = %new_user.email))]
    pub async fn register(&self, new_user: NewUser) -> Result<User> {
        let hash = hash_password(new_user.password, self.bcrypt_cost).await?;
        let user = self
            .repo
            .create(&new_user.name, &new_user.email, &hash, new_user.role_id)
            .await?;
        info!(user_id = user.id, "Registered new user");

        Ok(user)
    }

    /// Check an email/password pair. `None` when either is wrong.
    #[instrument(skip(self, password))]
    pub async fn verify_credentials(&self, email: &str, password: &str) -> Result<Option<UserInfo>> {
        let Some(creds) = self.repo.get_credentials_by_email(email).await? else {
            return Ok(None);
        };

        if verify_password(password.to_string(), creds.password_hash).await? {
            Ok(Some(creds.info))
        } else {
            Ok(None)
        }
    }

    /// List every user with their role name.
    pub async fn list(&self) -> Result<Vec<UserInfo>> {
        self.repo.list_with_roles().await
    }

    /// Public info for one user.
    pub async fn get_info(&self, id: i64) -> Result<Option<UserInfo>> {
        self.repo.get_info(id).await
    }
}

/// Hash a password using bcrypt on the blocking pool.
async fn hash_password(password: String, cost: u32) -> Result<String> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .context("Password hashing task failed")?
        .context("Failed to hash password")
}

/// Verify a password against a bcrypt hash on the blocking pool.
///
/// A stored value that is not a bcrypt hash counts as a mismatch.
async fn verify_password(password: String, hash: String) -> Result<bool> {
    let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .context("Password verification task failed")?;

    Ok(verified.unwrap_or(false))
}
