//! User data models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// User row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[sqlx(rename = "password")]
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role_id: i64,
    pub created_at: String,
}

/// Public user info joined with the role name (safe to return to clients).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct UserInfo {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
}

/// What login needs: the public info plus the stored hash.
#[derive(Debug, Clone, FromRow)]
pub struct UserCredentials {
    #[sqlx(flatten)]
    pub info: UserInfo,
    #[sqlx(rename = "password")]
    pub password_hash: String,
}

/// Body of `POST /api/users`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role_id: Option<i64>,
}

impl RegisterRequest {
    /// All four fields present and non-empty.
    pub fn into_new_user(self) -> Option<NewUser> {
        let name = self.name.filter(|s| !s.trim().is_empty())?;
        let email = self.email.filter(|s| !s.trim().is_empty())?;
        let password = self.password.filter(|s| !s.is_empty())?;
        let role_id = self.role_id?;
        Some(NewUser {
            name,
            email,
            password,
            role_id,
        })
    }
}

/// A validated registration, password still in plain text.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role_id: i64,
}

/// Body of `POST /api/users/auth/login`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_serialization_hides_password() {
        let user = User {
            id: 1,
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            password_hash: "$2b$12$secret".to_string(),
            role_id: 3,
            created_at: "2024-01-01T00:00:00.000Z".to_string(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("password").is_none());
        assert_eq!(json["email"], "ana@example.com");
    }

    #[test]
    fn test_register_request_requires_every_field() {
        let full = RegisterRequest {
            name: Some("Ana".into()),
            email: Some("ana@example.com".into()),
            password: Some("pw".into()),
            role_id: Some(3),
        };
        assert!(full.clone().into_new_user().is_some());

        let no_role = RegisterRequest {
            role_id: None,
            ..full.clone()
        };
        assert!(no_role.into_new_user().is_none());

        let blank_name = RegisterRequest {
            name: Some("  ".into()),
            ..full
        };
        assert!(blank_name.into_new_user().is_none());
    }
}
