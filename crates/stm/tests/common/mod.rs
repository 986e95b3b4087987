//! Test utilities and common setup.
#![allow(dead_code)]

use axum::Router;
use stm::api::{self, AppState};
use stm::auth::{AuthConfig, AuthState, Role};
use stm::db::Database;
use stm::user::NewUser;

pub const TEST_SECRET: &str = "test-secret-for-integration-tests-minimum-32-chars";

/// Create a test AuthConfig with a JWT secret for testing.
pub fn test_auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: Some(TEST_SECRET.to_string()),
        // Lowest cost bcrypt accepts keeps the suite fast.
        bcrypt_cost: 4,
        ..AuthConfig::default()
    }
}

/// Router plus the state behind it, for tests that seed data directly.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

/// Create a test application over an in-memory database with default roles seeded.
pub async fn test_app_with_config(auth_config: AuthConfig) -> TestApp {
    let db = Database::in_memory().await.unwrap();
    let state = AppState::new(&db, AuthState::new(auth_config));
    state.roles.seed_defaults().await.unwrap();

    TestApp {
        router: api::create_router(state.clone()),
        state,
    }
}

pub async fn test_app() -> TestApp {
    test_app_with_config(test_auth_config()).await
}

/// ID of a seeded role.
pub async fn role_id(state: &AppState, role: Role) -> i64 {
    state
        .roles
        .get_by_name(role.as_str())
        .await
        .unwrap()
        .unwrap()
        .id
}

/// Insert a user with `role` and return its ID and a valid token.
pub async fn seed_user(state: &AppState, name: &str, role: Role) -> (i64, String) {
    let email = format!("{}@example.com", name.to_lowercase());
    let user = state
        .users
        .register(NewUser {
            name: name.to_string(),
            email: email.clone(),
            password: "password123".to_string(),
            role_id: role_id(state, role).await,
        })
        .await
        .unwrap();

    let token = state
        .auth
        .issue_token(user.id, &email, role.as_str())
        .unwrap();
    (user.id, token)
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}
