//! Authentication test helpers
//!
//! Provides utilities for creating test users and generating tokens
//! signed with the test secret.

use uuid::Uuid;

use realty_chat::backend::auth::{create_token, JwtKeys};
use realty_chat::shared::messaging::Role;

/// Secret every test server and token share
pub const TEST_SECRET: &str = "realty-chat-test-secret";

/// Test user credentials
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub token: String,
}

impl TestUser {
    pub fn new(name: &str, role: Role) -> Self {
        let id = Uuid::new_v4();
        let email = format!("{}_{}@example.com", name.to_lowercase(), id.simple());
        let token = generate_test_token(id, &email, name, role);
        Self {
            id,
            name: name.to_string(),
            email,
            role,
            token,
        }
    }
}

/// A fresh client with a unique id
pub fn client_user() -> TestUser {
    TestUser::new("Dana", Role::Client)
}

/// A fresh admin with a unique id
pub fn admin_user() -> TestUser {
    TestUser::new("Agent", Role::Admin)
}

/// Generate a test JWT token
pub fn generate_test_token(user_id: Uuid, email: &str, name: &str, role: Role) -> String {
    create_token(&JwtKeys::from_secret(TEST_SECRET), user_id, email, name, role)
        .expect("Failed to generate test token")
}

/// Create authorization header value
pub fn auth_header(token: &str) -> String {
    format!("Bearer {}", token)
}
