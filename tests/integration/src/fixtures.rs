//! Test fixtures and data generators

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Default password for seeded users
pub const TEST_PASSWORD: &str = "TestPass123!";

/// Get a unique suffix for test data
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// A fresh unique email address
pub fn unique_email() -> String {
    format!("test{}@example.com", unique_suffix())
}

/// Login request
#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: email.to_string(),
            password: password.to_string(),
        }
    }
}

/// Refresh request
#[derive(Debug, Serialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

impl RefreshRequest {
    pub fn new(token: &str) -> Self {
        Self {
            refresh_token: token.to_string(),
        }
    }
}

/// Logout request
#[derive(Debug, Default, Serialize)]
pub struct LogoutRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl LogoutRequest {
    pub fn with_refresh(token: &str) -> Self {
        Self {
            refresh_token: Some(token.to_string()),
        }
    }
}

/// Credential pair returned by login and refresh
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Current user response
#[derive(Debug, Deserialize)]
pub struct CurrentUserResponse {
    pub id: String,
    pub email: String,
}

/// Active session entry
#[derive(Debug, Deserialize)]
pub struct SessionResponse {
    pub id: String,
    pub family_id: String,
    pub issued_at: String,
    pub expires_at: String,
}

/// Log-out-everywhere response
#[derive(Debug, Deserialize)]
pub struct RevokedSessionsResponse {
    pub revoked: u64,
}
