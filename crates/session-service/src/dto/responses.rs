//! Response DTOs for API endpoints
//!
//! Subject IDs are serialized as strings for JavaScript compatibility.
//! Refresh-token secrets are only ever returned by login and refresh.

use chrono::{DateTime, Utc};
use serde::Serialize;
use session_common::SessionTokens;
use session_core::RefreshToken;

use crate::services::Principal;

/// Credential pair returned by login and refresh
#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

impl From<SessionTokens> for TokenResponse {
    fn from(tokens: SessionTokens) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            token_type: tokens.token_type,
            expires_in: tokens.expires_in,
        }
    }
}

/// The authenticated subject as seen from its access credential
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUserResponse {
    pub id: String,
    pub email: String,
}

impl From<&Principal> for CurrentUserResponse {
    fn from(principal: &Principal) -> Self {
        Self {
            id: principal.subject_id.to_string(),
            email: principal.email.clone(),
        }
    }
}

/// One active login lineage
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub id: String,
    pub family_id: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<&RefreshToken> for SessionResponse {
    fn from(record: &RefreshToken) -> Self {
        Self {
            id: record.id.to_string(),
            family_id: record.family_id.to_string(),
            issued_at: record.issued_at,
            expires_at: record.expires_at,
        }
    }
}

/// Result of a "log out everywhere" call
#[derive(Debug, Clone, Serialize)]
pub struct RevokedSessionsResponse {
    pub revoked: u64,
}

// ============================================================================
// Health Responses
// ============================================================================

/// Health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Readiness check response
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub store: String,
}

impl ReadinessResponse {
    pub fn ready(store_healthy: bool) -> Self {
        Self {
            status: if store_healthy { "ready" } else { "not_ready" }.to_string(),
            timestamp: Utc::now(),
            store: if store_healthy { "healthy" } else { "unhealthy" }.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use session_core::{FamilyId, SubjectId};

    #[test]
    fn test_session_response_hides_secret() {
        let now = Utc::now();
        let record = RefreshToken::issue(
            SubjectId::new(42),
            "user@example.com",
            "super-secret".to_string(),
            FamilyId::new("family"),
            now,
            Duration::days(7),
        );

        let json = serde_json::to_string(&SessionResponse::from(&record)).unwrap();
        assert!(!json.contains("super-secret"));
        assert!(json.contains("family"));
    }

    #[test]
    fn test_readiness_response() {
        let ready = ReadinessResponse::ready(true);
        assert_eq!(ready.status, "ready");
        assert_eq!(ready.store, "healthy");

        let not_ready = ReadinessResponse::ready(false);
        assert_eq!(not_ready.status, "not_ready");
    }
}
