//! API Integration Tests
//!
//! Every test spawns its own in-process server on an ephemeral port backed by
//! the memory store, so no external services are required.
//!
//! Run with: cargo test -p integration-tests --test api_tests

use std::collections::HashSet;

use integration_tests::{
    assert_error, assert_json, assert_status, fixtures::*, TestServer, TEST_PASSWORD,
};
use reqwest::StatusCode;

async fn login(server: &TestServer, email: &str) -> TokenResponse {
    let response = server
        .post("/api/v1/auth/login", &LoginRequest::new(email, TEST_PASSWORD))
        .await
        .unwrap();
    assert_json(response, StatusCode::OK).await.unwrap()
}

async fn refresh(server: &TestServer, token: &str) -> reqwest::Response {
    server
        .post("/api/v1/auth/refresh", &RefreshRequest::new(token))
        .await
        .unwrap()
}

async fn seeded() -> (TestServer, String) {
    let server = TestServer::start().await.expect("Failed to start server");
    let email = unique_email();
    server.seed_user(&email, TEST_PASSWORD).await.unwrap();
    (server, email)
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health").await.expect("Request failed");
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_health_ready() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health/ready").await.expect("Request failed");
    let body: serde_json::Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["store"], "healthy");
}

// ============================================================================
// Login Tests
// ============================================================================

#[tokio::test]
async fn test_login() {
    let (server, email) = seeded().await;
    let tokens = login(&server, &email).await;

    assert_eq!(tokens.token_type, "Bearer");
    assert_eq!(tokens.expires_in, 900);
    assert!(!tokens.access_token.is_empty());
    assert!(!tokens.refresh_token.is_empty());
}

#[tokio::test]
async fn test_login_invalid_password() {
    let (server, email) = seeded().await;
    let response = server
        .post("/api/v1/auth/login", &LoginRequest::new(&email, "WrongPass1!"))
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(code, "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_login_unknown_email() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server
        .post(
            "/api/v1/auth/login",
            &LoginRequest::new(&unique_email(), TEST_PASSWORD),
        )
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(code, "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_login_malformed_email() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server
        .post(
            "/api/v1/auth/login",
            &LoginRequest::new("not-an-email", TEST_PASSWORD),
        )
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(code, "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_current_user() {
    let (server, email) = seeded().await;
    let tokens = login(&server, &email).await;

    let response = server
        .get_auth("/api/v1/users/@me", &tokens.access_token)
        .await
        .unwrap();
    let me: CurrentUserResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(me.email, email);
    assert!(me.id.parse::<i64>().is_ok());
}

#[tokio::test]
async fn test_current_user_requires_auth() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/api/v1/users/@me").await.unwrap();
    let code = assert_error(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(code, "MISSING_AUTHORIZATION");
}

// ============================================================================
// Refresh Tests
// ============================================================================

#[tokio::test]
async fn test_refresh_rotates_tokens() {
    let (server, email) = seeded().await;
    let first = login(&server, &email).await;

    let second: TokenResponse =
        assert_json(refresh(&server, &first.refresh_token).await, StatusCode::OK)
            .await
            .unwrap();

    assert_ne!(first.refresh_token, second.refresh_token);
    assert_ne!(first.access_token, second.access_token);
}

#[tokio::test]
async fn test_refresh_chain_produces_unique_tokens() {
    let (server, email) = seeded().await;
    let mut current = login(&server, &email).await;
    let mut seen = HashSet::from([current.refresh_token.clone()]);

    for _ in 0..5 {
        current = assert_json(refresh(&server, &current.refresh_token).await, StatusCode::OK)
            .await
            .unwrap();
        assert!(seen.insert(current.refresh_token.clone()));
    }

    // Still one lineage
    let response = server
        .get_auth("/api/v1/auth/sessions", &current.access_token)
        .await
        .unwrap();
    let sessions: Vec<SessionResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(sessions.len(), 1);
}

#[tokio::test]
async fn test_refresh_reuse_revokes_family() {
    let (server, email) = seeded().await;
    let first = login(&server, &email).await;
    let second: TokenResponse =
        assert_json(refresh(&server, &first.refresh_token).await, StatusCode::OK)
            .await
            .unwrap();

    // Replaying the superseded token is reuse
    let code = assert_error(refresh(&server, &first.refresh_token).await, StatusCode::UNAUTHORIZED)
        .await
        .unwrap();
    assert_eq!(code, "TOKEN_REUSED");

    // ... and it took the legitimate successor down with it
    let code = assert_error(refresh(&server, &second.refresh_token).await, StatusCode::UNAUTHORIZED)
        .await
        .unwrap();
    assert_eq!(code, "TOKEN_REUSED");
}

#[tokio::test]
async fn test_reuse_leaves_other_logins_alone() {
    let (server, email) = seeded().await;
    let laptop = login(&server, &email).await;
    let phone = login(&server, &email).await;

    assert_status(refresh(&server, &laptop.refresh_token).await, StatusCode::OK)
        .await
        .unwrap();
    assert_status(refresh(&server, &laptop.refresh_token).await, StatusCode::UNAUTHORIZED)
        .await
        .unwrap();

    assert_status(refresh(&server, &phone.refresh_token).await, StatusCode::OK)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_refresh_unknown_token() {
    let server = TestServer::start().await.expect("Failed to start server");
    let code = assert_error(refresh(&server, "never-issued").await, StatusCode::UNAUTHORIZED)
        .await
        .unwrap();
    assert_eq!(code, "INVALID_REFRESH_TOKEN");
}

#[tokio::test]
async fn test_refresh_empty_token() {
    let server = TestServer::start().await.expect("Failed to start server");
    let code = assert_error(refresh(&server, "").await, StatusCode::BAD_REQUEST)
        .await
        .unwrap();
    assert_eq!(code, "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_refresh_missing_body() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server
        .post("/api/v1/auth/refresh", &serde_json::json!({}))
        .await
        .unwrap();
    assert_status(response, StatusCode::BAD_REQUEST).await.unwrap();
}

#[tokio::test]
async fn test_concurrent_refresh_has_one_winner() {
    let (server, email) = seeded().await;
    let tokens = login(&server, &email).await;

    let (a, b) = tokio::join!(
        refresh(&server, &tokens.refresh_token),
        refresh(&server, &tokens.refresh_token)
    );
    let statuses = [a.status(), b.status()];

    assert_eq!(statuses.iter().filter(|s| **s == StatusCode::OK).count(), 1);
    assert_eq!(
        statuses
            .iter()
            .filter(|s| **s == StatusCode::UNAUTHORIZED)
            .count(),
        1
    );
}

// ============================================================================
// Logout Tests
// ============================================================================

#[tokio::test]
async fn test_logout_then_refresh_fails() {
    let (server, email) = seeded().await;
    let tokens = login(&server, &email).await;

    let response = server
        .post_auth(
            "/api/v1/auth/logout",
            &tokens.access_token,
            &LogoutRequest::with_refresh(&tokens.refresh_token),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    assert_status(refresh(&server, &tokens.refresh_token).await, StatusCode::UNAUTHORIZED)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_logout_denylists_access_token() {
    let (server, email) = seeded().await;
    let tokens = login(&server, &email).await;

    let response = server
        .post_auth("/api/v1/auth/logout", &tokens.access_token, &LogoutRequest::default())
        .await
        .unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    let response = server
        .get_auth("/api/v1/users/@me", &tokens.access_token)
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(code, "CREDENTIAL_REVOKED");
}

#[tokio::test]
async fn test_logout_without_auth() {
    let (server, email) = seeded().await;
    let tokens = login(&server, &email).await;

    let response = server
        .post(
            "/api/v1/auth/logout",
            &LogoutRequest::with_refresh(&tokens.refresh_token),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();

    // Nothing was revoked
    assert_status(refresh(&server, &tokens.refresh_token).await, StatusCode::OK)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_logout_is_idempotent() {
    let server = TestServer::start_with(&[("SESSION_DENYLIST_ACCESS_ON_LOGOUT", "false")])
        .await
        .expect("Failed to start server");
    let email = unique_email();
    server.seed_user(&email, TEST_PASSWORD).await.unwrap();
    let tokens = login(&server, &email).await;

    for _ in 0..2 {
        let response = server
            .post_auth(
                "/api/v1/auth/logout",
                &tokens.access_token,
                &LogoutRequest::with_refresh(&tokens.refresh_token),
            )
            .await
            .unwrap();
        assert_status(response, StatusCode::NO_CONTENT).await.unwrap();
    }
}

#[tokio::test]
async fn test_revoke_all_on_logout() {
    let server = TestServer::start_with(&[("SESSION_REVOKE_ALL_ON_LOGOUT", "true")])
        .await
        .expect("Failed to start server");
    let email = unique_email();
    server.seed_user(&email, TEST_PASSWORD).await.unwrap();
    let laptop = login(&server, &email).await;
    let phone = login(&server, &email).await;

    let response = server
        .post_auth("/api/v1/auth/logout", &laptop.access_token, &LogoutRequest::default())
        .await
        .unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    assert_status(refresh(&server, &phone.refresh_token).await, StatusCode::UNAUTHORIZED)
        .await
        .unwrap();
}

// ============================================================================
// Session Management Tests
// ============================================================================

#[tokio::test]
async fn test_list_and_revoke_sessions() {
    let (server, email) = seeded().await;
    let laptop = login(&server, &email).await;
    let phone = login(&server, &email).await;

    let response = server
        .get_auth("/api/v1/auth/sessions", &laptop.access_token)
        .await
        .unwrap();
    let sessions: Vec<SessionResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(sessions.len(), 2);
    assert_ne!(sessions[0].family_id, sessions[1].family_id);

    let response = server
        .delete_auth("/api/v1/auth/sessions", &laptop.access_token)
        .await
        .unwrap();
    let revoked: RevokedSessionsResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(revoked.revoked, 2);

    assert_status(refresh(&server, &phone.refresh_token).await, StatusCode::UNAUTHORIZED)
        .await
        .unwrap();

    // Access credentials stay valid until they expire
    let response = server
        .get_auth("/api/v1/users/@me", &phone.access_token)
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_access_token_survives_rotation() {
    let (server, email) = seeded().await;
    let first = login(&server, &email).await;
    assert_status(refresh(&server, &first.refresh_token).await, StatusCode::OK)
        .await
        .unwrap();

    let response = server
        .get_auth("/api/v1/users/@me", &first.access_token)
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();
}

#[tokio::test]
async fn test_refresh_token_is_not_an_access_token() {
    let (server, email) = seeded().await;
    let tokens = login(&server, &email).await;

    let response = server
        .get_auth("/api/v1/users/@me", &tokens.refresh_token)
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(code, "MALFORMED_CREDENTIAL");
}
