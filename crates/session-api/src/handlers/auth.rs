//! Authentication handlers
//!
//! Endpoints for login, token refresh, logout, and session management.

use axum::{extract::State, Json};
use session_service::{
    AuthService, LoginRequest, LogoutRequest, RefreshTokenRequest, RevokedSessionsResponse,
    SessionResponse, TokenResponse,
};

use crate::extractors::{AuthUser, ValidatedJson};
use crate::response::{ApiResult, NoContent};
use crate::state::AppState;

/// Login with email and password
///
/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let service = AuthService::new(state.service_context());
    let response = service.login(request).await?;
    Ok(Json(response))
}

/// Exchange a refresh token for a new pair
///
/// POST /auth/refresh
pub async fn refresh_token(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RefreshTokenRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let service = AuthService::new(state.service_context());
    let response = service.refresh(request).await?;
    Ok(Json(response))
}

/// Logout; the body and its refresh token are optional
///
/// POST /auth/logout
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
    body: Option<Json<LogoutRequest>>,
) -> NoContent {
    let request = body.map(|Json(b)| b).unwrap_or_default();
    AuthService::new(state.service_context())
        .logout(auth.principal(), request)
        .await;
    NoContent
}

/// List active sessions
///
/// GET /auth/sessions
pub async fn list_sessions(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<SessionResponse>>> {
    let service = AuthService::new(state.service_context());
    let response = service.sessions(auth.principal()).await?;
    Ok(Json(response))
}

/// Log out everywhere
///
/// DELETE /auth/sessions
pub async fn revoke_sessions(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<RevokedSessionsResponse>> {
    let service = AuthService::new(state.service_context());
    let response = service.revoke_all_sessions(auth.principal()).await?;
    Ok(Json(response))
}
