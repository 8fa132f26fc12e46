//! Authentication service
//!
//! Handles password login and the HTTP-facing wrappers around the session
//! authority: refresh, logout, current user and session listing.

use std::sync::Arc;

use session_common::AppError;
use session_core::{PasswordVerifier, User};
use tracing::{info, instrument, warn};

use crate::dto::{
    CurrentUserResponse, LoginRequest, LogoutRequest, RefreshTokenRequest,
    RevokedSessionsResponse, SessionResponse, TokenResponse,
};

use super::authority::Principal;
use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Authentication service
pub struct AuthService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AuthService<'a> {
    /// Create a new AuthService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Login with email and password
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: LoginRequest) -> ServiceResult<TokenResponse> {
        let user = self.ctx.user_repo().find_by_email(&request.email).await?;

        let digest = match &user {
            Some(user) => Arc::from(user.password_hash.as_str()),
            None => Arc::clone(self.ctx.dummy_digest()),
        };
        let matches =
            verify_blocking(Arc::clone(self.ctx.password()), digest, request.password).await?;

        let user: User = match user {
            Some(user) if matches => user,
            Some(user) => {
                warn!(user_id = %user.id, "Login failed: invalid password");
                return Err(AppError::InvalidCredentials.into());
            }
            None => {
                warn!("Login failed: user not found");
                return Err(AppError::InvalidCredentials.into());
            }
        };

        let tokens = self.ctx.authority().login(user.id, &user.email).await?;
        info!(user_id = %user.id, "User logged in successfully");

        Ok(tokens.into())
    }

    /// Exchange a refresh token for a new pair
    #[instrument(skip_all)]
    pub async fn refresh(&self, request: RefreshTokenRequest) -> ServiceResult<TokenResponse> {
        let tokens = self.ctx.authority().refresh(&request.refresh_token).await?;
        Ok(tokens.into())
    }

    /// End the caller's session
    #[instrument(skip_all, fields(user_id = %principal.subject_id))]
    pub async fn logout(&self, principal: &Principal, request: LogoutRequest) {
        self.ctx
            .authority()
            .logout(principal, request.refresh_token.as_deref())
            .await;
    }

    /// The caller as seen from its access credential
    pub fn current_user(&self, principal: &Principal) -> CurrentUserResponse {
        CurrentUserResponse::from(principal)
    }

    /// Active sessions of the caller
    #[instrument(skip_all, fields(user_id = %principal.subject_id))]
    pub async fn sessions(&self, principal: &Principal) -> ServiceResult<Vec<SessionResponse>> {
        let records = self
            .ctx
            .authority()
            .list_active_sessions(principal.subject_id)
            .await?;
        Ok(records.iter().map(SessionResponse::from).collect())
    }

    /// Revoke every session of the caller
    #[instrument(skip_all, fields(user_id = %principal.subject_id))]
    pub async fn revoke_all_sessions(
        &self,
        principal: &Principal,
    ) -> ServiceResult<RevokedSessionsResponse> {
        let revoked = self
            .ctx
            .authority()
            .revoke_all_sessions(principal.subject_id)
            .await?;
        Ok(RevokedSessionsResponse { revoked })
    }
}

/// Run password verification off the async worker threads
async fn verify_blocking(
    verifier: Arc<dyn PasswordVerifier>,
    digest: Arc<str>,
    password: String,
) -> ServiceResult<bool> {
    tokio::task::spawn_blocking(move || verifier.verify(&digest, &password))
        .await
        .map_err(|e| ServiceError::internal(format!("password verification task failed: {e}")))
}
