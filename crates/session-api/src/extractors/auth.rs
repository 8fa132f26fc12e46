//! Authentication extractor
//!
//! Extracts the bearer access credential from the Authorization header and
//! validates it through the session authority, denylist included.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use session_service::{Principal, ServiceError};

use crate::response::ApiError;
use crate::state::AppState;

/// Authenticated caller
#[derive(Debug, Clone)]
pub struct AuthUser(pub Principal);

impl AuthUser {
    pub fn principal(&self) -> &Principal {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::MissingAuth)?;

        let app_state = AppState::from_ref(state);

        let principal = app_state
            .authority()
            .validate_access_credential(bearer.token())
            .await
            .map_err(|e| {
                if let ServiceError::Credential(reason) = &e {
                    tracing::warn!(error = %reason, "Rejected access credential");
                }
                ApiError::from(e)
            })?;

        Ok(AuthUser(principal))
    }
}
