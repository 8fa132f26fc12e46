//! User handlers

use axum::{extract::State, Json};
use session_service::{AuthService, CurrentUserResponse};

use crate::extractors::AuthUser;
use crate::state::AppState;

/// Get current user
///
/// GET /users/@me
pub async fn get_current_user(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Json<CurrentUserResponse> {
    Json(AuthService::new(state.service_context()).current_user(auth.principal()))
}
