//! Data transfer objects for API requests and responses

pub mod requests;
pub mod responses;

pub use requests::{LoginRequest, LogoutRequest, RefreshTokenRequest};
pub use responses::{
    CurrentUserResponse, HealthResponse, ReadinessResponse, RevokedSessionsResponse, SessionResponse,
    TokenResponse,
};
