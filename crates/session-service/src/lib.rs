//! # session-service
//!
//! Application layer: the session authority state machine, password login
//! orchestration, the expired-row sweeper, and DTOs.

pub mod dto;
pub mod services;

pub use dto::{
    CurrentUserResponse, HealthResponse, LoginRequest, LogoutRequest, ReadinessResponse,
    RefreshTokenRequest, RevokedSessionsResponse, SessionResponse, TokenResponse,
};
pub use services::{
    AuthService, ExpiredSessionSweeper, Principal, ServiceContext, ServiceContextBuilder,
    ServiceError, ServiceResult, SessionAuthority, SessionPolicy, SweeperHandle, TokenLifetimes,
};
