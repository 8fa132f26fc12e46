//! Domain errors - verdicts of the session state machine

use thiserror::Error;

use crate::error::StoreError;
use crate::value_objects::SubjectId;

/// Session domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Authentication Verdicts
    // =========================================================================
    /// Login with an unknown subject or a wrong secret (never distinguished)
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Presented refresh token does not exist
    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    /// Refresh token exists, is not revoked, but has aged out
    #[error("Refresh token expired")]
    RefreshTokenExpired,

    /// Refresh token was already revoked and presented again; its family has been revoked
    #[error("Refresh token reuse detected")]
    RefreshTokenReused,

    // =========================================================================
    // Lookup Errors
    // =========================================================================
    #[error("Subject not found: {0}")]
    SubjectNotFound(SubjectId),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InvalidRefreshToken => "INVALID_REFRESH_TOKEN",
            Self::RefreshTokenExpired => "TOKEN_EXPIRED",
            Self::RefreshTokenReused => "TOKEN_REUSED",
            Self::SubjectNotFound(_) => "UNKNOWN_SUBJECT",
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::Store(e) => e.code(),
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is an authentication verdict (caller presented bad material)
    pub fn is_authentication(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials
                | Self::InvalidRefreshToken
                | Self::RefreshTokenExpired
                | Self::RefreshTokenReused
        )
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::SubjectNotFound(_))
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::ValidationError(_))
    }

    /// Check if the failure is infrastructural and worth retrying
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Store(e) => e.is_retryable(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(DomainError::RefreshTokenReused.code(), "TOKEN_REUSED");
        assert_eq!(DomainError::RefreshTokenExpired.code(), "TOKEN_EXPIRED");
        assert_eq!(DomainError::InvalidRefreshToken.code(), "INVALID_REFRESH_TOKEN");
        assert_eq!(
            DomainError::Store(StoreError::Timeout(10)).code(),
            "STORE_TIMEOUT"
        );
    }

    #[test]
    fn test_store_errors_are_not_verdicts() {
        let err = DomainError::from(StoreError::unavailable("down"));
        assert!(!err.is_authentication());
        assert!(err.is_retryable());

        assert!(DomainError::RefreshTokenReused.is_authentication());
        assert!(!DomainError::RefreshTokenReused.is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = DomainError::SubjectNotFound(SubjectId::new(123));
        assert_eq!(err.to_string(), "Subject not found: 123");
        assert_eq!(
            DomainError::from(StoreError::unavailable("pool closed")).to_string(),
            "Store unavailable: pool closed"
        );
    }
}
