//! Store errors - infrastructure failures of the persistence collaborator
//!
//! "Not found" is not an error here: lookups return `Option`. Everything in
//! this enum is an infrastructure verdict and must never be reported to a
//! caller as an authentication outcome.

use thiserror::Error;

/// Persistence failure
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached or failed the statement
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The operation exceeded its deadline
    #[error("Store operation timed out after {0} ms")]
    Timeout(u64),

    /// A uniqueness constraint rejected the write
    #[error("Store conflict: {0}")]
    Conflict(String),
}

impl StoreError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Whether retrying the same call may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Timeout(_))
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "STORE_UNAVAILABLE",
            Self::Timeout(_) => "STORE_TIMEOUT",
            Self::Conflict(_) => "STORE_CONFLICT",
        }
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(StoreError::unavailable("connection reset").is_retryable());
        assert!(StoreError::Timeout(5000).is_retryable());
        assert!(!StoreError::Conflict("duplicate token".to_string()).is_retryable());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            StoreError::Timeout(250).to_string(),
            "Store operation timed out after 250 ms"
        );
    }
}
