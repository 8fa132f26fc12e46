//! Error handling utilities for repositories

use session_core::StoreError;
use sqlx::Error as SqlxError;
use std::future::Future;
use std::time::Duration;

fn millis(deadline: Duration) -> u64 {
    u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX)
}

/// Convert an SQLx error into the store's infrastructure taxonomy
pub fn map_store_error(e: SqlxError, deadline: Duration) -> StoreError {
    match e {
        SqlxError::PoolTimedOut => StoreError::Timeout(millis(deadline)),
        SqlxError::Database(db) if db.is_unique_violation() => {
            StoreError::Conflict(db.message().to_string())
        }
        other => StoreError::Unavailable(other.to_string()),
    }
}

/// Run a database operation under a deadline
pub async fn bounded<T, F>(deadline: Duration, op: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, SqlxError>>,
{
    match tokio::time::timeout(deadline, op).await {
        Ok(result) => result.map_err(|e| map_store_error(e, deadline)),
        Err(_) => Err(StoreError::Timeout(millis(deadline))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_timeout_maps_to_timeout() {
        let err = map_store_error(SqlxError::PoolTimedOut, Duration::from_millis(250));
        assert_eq!(err, StoreError::Timeout(250));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_other_errors_are_unavailable() {
        let err = map_store_error(SqlxError::PoolClosed, Duration::from_secs(1));
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_bounded_elapses() {
        let result: Result<(), StoreError> = bounded(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, SqlxError>(())
        })
        .await;
        assert_eq!(result, Err(StoreError::Timeout(10)));
    }

    #[tokio::test]
    async fn test_bounded_passes_through() {
        let result = bounded(Duration::from_secs(1), async { Ok::<_, SqlxError>(7) }).await;
        assert_eq!(result, Ok(7));
    }
}
