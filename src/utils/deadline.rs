//! Deadlines for dependency round-trips.

use std::future::Future;
use std::time::Duration;

use serde_json::json;

use crate::error::AppError;

/// Runs `fut` with a deadline.
///
/// Expiry is reported as [`AppError::Dependency`] naming the operation.
pub async fn with_deadline<T, F>(limit: Duration, operation: &'static str, fut: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(AppError::dependency(
            "Dependency call timed out",
            json!({ "operation": operation, "timeout_ms": limit.as_millis() as u64 }),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_expired_deadline_is_dependency_error() {
        let result: Result<(), AppError> = with_deadline(Duration::from_secs(1), "store.list", async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(())
        })
        .await;

        let err = result.unwrap_err();
        assert!(matches!(err, AppError::Dependency { .. }));
        assert_eq!(err.to_error_info().details["operation"], "store.list");
    }

    #[tokio::test]
    async fn test_inner_result_passes_through() {
        let ok = with_deadline(Duration::from_secs(1), "op", async { Ok::<_, AppError>(7) }).await;
        assert_eq!(ok.unwrap(), 7);

        let err = with_deadline(Duration::from_secs(1), "op", async {
            Err::<(), _>(AppError::internal("boom", json!({})))
        })
        .await;
        assert!(matches!(err.unwrap_err(), AppError::Internal { .. }));
    }
}
