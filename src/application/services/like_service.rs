//! Like ingestion and counts.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use crate::domain::messages::{LikeEvent, decode, encode};
use crate::domain::repositories::LikeRepository;
use crate::error::AppError;
use crate::infrastructure::broker::{LIKE_EVENTS, MessagePublisher};
use crate::utils::with_deadline;

pub struct LikeService<R: LikeRepository> {
    repository: Arc<R>,
    publisher: Arc<dyn MessagePublisher>,
    store_timeout: Duration,
}

impl<R: LikeRepository> LikeService<R> {
    pub fn new(
        repository: Arc<R>,
        publisher: Arc<dyn MessagePublisher>,
        store_timeout: Duration,
    ) -> Self {
        Self {
            repository,
            publisher,
            store_timeout,
        }
    }

    /// Validates a like action and publishes it for asynchronous recording.
    ///
    /// Duplicate likes are accepted here; the worker collapses them.
    pub async fn enqueue(&self, body: &[u8]) -> Result<LikeEvent, AppError> {
        let event: LikeEvent = decode(body)?;
        self.publisher.publish(&LIKE_EVENTS, encode(&event)?).await?;
        Ok(event)
    }

    /// Number of distinct actors that liked `target_id`.
    pub async fn count_for_target(&self, target_id: i64) -> Result<i64, AppError> {
        if target_id < 1 {
            return Err(AppError::bad_request(
                "target_id must be positive",
                json!({ "target_id": target_id }),
            ));
        }

        with_deadline(
            self.store_timeout,
            "store.count_likes",
            self.repository.count_for_target(target_id),
        )
        .await
    }
}
