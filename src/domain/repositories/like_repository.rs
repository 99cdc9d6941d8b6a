//! Repository trait for like records.

use crate::domain::entities::{LikeInsert, NewLike};
use crate::error::AppError;
use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LikeRepository: Send + Sync {
    /// Records a like.
    ///
    /// Returns [`LikeInsert::AlreadyExists`] when the `(actor_id, target_id)`
    /// uniqueness constraint rejects the row. The existing row is not touched.
    ///
    /// # Errors
    ///
    /// Any other database failure, including violations of constraints other
    /// than the like uniqueness constraint.
    async fn insert(&self, like: NewLike) -> Result<LikeInsert, AppError>;

    /// Counts likes recorded for a target.
    async fn count_for_target(&self, target_id: i64) -> Result<i64, AppError>;
}
