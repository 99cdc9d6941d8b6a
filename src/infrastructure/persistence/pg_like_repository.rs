//! PostgreSQL implementation of like repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Like, LikeInsert, NewLike};
use crate::domain::repositories::LikeRepository;
use crate::error::AppError;

/// Name of the `(actor_id, target_id)` uniqueness constraint in `post_likes`.
pub const UNIQUE_LIKE_CONSTRAINT: &str = "unique_like";

/// PostgreSQL repository for like records.
///
/// Inserts are plain `INSERT`s: a duplicate pair surfaces as a unique
/// violation on [`UNIQUE_LIKE_CONSTRAINT`], which is reported as
/// [`LikeInsert::AlreadyExists`] rather than an error.
pub struct PgLikeRepository {
    pool: Arc<PgPool>,
}

impl PgLikeRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

fn is_duplicate_like(e: &sqlx::Error) -> bool {
    let Some(db_err) = e.as_database_error() else {
        return false;
    };

    if !db_err.is_unique_violation() {
        return false;
    }

    matches!(db_err.constraint(), Some(UNIQUE_LIKE_CONSTRAINT))
}

#[async_trait]
impl LikeRepository for PgLikeRepository {
    async fn insert(&self, like: NewLike) -> Result<LikeInsert, AppError> {
        let result = sqlx::query_as::<_, Like>(
            r#"
            INSERT INTO post_likes (actor_id, target_id)
            VALUES ($1, $2)
            RETURNING id, actor_id, target_id, created_at
            "#,
        )
        .bind(like.actor_id)
        .bind(like.target_id)
        .fetch_one(self.pool.as_ref())
        .await;

        match result {
            Ok(row) => Ok(LikeInsert::Created(row)),
            Err(e) if is_duplicate_like(&e) => {
                tracing::debug!(
                    actor_id = like.actor_id,
                    target_id = like.target_id,
                    "Like already recorded"
                );
                Ok(LikeInsert::AlreadyExists)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn count_for_target(&self, target_id: i64) -> Result<i64, AppError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM post_likes WHERE target_id = $1")
                .bind(target_id)
                .fetch_one(self.pool.as_ref())
                .await?;

        Ok(count)
    }
}
