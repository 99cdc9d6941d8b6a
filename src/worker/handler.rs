//! Per-queue message handlers.
//!
//! A handler turns one payload into a [`Processed`] outcome or a
//! [`ConsumeError`]. It never touches the broker; acknowledgement is decided
//! by [`crate::worker::consumer`] from the returned value.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use crate::domain::entities::LikeInsert;
use crate::domain::messages::{CreateProduct, LikeEvent, decode};
use crate::domain::repositories::{LikeRepository, ProductRepository};
use crate::error::AppError;
use crate::utils::with_deadline;

/// Successful handling of a message. Both variants lead to an ack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Processed {
    Persisted,
    /// A uniqueness constraint the schema anticipates already holds the
    /// desired row.
    AlreadyPresent,
}

/// Why a message could not be handled.
#[derive(Debug, thiserror::Error)]
pub enum ConsumeError {
    /// The payload can never be processed. Dropped without requeue.
    #[error("poison message: {0}")]
    Poison(String),

    /// The store failed for a reason that may clear up. Requeued.
    #[error("transient persistence failure: {0}")]
    Transient(#[source] AppError),
}

impl ConsumeError {
    fn poison(err: AppError) -> Self {
        let info = err.to_error_info();
        ConsumeError::Poison(format!("{} ({})", info.message, info.details))
    }
}

#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, payload: &[u8]) -> Result<Processed, ConsumeError>;
}

/// Inserts queued [`CreateProduct`] requests.
///
/// Inserts are not idempotent: a redelivery after a crash between commit and
/// ack creates a second product row.
pub struct ProductInsertHandler<R: ProductRepository> {
    repository: Arc<R>,
    store_timeout: Duration,
}

impl<R: ProductRepository> ProductInsertHandler<R> {
    pub fn new(repository: Arc<R>, store_timeout: Duration) -> Self {
        Self {
            repository,
            store_timeout,
        }
    }
}

#[async_trait]
impl<R: ProductRepository> MessageHandler for ProductInsertHandler<R> {
    async fn handle(&self, payload: &[u8]) -> Result<Processed, ConsumeError> {
        let msg: CreateProduct = decode(payload).map_err(ConsumeError::poison)?;

        let product = with_deadline(
            self.store_timeout,
            "store.insert_product",
            self.repository.insert(msg.into()),
        )
        .await
        .map_err(ConsumeError::Transient)?;

        info!(id = product.id, name = %product.name, "Product inserted");
        Ok(Processed::Persisted)
    }
}

/// Records queued [`LikeEvent`]s. A duplicate pair is a successful no-op.
pub struct LikeRecordHandler<R: LikeRepository> {
    repository: Arc<R>,
    store_timeout: Duration,
}

impl<R: LikeRepository> LikeRecordHandler<R> {
    pub fn new(repository: Arc<R>, store_timeout: Duration) -> Self {
        Self {
            repository,
            store_timeout,
        }
    }
}

#[async_trait]
impl<R: LikeRepository> MessageHandler for LikeRecordHandler<R> {
    async fn handle(&self, payload: &[u8]) -> Result<Processed, ConsumeError> {
        let msg: LikeEvent = decode(payload).map_err(ConsumeError::poison)?;

        let inserted = with_deadline(
            self.store_timeout,
            "store.insert_like",
            self.repository.insert(msg.into()),
        )
        .await
        .map_err(ConsumeError::Transient)?;

        match inserted {
            LikeInsert::Created(like) => {
                info!(id = like.id, actor_id = like.actor_id, target_id = like.target_id, "Like recorded");
                Ok(Processed::Persisted)
            }
            LikeInsert::AlreadyExists => {
                info!(actor_id = msg.actor_id, target_id = msg.target_id, "Like already recorded");
                Ok(Processed::AlreadyPresent)
            }
        }
    }
}
