//! Acknowledgement surface of a broker delivery.

use async_trait::async_trait;
use lapin::message::Delivery;
use lapin::options::{BasicAckOptions, BasicNackOptions};

use crate::error::AppError;

/// A delivered message that must be acked or nacked exactly once.
#[async_trait]
pub trait AckableDelivery: Send + Sync {
    fn payload(&self) -> &[u8];

    /// Broker-assigned tag, unique per channel.
    fn tag(&self) -> u64;

    /// Whether the broker has delivered this message before.
    fn redelivered(&self) -> bool;

    async fn ack(&self) -> Result<(), AppError>;

    /// Negative acknowledgement. With `requeue` the broker puts the message
    /// back, at its original position where possible, and redelivers it with
    /// the redelivered flag set; without it the broker discards it.
    async fn nack(&self, requeue: bool) -> Result<(), AppError>;
}

#[async_trait]
impl AckableDelivery for Delivery {
    fn payload(&self) -> &[u8] {
        &self.data
    }

    fn tag(&self) -> u64 {
        self.delivery_tag
    }

    fn redelivered(&self) -> bool {
        self.redelivered
    }

    async fn ack(&self) -> Result<(), AppError> {
        self.acker
            .ack(BasicAckOptions::default())
            .await
            .map(|_| ())
            .map_err(AppError::from)
    }

    async fn nack(&self, requeue: bool) -> Result<(), AppError> {
        self.acker
            .nack(BasicNackOptions {
                requeue,
                multiple: false,
            })
            .await
            .map(|_| ())
            .map_err(AppError::from)
    }
}
