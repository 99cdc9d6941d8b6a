//! Exchange / queue / binding declarations.

use lapin::options::{ExchangeDeclareOptions, QueueBindOptions, QueueDeclareOptions};
use lapin::types::FieldTable;
use lapin::{Channel, ExchangeKind};

use crate::error::AppError;

/// A direct exchange bound to one durable queue under one routing key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Topology {
    pub exchange: &'static str,
    pub queue: &'static str,
    pub routing_key: &'static str,
}

/// Product creation requests.
pub const PRODUCT_CREATE: Topology = Topology {
    exchange: "products.exchange",
    queue: "product_insert_queue",
    routing_key: "product.create",
};

/// Like actions.
pub const LIKE_EVENTS: Topology = Topology {
    exchange: "likes.exchange",
    queue: "likes.queue",
    routing_key: "like.event",
};

impl Topology {
    pub const ALL: [Topology; 2] = [PRODUCT_CREATE, LIKE_EVENTS];
}

/// Declares the exchange (direct, durable), the queue (durable) and the
/// binding. Idempotent: redeclaring with the same arguments is a no-op.
///
/// # Errors
///
/// Returns [`AppError::Dependency`] if any declaration fails, including a
/// declaration that conflicts with existing broker state.
pub async fn declare(channel: &Channel, topology: &Topology) -> Result<(), AppError> {
    channel
        .exchange_declare(
            topology.exchange,
            ExchangeKind::Direct,
            ExchangeDeclareOptions {
                durable: true,
                ..Default::default()
            },
            FieldTable::default(),
        )
        .await?;

    channel
        .queue_declare(
            topology.queue,
            QueueDeclareOptions {
                durable: true,
                ..Default::default()
            },
            FieldTable::default(),
        )
        .await?;

    channel
        .queue_bind(
            topology.queue,
            topology.exchange,
            topology.routing_key,
            QueueBindOptions::default(),
            FieldTable::default(),
        )
        .await?;

    tracing::debug!(
        exchange = topology.exchange,
        queue = topology.queue,
        routing_key = topology.routing_key,
        "Topology declared"
    );

    Ok(())
}

/// Returns `(ready messages, consumers)` for the topology's queue.
///
/// Uses a passive declare, so the queue must already exist.
pub async fn queue_depth(channel: &Channel, topology: &Topology) -> Result<(u32, u32), AppError> {
    let queue = channel
        .queue_declare(
            topology.queue,
            QueueDeclareOptions {
                passive: true,
                ..Default::default()
            },
            FieldTable::default(),
        )
        .await?;

    Ok((queue.message_count(), queue.consumer_count()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topologies_are_distinct() {
        assert_ne!(PRODUCT_CREATE.exchange, LIKE_EVENTS.exchange);
        assert_ne!(PRODUCT_CREATE.queue, LIKE_EVENTS.queue);
        assert_ne!(PRODUCT_CREATE.routing_key, LIKE_EVENTS.routing_key);
    }
}
