//! Message publishing.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lapin::options::{BasicPublishOptions, ConfirmSelectOptions};
use lapin::{BasicProperties, Channel};
use serde_json::json;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::connection::BrokerConnection;
use super::topology::{Topology, declare};
use crate::error::AppError;
use crate::utils::with_deadline;

/// AMQP delivery mode 2: the broker writes the message to disk.
const PERSISTENT: u8 = 2;

/// Publishes serialized payloads to a topology.
///
/// A successful return means the broker has taken responsibility for the
/// message, not that it has been processed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePublisher: Send + Sync {
    /// Publishes one persistent JSON message to `topology`'s exchange under its
    /// routing key.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Dependency`] if the broker is unreachable, rejects
    /// the message, or does not confirm it in time.
    async fn publish(&self, topology: &Topology, payload: Vec<u8>) -> Result<(), AppError>;

    /// Checks that the broker is reachable.
    async fn health_check(&self) -> bool;
}

/// [`MessagePublisher`] over one shared channel in publisher-confirm mode.
///
/// The channel is opened lazily, declares every known topology when opened,
/// and is replaced when found closed. Request tasks share it; the lock is only
/// held while (re)opening, never across a publish.
pub struct AmqpPublisher {
    broker: Arc<BrokerConnection>,
    channel: Mutex<Option<Channel>>,
    op_timeout: Duration,
}

impl AmqpPublisher {
    pub fn new(broker: Arc<BrokerConnection>, op_timeout: Duration) -> Self {
        Self {
            broker,
            channel: Mutex::new(None),
            op_timeout,
        }
    }

    /// Opens the publishing channel and declares all topologies.
    ///
    /// Called at startup so a missing broker is detected before serving.
    pub async fn declare_topologies(&self) -> Result<(), AppError> {
        self.channel().await.map(|_| ())
    }

    async fn channel(&self) -> Result<Channel, AppError> {
        let mut guard = self.channel.lock().await;

        if let Some(channel) = guard.as_ref()
            && channel.status().connected()
        {
            return Ok(channel.clone());
        }

        let channel = self.broker.create_channel().await?;
        with_deadline(self.op_timeout, "broker.setup_publisher", async {
            channel
                .confirm_select(ConfirmSelectOptions::default())
                .await?;
            for topology in Topology::ALL {
                declare(&channel, &topology).await?;
            }
            Ok::<(), AppError>(())
        })
        .await?;

        info!("Publisher channel ready");
        *guard = Some(channel.clone());
        Ok(channel)
    }
}

#[async_trait]
impl MessagePublisher for AmqpPublisher {
    async fn publish(&self, topology: &Topology, payload: Vec<u8>) -> Result<(), AppError> {
        let channel = self.channel().await?;

        let properties = BasicProperties::default()
            .with_content_type("application/json".into())
            .with_delivery_mode(PERSISTENT);

        with_deadline(self.op_timeout, "broker.publish", async {
            let confirmation = channel
                .basic_publish(
                    topology.exchange,
                    topology.routing_key,
                    BasicPublishOptions::default(),
                    &payload,
                    properties,
                )
                .await?
                .await?;

            if confirmation.is_nack() {
                return Err(AppError::dependency(
                    "Broker rejected message",
                    json!({ "queue": topology.queue }),
                ));
            }
            Ok::<(), AppError>(())
        })
        .await?;

        metrics::counter!("pipeline_published_total", "queue" => topology.queue).increment(1);
        debug!(queue = topology.queue, bytes = payload.len(), "Message published");
        Ok(())
    }

    async fn health_check(&self) -> bool {
        self.broker.is_connected().await
    }
}
