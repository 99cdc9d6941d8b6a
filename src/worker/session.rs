//! AMQP-backed consume session.

use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use lapin::options::{BasicConsumeOptions, BasicQosOptions};
use lapin::types::FieldTable;
use tokio::sync::watch;
use tracing::{info, warn};

use super::consumer::{RequeueBackoff, SessionEnd, consume};
use super::handler::MessageHandler;
use super::supervisor::{Session, StatusReporter};
use crate::error::AppError;
use crate::infrastructure::broker::{BrokerConnection, Topology, declare};
use crate::utils::with_deadline;

/// Opens a channel, declares `topology`, and feeds its queue to `handler`
/// with manual acknowledgement and a bounded prefetch.
pub struct AmqpConsumerSession<H: MessageHandler + 'static> {
    broker: Arc<BrokerConnection>,
    topology: Topology,
    handler: Arc<H>,
    prefetch: u16,
    backoff: RequeueBackoff,
}

impl<H: MessageHandler + 'static> AmqpConsumerSession<H> {
    pub fn new(
        broker: Arc<BrokerConnection>,
        topology: Topology,
        handler: Arc<H>,
        prefetch: u16,
        backoff: RequeueBackoff,
    ) -> Self {
        Self {
            broker,
            topology,
            handler,
            prefetch,
            backoff,
        }
    }
}

#[async_trait]
impl<H: MessageHandler + 'static> Session for AmqpConsumerSession<H> {
    async fn run(
        &self,
        reporter: &StatusReporter,
        shutdown: watch::Receiver<bool>,
    ) -> Result<SessionEnd, AppError> {
        let channel = self.broker.create_channel().await?;
        let queue = self.topology.queue;

        let consumer = with_deadline(self.broker.op_timeout(), "broker.setup_consumer", async {
            declare(&channel, &self.topology).await?;
            channel
                .basic_qos(self.prefetch, BasicQosOptions::default())
                .await?;
            let consumer = channel
                .basic_consume(
                    queue,
                    "",
                    BasicConsumeOptions::default(),
                    FieldTable::default(),
                )
                .await?;
            Ok::<_, AppError>(consumer)
        })
        .await?;

        reporter.running();
        info!(queue, prefetch = self.prefetch, "Consuming");

        let deliveries = consumer.map(|d| d.map_err(AppError::from));
        let end = consume(
            queue,
            Box::pin(deliveries),
            self.handler.as_ref(),
            &self.backoff,
            shutdown,
        )
        .await;

        if channel.status().connected()
            && let Err(e) = channel.close(200, "consumer stopped").await
        {
            warn!(queue, error = %e, "Failed to close consumer channel");
        }

        end
    }
}
