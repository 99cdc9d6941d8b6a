//! The consume loop.
//!
//! Deliveries are processed strictly one at a time. For each one:
//!
//! | Handler result | Broker action | Terminal |
//! |---|---|---|
//! | `Ok(_)` | ack | yes |
//! | [`ConsumeError::Poison`] | nack, no requeue | yes (dropped) |
//! | [`ConsumeError::Transient`] | wait, then nack with requeue | no |
//!
//! Requeueing is unbounded: a store that never recovers keeps the message
//! cycling forever. There is no dead-letter routing; the only protection is
//! the growing delay between attempts and a `warn` log per attempt.

use std::time::Duration;

use futures::{Stream, StreamExt};
use tokio::sync::watch;
use tracing::{error, info, warn};

use super::delivery::AckableDelivery;
use super::handler::{ConsumeError, MessageHandler, Processed};
use crate::error::AppError;

/// What happened to a single delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Acked,
    Requeued,
    Dropped,
}

impl Disposition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Disposition::Acked => "acked",
            Disposition::Requeued => "requeued",
            Disposition::Dropped => "dropped",
        }
    }
}

/// How a consume session ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The shutdown signal was raised.
    Shutdown,
    /// The broker closed the delivery stream (channel or connection closed).
    StreamClosed,
}

/// Delay before requeueing after consecutive transient failures.
///
/// Doubles from `base` per consecutive failure, capped at `max`. Resets after
/// any ack.
#[derive(Debug, Clone, Copy)]
pub struct RequeueBackoff {
    pub base: Duration,
    pub max: Duration,
}

impl RequeueBackoff {
    pub fn new(base: Duration, max: Duration) -> Self {
        Self { base, max }
    }

    pub fn delay(&self, consecutive_failures: u32) -> Duration {
        let exponent = consecutive_failures.saturating_sub(1).min(16);
        self.base.saturating_mul(1 << exponent).min(self.max)
    }
}

/// Consumes `deliveries` until the stream ends or `shutdown` flips to `true`.
///
/// A message already being handled is always finished before shutdown is
/// observed.
///
/// # Errors
///
/// Returns the error if the stream yields one or an ack/nack cannot be sent.
/// Unacked deliveries are redelivered by the broker after the channel closes.
pub async fn consume<S, D, H>(
    queue: &str,
    mut deliveries: S,
    handler: &H,
    backoff: &RequeueBackoff,
    mut shutdown: watch::Receiver<bool>,
) -> Result<SessionEnd, AppError>
where
    S: Stream<Item = Result<D, AppError>> + Unpin + Send,
    D: AckableDelivery,
    H: MessageHandler + ?Sized,
{
    let mut consecutive_failures = 0u32;

    loop {
        if *shutdown.borrow_and_update() {
            return Ok(SessionEnd::Shutdown);
        }

        let next = tokio::select! {
            biased;
            changed = shutdown.changed() => {
                if changed.is_err() {
                    return Ok(SessionEnd::Shutdown);
                }
                continue;
            }
            next = deliveries.next() => next,
        };

        let Some(delivery) = next else {
            return Ok(SessionEnd::StreamClosed);
        };

        process(queue, &delivery?, handler, backoff, &mut consecutive_failures).await?;
    }
}

/// Handles one delivery and settles it with the broker.
pub async fn process<D, H>(
    queue: &str,
    delivery: &D,
    handler: &H,
    backoff: &RequeueBackoff,
    consecutive_failures: &mut u32,
) -> Result<Disposition, AppError>
where
    D: AckableDelivery,
    H: MessageHandler + ?Sized,
{
    let tag = delivery.tag();
    let redelivered = delivery.redelivered();

    let disposition = match handler.handle(delivery.payload()).await {
        Ok(processed) => {
            delivery.ack().await?;
            *consecutive_failures = 0;
            info!(
                queue,
                tag,
                redelivered,
                duplicate = processed == Processed::AlreadyPresent,
                "Message acked"
            );
            Disposition::Acked
        }
        Err(ConsumeError::Poison(reason)) => {
            error!(queue, tag, redelivered, %reason, "Invalid message format, dropping");
            delivery.nack(false).await?;
            Disposition::Dropped
        }
        Err(ConsumeError::Transient(e)) => {
            *consecutive_failures = consecutive_failures.saturating_add(1);
            let delay = backoff.delay(*consecutive_failures);
            warn!(
                queue,
                tag,
                redelivered,
                attempt = *consecutive_failures,
                delay_ms = delay.as_millis() as u64,
                error = %e,
                "Persistence failed, requeueing"
            );
            tokio::time::sleep(delay).await;
            delivery.nack(true).await?;
            Disposition::Requeued
        }
    };

    metrics::counter!(
        "pipeline_messages_total",
        "queue" => queue.to_string(),
        "outcome" => disposition.as_str()
    )
    .increment(1);

    Ok(disposition)
}
