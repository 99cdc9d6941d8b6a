//! Queue consumers.
//!
//! Each worker is a supervised [`session::AmqpConsumerSession`] that reads one
//! queue with prefetch bounded by configuration and manual acknowledgement:
//!
//! - [`handler`] - decode, validate and persist one payload
//! - [`consumer`] - the sequential loop deciding ack / requeue / drop
//! - [`delivery`] - the ack surface of a broker delivery
//! - [`supervisor`] - restart with backoff, status reporting, shutdown
//!
//! A message whose store write keeps failing is requeued indefinitely. There
//! is no redelivery cap and no dead-letter queue.

pub mod consumer;
pub mod delivery;
pub mod handler;
pub mod session;
pub mod supervisor;

pub use consumer::{RequeueBackoff, SessionEnd, consume};
pub use handler::{ConsumeError, LikeRecordHandler, MessageHandler, ProductInsertHandler, Processed};
pub use session::AmqpConsumerSession;
pub use supervisor::{
    RestartPolicy, Session, StatusReporter, WorkerHandle, WorkerProbe, WorkerStatus,
    spawn_supervised,
};
