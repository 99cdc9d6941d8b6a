//! RabbitMQ integration.
//!
//! - [`BrokerConnection`] - the single shared AMQP connection
//! - [`Topology`] - well-known exchange / queue / routing key triples
//! - [`MessagePublisher`] - publishing contract; [`AmqpPublisher`] implements it
//!   over one shared channel in publisher-confirm mode
//!
//! Both the producer and the consumers declare their topology before use,
//! so either side may start first.

mod connection;
mod publisher;
mod topology;

pub use connection::BrokerConnection;
pub use publisher::{AmqpPublisher, MessagePublisher};
pub use topology::{LIKE_EVENTS, PRODUCT_CREATE, Topology, declare, queue_depth};

#[cfg(test)]
pub use publisher::MockMessagePublisher;
