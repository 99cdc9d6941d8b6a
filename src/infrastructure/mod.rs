//! Infrastructure layer for external integrations.
//!
//! # Modules
//!
//! - [`broker`] - RabbitMQ connection, topology and publishing
//! - [`cache`] - cache store for the read path (Redis and in-process)
//! - [`persistence`] - PostgreSQL repository implementations

pub mod broker;
pub mod cache;
pub mod persistence;
