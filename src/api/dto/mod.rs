//! Data Transfer Objects for API responses.
//!
//! Request bodies are the queue messages in [`crate::domain::messages`];
//! they are validated there so the producer and the worker agree on them.

pub mod accepted;
pub mod health;
pub mod like;
