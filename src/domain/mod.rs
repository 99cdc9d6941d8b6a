//! Domain layer: entities, queue payloads and repository contracts.
//!
//! - [`entities`] - persisted data structures
//! - [`messages`] - queue message payloads shared by producer and worker
//! - [`repositories`] - data access traits implemented in
//!   [`crate::infrastructure::persistence`]
//!
//! # Write path
//!
//! 1. A handler validates the body as a [`messages::CreateProduct`]
//! 2. The payload is published to the durable queue and the caller gets `202`
//! 3. A consumer in [`crate::worker`] decodes it and calls
//!    [`repositories::ProductRepository::insert`]
//! 4. The delivery is acked, requeued or dropped depending on the outcome

pub mod entities;
pub mod messages;
pub mod repositories;
