//! Core domain entities.
//!
//! - [`Product`] - an inventory item created through the queue pipeline
//! - [`Like`] - an actor's like on a target; unique per `(actor_id, target_id)`
//!
//! Entities are only created by the background worker once a queued request
//! has been persisted. Nothing in this crate mutates or deletes them.

pub mod like;
pub mod product;

pub use like::{Like, LikeInsert, NewLike};
pub use product::{NewProduct, Product};
