//! Like entity: an actor's action on a target.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A persisted like.
///
/// The pair `(actor_id, target_id)` is unique in the store; recording the same
/// pair twice leaves the first row untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Like {
    pub id: i64,
    pub actor_id: i64,
    pub target_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Input data for recording a like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewLike {
    pub actor_id: i64,
    pub target_id: i64,
}

/// Result of recording a like.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LikeInsert {
    Created(Like),
    /// The pair was already recorded. The desired end state already holds.
    AlreadyExists,
}

impl LikeInsert {
    pub fn is_created(&self) -> bool {
        matches!(self, LikeInsert::Created(_))
    }
}
