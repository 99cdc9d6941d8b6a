//! DTOs for like endpoints.

use serde::{Deserialize, Serialize};

/// Response for `GET /likes/{target_id}/count`.
#[derive(Debug, Serialize, Deserialize)]
pub struct LikeCountResponse {
    pub target_id: i64,
    pub likes: i64,
}
