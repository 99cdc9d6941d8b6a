//! Handlers for like endpoints.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
};

use crate::api::dto::accepted::AcceptedResponse;
use crate::api::dto::like::LikeCountResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Queues a like action.
///
/// `POST /likes` with `{"actor_id": 1, "target_id": 2}`. Repeating the same
/// pair is accepted; only one like is ever recorded for it.
pub async fn create_like_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<AcceptedResponse>), AppError> {
    let event = state.like_service.enqueue(&body).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(AcceptedResponse::queued(format!(
            "Like from {} on {} queued",
            event.actor_id, event.target_id
        ))),
    ))
}

/// `GET /likes/{target_id}/count`
pub async fn like_count_handler(
    State(state): State<AppState>,
    Path(target_id): Path<i64>,
) -> Result<Json<LikeCountResponse>, AppError> {
    let likes = state.like_service.count_for_target(target_id).await?;

    Ok(Json(LikeCountResponse { target_id, likes }))
}
