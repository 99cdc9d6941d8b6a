//! Handlers for product endpoints.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderName, HeaderValue, StatusCode},
    response::IntoResponse,
};

use crate::api::dto::accepted::AcceptedResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Response header telling whether the listing came from the cache.
pub const CACHE_STATUS_HEADER: HeaderName = HeaderName::from_static("x-cache");

/// Lists all products ordered by id.
///
/// # Endpoint
///
/// `GET /products`
///
/// Served from the cache when a fresh entry exists (`X-Cache: HIT`),
/// otherwise read from the store and cached (`X-Cache: MISS`). Products
/// created within the cache TTL may be missing.
///
/// # Response
///
/// ```json
/// [{ "id": 1, "name": "Widget", "stock": 10 }]
/// ```
pub async fn list_products_handler(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let listing = state.product_service.list().await?;

    Ok((
        [(
            CACHE_STATUS_HEADER,
            HeaderValue::from_static(listing.source.as_str()),
        )],
        Json(listing.products),
    ))
}

/// Queues a product for creation.
///
/// # Endpoint
///
/// `POST /products/create`
///
/// # Request Body
///
/// ```json
/// { "name": "Widget", "stock": 10 }
/// ```
///
/// An `id` in the body is ignored.
///
/// # Responses
///
/// - **202 Accepted**: queued; the product appears in listings once the worker
///   has persisted it and the cache entry has expired
/// - **400 Bad Request**: malformed JSON, missing fields, blank name or
///   negative stock
/// - **500 Internal Server Error**: the broker did not accept the message
pub async fn create_product_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<AcceptedResponse>), AppError> {
    let msg = state.product_service.enqueue(&body).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(AcceptedResponse::queued(format!(
            "Product '{}' queued successfully",
            msg.name
        ))),
    ))
}
