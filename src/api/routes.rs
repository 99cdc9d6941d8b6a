//! API route configuration.

use crate::api::handlers::{
    create_like_handler, create_product_handler, like_count_handler, list_products_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Product and like routes.
///
/// # Endpoints
///
/// - `GET  /products`                 - List products (cache-aside)
/// - `POST /products/create`          - Queue a product for creation
/// - `POST /likes`                    - Queue a like action
/// - `GET  /likes/{target_id}/count`  - Likes recorded for a target
pub fn pipeline_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products_handler))
        .route("/products/create", post(create_product_handler))
        .route("/likes", post(create_like_handler))
        .route("/likes/{target_id}/count", get(like_count_handler))
}
