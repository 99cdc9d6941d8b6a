//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod health;
pub mod likes;
pub mod products;

pub use health::health_handler;
pub use likes::{create_like_handler, like_count_handler};
pub use products::{create_product_handler, list_products_handler};
