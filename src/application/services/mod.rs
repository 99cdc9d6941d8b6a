//! Business logic services for the application layer.

pub mod like_service;
pub mod product_service;

pub use like_service::LikeService;
pub use product_service::{Listing, ListingSource, PRODUCTS_CACHE_KEY, ProductService};
