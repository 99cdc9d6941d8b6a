//! Application layer services.
//!
//! Services sit between the HTTP handlers and the infrastructure. They
//! validate input, publish work to the broker, and serve reads through the
//! cache. Repositories are generic parameters so unit tests can substitute
//! `mockall` mocks.
//!
//! # Available Services
//!
//! - [`services::product_service::ProductService`] - product ingestion and cached listing
//! - [`services::like_service::LikeService`] - like ingestion and per-target counts

pub mod services;
