//! Repository trait definitions for the domain layer.
//!
//! Implementations live in `crate::infrastructure::persistence`. Mock
//! implementations are generated via `mockall` for unit tests.

pub mod like_repository;
pub mod product_repository;

pub use like_repository::LikeRepository;
pub use product_repository::ProductRepository;

#[cfg(test)]
pub use like_repository::MockLikeRepository;
#[cfg(test)]
pub use product_repository::MockProductRepository;
