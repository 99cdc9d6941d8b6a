//! Repository trait for product data access.

use crate::domain::entities::{NewProduct, Product};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for products.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgProductRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Inserts a product and returns it with its store-assigned `id`.
    ///
    /// No deduplication is performed: inserting the same name twice creates
    /// two rows.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Dependency`] if the store is unreachable,
    /// [`AppError::Internal`] or [`AppError::Conflict`] on other database errors.
    async fn insert(&self, product: NewProduct) -> Result<Product, AppError>;

    /// Returns every product ordered by `id`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Dependency`] or [`AppError::Internal`] on database errors.
    async fn list_all(&self) -> Result<Vec<Product>, AppError>;

    /// Round-trips to the store. Used by the health check.
    async fn ping(&self) -> Result<(), AppError>;
}
