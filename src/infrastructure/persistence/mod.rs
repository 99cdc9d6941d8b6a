//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx.
//!
//! # Repositories
//!
//! - [`PgProductRepository`] - product inserts and collection reads
//! - [`PgLikeRepository`] - like records and per-target counts

pub mod pg_like_repository;
pub mod pg_product_repository;

pub use pg_like_repository::{PgLikeRepository, UNIQUE_LIKE_CONSTRAINT};
pub use pg_product_repository::PgProductRepository;

use crate::config::Config;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

/// Builds the bounded connection pool described by the `DB_*` settings.
///
/// # Errors
///
/// Returns an error if the first connection cannot be established.
pub async fn connect_pool(config: &Config) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .min_connections(config.db_min_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await
}
