//! PostgreSQL implementation of product repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{NewProduct, Product};
use crate::domain::repositories::ProductRepository;
use crate::error::AppError;

pub struct PgProductRepository {
    pool: Arc<PgPool>,
}

impl PgProductRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn insert(&self, product: NewProduct) -> Result<Product, AppError> {
        let row = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (name, stock)
            VALUES ($1, $2)
            RETURNING id, name, stock
            "#,
        )
        .bind(&product.name)
        .bind(product.stock)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row)
    }

    async fn list_all(&self) -> Result<Vec<Product>, AppError> {
        let rows =
            sqlx::query_as::<_, Product>("SELECT id, name, stock FROM products ORDER BY id")
                .fetch_all(self.pool.as_ref())
                .await?;

        Ok(rows)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(self.pool.as_ref()).await?;
        Ok(())
    }
}
