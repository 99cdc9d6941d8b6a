//! Product entity.

use serde::{Deserialize, Serialize};

/// A persisted product.
///
/// `id` is assigned by the store on insert and serialized as-is, so the JSON
/// shape is `{"id": 1, "name": "Widget", "stock": 10}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub stock: i32,
}

impl Product {
    pub fn new(id: i32, name: String, stock: i32) -> Self {
        Self { id, name, stock }
    }
}

/// Input data for inserting a product. Has no `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub stock: i32,
}
