mod common;

use product_pipeline::domain::entities::NewProduct;
use product_pipeline::domain::repositories::ProductRepository;
use product_pipeline::infrastructure::persistence::PgProductRepository;
use sqlx::PgPool;
use std::sync::Arc;

#[sqlx::test]
async fn test_insert_assigns_id(pool: PgPool) {
    let repo = PgProductRepository::new(Arc::new(pool));

    let product = repo
        .insert(NewProduct {
            name: "Widget".to_string(),
            stock: 10,
        })
        .await
        .unwrap();

    assert!(product.id > 0);
    assert_eq!(product.name, "Widget");
    assert_eq!(product.stock, 10);
}

#[sqlx::test]
async fn test_identical_inserts_create_distinct_rows(pool: PgPool) {
    let repo = PgProductRepository::new(Arc::new(pool));
    let new = NewProduct {
        name: "Widget".to_string(),
        stock: 1,
    };

    let first = repo.insert(new.clone()).await.unwrap();
    let second = repo.insert(new).await.unwrap();

    assert_ne!(first.id, second.id);
    assert_eq!(repo.list_all().await.unwrap().len(), 2);
}

#[sqlx::test]
async fn test_list_all_ordered_by_id(pool: PgPool) {
    let c = common::insert_product(&pool, "c", 3).await;
    let a = common::insert_product(&pool, "a", 1).await;
    let b = common::insert_product(&pool, "b", 2).await;

    let repo = PgProductRepository::new(Arc::new(pool));
    let products = repo.list_all().await.unwrap();

    let ids: Vec<i32> = products.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![c, a, b]);
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
}

#[sqlx::test]
async fn test_list_all_empty(pool: PgPool) {
    let repo = PgProductRepository::new(Arc::new(pool));

    assert!(repo.list_all().await.unwrap().is_empty());
}

#[sqlx::test]
async fn test_ping(pool: PgPool) {
    let repo = PgProductRepository::new(Arc::new(pool));

    assert!(repo.ping().await.is_ok());
}
