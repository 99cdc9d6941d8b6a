mod common;

use axum::{
    Router,
    routing::{get, post},
};
use axum_test::TestServer;
use product_pipeline::api::handlers::{create_like_handler, like_count_handler};
use serde_json::json;
use sqlx::PgPool;

fn app(state: product_pipeline::AppState) -> TestServer {
    let app = Router::new()
        .route("/likes", post(create_like_handler))
        .route("/likes/{target_id}/count", get(like_count_handler))
        .with_state(state);

    TestServer::new(app).unwrap()
}

#[sqlx::test]
async fn test_create_like_accepted(pool: PgPool) {
    let (state, publisher) = common::create_test_state(pool);
    let server = app(state);

    let response = server
        .post("/likes")
        .json(&json!({ "actor_id": 1, "target_id": 2 }))
        .await;

    response.assert_status(axum::http::StatusCode::ACCEPTED);
    assert_eq!(response.json::<serde_json::Value>()["status"], "accepted");

    let published = publisher.take("likes.queue");
    assert_eq!(published.len(), 1);
    assert_eq!(published[0], br#"{"actor_id":1,"target_id":2}"#.to_vec());
}

#[sqlx::test]
async fn test_duplicate_like_requests_are_both_accepted(pool: PgPool) {
    let (state, publisher) = common::create_test_state(pool);
    let server = app(state);

    for _ in 0..2 {
        server
            .post("/likes")
            .json(&json!({ "actor_id": 1, "target_id": 2 }))
            .await
            .assert_status(axum::http::StatusCode::ACCEPTED);
    }

    assert_eq!(publisher.take("likes.queue").len(), 2);
}

#[sqlx::test]
async fn test_create_like_invalid(pool: PgPool) {
    let (state, publisher) = common::create_test_state(pool);
    let server = app(state);

    for body in [
        json!({ "actor_id": 0, "target_id": 2 }),
        json!({ "actor_id": 1 }),
        json!({ "actor_id": "a", "target_id": 2 }),
    ] {
        server
            .post("/likes")
            .json(&body)
            .await
            .assert_status_bad_request();
    }

    assert!(publisher.published().is_empty());
}

#[sqlx::test]
async fn test_like_count(pool: PgPool) {
    common::insert_like(&pool, 1, 10).await;
    common::insert_like(&pool, 2, 10).await;

    let (state, _publisher) = common::create_test_state(pool);
    let server = app(state);

    let response = server.get("/likes/10/count").await;

    response.assert_status_ok();
    assert_eq!(
        response.json::<serde_json::Value>(),
        json!({ "target_id": 10, "likes": 2 })
    );

    let response = server.get("/likes/11/count").await;
    assert_eq!(response.json::<serde_json::Value>()["likes"], 0);
}

#[sqlx::test]
async fn test_like_count_rejects_non_positive_target(pool: PgPool) {
    let (state, _publisher) = common::create_test_state(pool);
    let server = app(state);

    let response = server.get("/likes/0/count").await;

    response.assert_status_bad_request();
    assert_eq!(
        response.json::<serde_json::Value>()["error"]["code"],
        "validation_error"
    );
}
