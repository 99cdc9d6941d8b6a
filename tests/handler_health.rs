mod common;

use axum::{Router, routing::get};
use axum_test::TestServer;
use product_pipeline::api::handlers::health_handler;
use sqlx::PgPool;

fn app(state: product_pipeline::AppState) -> TestServer {
    let app = Router::new()
        .route("/health", get(health_handler))
        .with_state(state);

    TestServer::new(app).unwrap()
}

#[sqlx::test]
async fn test_health_endpoint_success(pool: PgPool) {
    let (state, _publisher) = common::create_test_state(pool);
    let server = app(state);

    let response = server.get("/health").await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["checks"]["database"]["status"], "ok");
    assert_eq!(json["checks"]["cache"]["status"], "ok");
    assert_eq!(json["checks"]["broker"]["status"], "ok");
    assert_eq!(json["checks"]["workers"], serde_json::json!([]));
}

#[sqlx::test]
async fn test_health_degraded_when_broker_down(pool: PgPool) {
    let (state, publisher) = common::create_test_state(pool);
    publisher.set_unavailable(true);
    let server = app(state);

    let response = server.get("/health").await;

    response.assert_status(axum::http::StatusCode::SERVICE_UNAVAILABLE);

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["checks"]["broker"]["status"], "error");
    assert_eq!(json["checks"]["database"]["status"], "ok");
}

#[sqlx::test]
async fn test_health_endpoint_structure(pool: PgPool) {
    let (state, _publisher) = common::create_test_state(pool);
    let server = app(state);

    let json = server.get("/health").await.json::<serde_json::Value>();

    assert!(json.get("status").is_some());
    assert!(json.get("version").is_some());
    assert!(json.get("checks").is_some());
    for component in ["database", "cache", "broker", "workers"] {
        assert!(json["checks"].get(component).is_some(), "{component}");
    }
}
