//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse, WorkerCheck};
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: All components healthy
/// - **503 Service Unavailable**: One or more components degraded
///
/// # Components Checked
///
/// 1. **Database**: `SELECT 1` within the dependency deadline
/// 2. **Cache**: backend PING (always ok for the in-process cache)
/// 3. **Broker**: AMQP connection open
/// 4. **Workers**: every supervised consumer in this process is consuming
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "database": { "status": "ok", "message": "Connected" },
///     "cache": { "status": "ok", "message": "redis connected" },
///     "broker": { "status": "ok", "message": "Connected" },
///     "workers": [
///       { "name": "product-insert", "status": "ok", "worker": { "state": "running" } }
///     ]
///   }
/// }
/// ```
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let db_check = check_database(&state).await;

    let cache_check = check_cache(&state).await;

    let broker_check = check_broker(&state).await;

    let worker_checks = check_workers(&state);

    let all_healthy = db_check.is_ok()
        && cache_check.is_ok()
        && broker_check.is_ok()
        && worker_checks.iter().all(|w| w.status == "ok");

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            database: db_check,
            cache: cache_check,
            broker: broker_check,
            workers: worker_checks,
        },
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

async fn check_database(state: &AppState) -> CheckStatus {
    match state.product_service.ping().await {
        Ok(()) => CheckStatus::ok("Connected"),
        Err(e) => CheckStatus::error(format!("Database error: {}", e)),
    }
}

async fn check_cache(state: &AppState) -> CheckStatus {
    let backend = state.cache.backend();
    if state.cache.health_check().await {
        CheckStatus::ok(format!("{} connected", backend))
    } else {
        CheckStatus::error(format!("{} connection failed", backend))
    }
}

async fn check_broker(state: &AppState) -> CheckStatus {
    if state.publisher.health_check().await {
        CheckStatus::ok("Connected")
    } else {
        CheckStatus::error("Broker connection lost")
    }
}

fn check_workers(state: &AppState) -> Vec<WorkerCheck> {
    state
        .workers
        .iter()
        .map(|probe| WorkerCheck {
            name: probe.name(),
            status: if probe.is_alive() { "ok" } else { "error" }.to_string(),
            worker: probe.status(),
        })
        .collect()
}
