//! Process bootstrap and runtime lifecycle.
//!
//! Connects the store, cache and broker, starts the supervised consumers,
//! serves HTTP, and tears everything down in order on Ctrl+C / SIGTERM.

use crate::application::services::{LikeService, ProductService};
use crate::config::Config;
use crate::infrastructure::broker::{
    AmqpPublisher, BrokerConnection, LIKE_EVENTS, MessagePublisher, PRODUCT_CREATE,
};
use crate::infrastructure::cache::{CacheService, MemoryCache, RedisCache};
use crate::infrastructure::persistence::{PgLikeRepository, PgProductRepository, connect_pool};
use crate::routes::app_router;
use crate::state::AppState;
use crate::worker::{
    AmqpConsumerSession, LikeRecordHandler, ProductInsertHandler, RequeueBackoff,
    RestartPolicy, WorkerHandle, spawn_supervised,
};

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Runs the service with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool and migrations
/// - Redis cache (or the in-process cache when Redis is not configured)
/// - Broker connection, publisher channel and both topologies
/// - Product-insert and like-record workers under supervision
/// - Axum HTTP server
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Redis is configured but unreachable
/// - The broker is unreachable or a topology cannot be declared
/// - Server bind fails
pub async fn run(config: Config) -> Result<()> {
    let pool = connect_pool(&config)
        .await
        .context("Failed to connect to database")?;
    tracing::info!(
        max_connections = config.db_max_connections,
        "Connected to database"
    );

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    let cache: Arc<dyn CacheService> = match &config.redis_url {
        Some(redis_url) => {
            let redis = RedisCache::connect(redis_url, config.dependency_timeout())
                .await
                .context("Failed to connect to Redis")?;
            tracing::info!("Cache enabled (Redis)");
            Arc::new(redis)
        }
        None => {
            tracing::info!("Cache enabled (in-process)");
            Arc::new(MemoryCache::new())
        }
    };

    let broker = Arc::new(
        BrokerConnection::connect(&config.amqp_url, config.dependency_timeout())
            .await
            .context("Failed to connect to message broker")?,
    );
    let publisher = Arc::new(AmqpPublisher::new(
        broker.clone(),
        config.dependency_timeout(),
    ));
    publisher
        .declare_topologies()
        .await
        .context("Failed to declare broker topology")?;
    let publisher: Arc<dyn MessagePublisher> = publisher;

    let pool = Arc::new(pool);
    let product_repository = Arc::new(PgProductRepository::new(pool.clone()));
    let like_repository = Arc::new(PgLikeRepository::new(pool.clone()));

    let workers = spawn_workers(
        &config,
        &broker,
        product_repository.clone(),
        like_repository.clone(),
    );

    let state = AppState {
        product_service: Arc::new(ProductService::new(
            product_repository,
            cache.clone(),
            publisher.clone(),
            config.cache_ttl(),
            config.dependency_timeout(),
        )),
        like_service: Arc::new(LikeService::new(
            like_repository,
            publisher.clone(),
            config.dependency_timeout(),
        )),
        cache,
        publisher,
        workers: workers.iter().map(WorkerHandle::probe).collect(),
    };

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("HTTP server stopped, draining workers");
    for worker in &workers {
        worker.stop().await;
    }
    broker.close().await;
    pool.close().await;
    tracing::info!("Shutdown complete");

    Ok(())
}

fn spawn_workers(
    config: &Config,
    broker: &Arc<BrokerConnection>,
    product_repository: Arc<PgProductRepository>,
    like_repository: Arc<PgLikeRepository>,
) -> Vec<WorkerHandle> {
    let backoff = RequeueBackoff::new(
        Duration::from_millis(config.worker_requeue_backoff_ms),
        Duration::from_millis(config.worker_requeue_backoff_max_ms),
    );
    let timeout = config.dependency_timeout();

    let products = AmqpConsumerSession::new(
        broker.clone(),
        PRODUCT_CREATE,
        Arc::new(ProductInsertHandler::new(product_repository, timeout)),
        config.worker_prefetch,
        backoff,
    );
    let likes = AmqpConsumerSession::new(
        broker.clone(),
        LIKE_EVENTS,
        Arc::new(LikeRecordHandler::new(like_repository, timeout)),
        config.worker_prefetch,
        backoff,
    );

    vec![
        spawn_supervised("product-insert", Arc::new(products), RestartPolicy::default()),
        spawn_supervised("like-record", Arc::new(likes), RestartPolicy::default()),
    ]
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
