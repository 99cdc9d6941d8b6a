#![allow(dead_code)]

use async_trait::async_trait;
use product_pipeline::application::services::{LikeService, ProductService};
use product_pipeline::error::AppError;
use product_pipeline::infrastructure::broker::{MessagePublisher, Topology};
use product_pipeline::infrastructure::cache::{CacheService, MemoryCache};
use product_pipeline::infrastructure::persistence::{PgLikeRepository, PgProductRepository};
use product_pipeline::state::AppState;
use product_pipeline::worker::delivery::AckableDelivery;
use serde_json::json;
use sqlx::PgPool;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const CACHE_TTL: Duration = Duration::from_secs(30);
pub const TIMEOUT: Duration = Duration::from_secs(5);

/// Publisher that keeps every message in memory instead of sending it.
#[derive(Default)]
pub struct RecordingPublisher {
    published: Mutex<Vec<(Topology, Vec<u8>)>>,
    unavailable: AtomicBool,
}

impl RecordingPublisher {
    /// Makes every subsequent publish fail as if the broker were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn published(&self) -> Vec<(Topology, Vec<u8>)> {
        self.published.lock().unwrap().clone()
    }

    /// Removes and returns the payloads published to `queue`.
    pub fn take(&self, queue: &str) -> Vec<Vec<u8>> {
        let mut published = self.published.lock().unwrap();
        let (taken, kept): (Vec<_>, Vec<_>) =
            published.drain(..).partition(|(t, _)| t.queue == queue);
        *published = kept;
        taken.into_iter().map(|(_, payload)| payload).collect()
    }
}

#[async_trait]
impl MessagePublisher for RecordingPublisher {
    async fn publish(&self, topology: &Topology, payload: Vec<u8>) -> Result<(), AppError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::dependency(
                "Message broker error",
                json!({ "reason": "connection refused" }),
            ));
        }
        self.published.lock().unwrap().push((*topology, payload));
        Ok(())
    }

    async fn health_check(&self) -> bool {
        !self.unavailable.load(Ordering::SeqCst)
    }
}

/// Delivery handed straight to the consume loop; records how it was settled.
pub struct TestDelivery {
    pub tag: u64,
    pub payload: Vec<u8>,
    pub outcomes: Arc<Mutex<Vec<(u64, &'static str)>>>,
}

#[async_trait]
impl AckableDelivery for TestDelivery {
    fn payload(&self) -> &[u8] {
        &self.payload
    }

    fn tag(&self) -> u64 {
        self.tag
    }

    fn redelivered(&self) -> bool {
        false
    }

    async fn ack(&self) -> Result<(), AppError> {
        self.outcomes.lock().unwrap().push((self.tag, "ack"));
        Ok(())
    }

    async fn nack(&self, requeue: bool) -> Result<(), AppError> {
        let outcome = if requeue { "requeue" } else { "drop" };
        self.outcomes.lock().unwrap().push((self.tag, outcome));
        Ok(())
    }
}

/// Wraps payloads as a finite delivery stream.
pub fn deliveries(
    payloads: Vec<Vec<u8>>,
    outcomes: &Arc<Mutex<Vec<(u64, &'static str)>>>,
) -> impl futures::Stream<Item = Result<TestDelivery, AppError>> + Unpin + Send {
    let items: Vec<_> = payloads
        .into_iter()
        .enumerate()
        .map(|(i, payload)| {
            Ok(TestDelivery {
                tag: i as u64 + 1,
                payload,
                outcomes: outcomes.clone(),
            })
        })
        .collect();
    futures::stream::iter(items)
}

pub async fn insert_product(pool: &PgPool, name: &str, stock: i32) -> i32 {
    sqlx::query_scalar("INSERT INTO products (name, stock) VALUES ($1, $2) RETURNING id")
        .bind(name)
        .bind(stock)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn insert_like(pool: &PgPool, actor_id: i64, target_id: i64) {
    sqlx::query("INSERT INTO post_likes (actor_id, target_id) VALUES ($1, $2)")
        .bind(actor_id)
        .bind(target_id)
        .execute(pool)
        .await
        .unwrap();
}

pub fn create_test_state(pool: PgPool) -> (AppState, Arc<RecordingPublisher>) {
    create_test_state_with_cache(pool, Arc::new(MemoryCache::new()))
}

pub fn create_test_state_with_cache(
    pool: PgPool,
    cache: Arc<dyn CacheService>,
) -> (AppState, Arc<RecordingPublisher>) {
    let pool = Arc::new(pool);
    let recorder = Arc::new(RecordingPublisher::default());
    let publisher: Arc<dyn MessagePublisher> = recorder.clone();

    let product_repo = Arc::new(PgProductRepository::new(pool.clone()));
    let like_repo = Arc::new(PgLikeRepository::new(pool.clone()));

    let product_service = Arc::new(ProductService::new(
        product_repo,
        cache.clone(),
        publisher.clone(),
        CACHE_TTL,
        TIMEOUT,
    ));
    let like_service = Arc::new(LikeService::new(like_repo, publisher.clone(), TIMEOUT));

    let state = AppState {
        product_service,
        like_service,
        cache,
        publisher,
        workers: Arc::from(Vec::new()),
    };

    (state, recorder)
}
