//! Product ingestion and cached listing.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::domain::entities::Product;
use crate::domain::messages::{CreateProduct, decode, encode};
use crate::domain::repositories::ProductRepository;
use crate::error::AppError;
use crate::infrastructure::broker::{MessagePublisher, PRODUCT_CREATE};
use crate::infrastructure::cache::CacheService;
use crate::utils::with_deadline;

/// Cache key holding the serialized full product list.
pub const PRODUCTS_CACHE_KEY: &str = "products:all";

/// Where a product listing was served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingSource {
    Cache,
    Store,
}

impl ListingSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingSource::Cache => "HIT",
            ListingSource::Store => "MISS",
        }
    }
}

#[derive(Debug)]
pub struct Listing {
    pub products: Vec<Product>,
    pub source: ListingSource,
}

/// Producer-side product operations.
///
/// Writes never go to the store directly: [`Self::enqueue`] publishes a
/// [`CreateProduct`] and returns. Reads go through the cache first.
///
/// The cache is not invalidated when a product is inserted, so a listing may
/// omit products created within the last `cache_ttl`.
pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
    cache: Arc<dyn CacheService>,
    publisher: Arc<dyn MessagePublisher>,
    cache_ttl: Duration,
    store_timeout: Duration,
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(
        repository: Arc<R>,
        cache: Arc<dyn CacheService>,
        publisher: Arc<dyn MessagePublisher>,
        cache_ttl: Duration,
        store_timeout: Duration,
    ) -> Self {
        Self {
            repository,
            cache,
            publisher,
            cache_ttl,
            store_timeout,
        }
    }

    /// Validates a raw request body and publishes it for asynchronous insert.
    ///
    /// Any client-supplied `id` is discarded; the published payload is
    /// re-serialized from the validated message.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] if the body is not a valid product
    /// - [`AppError::Dependency`] if the broker does not confirm the message
    pub async fn enqueue(&self, body: &[u8]) -> Result<CreateProduct, AppError> {
        let msg: CreateProduct = decode(body)?;
        let payload = encode(&msg)?;

        self.publisher.publish(&PRODUCT_CREATE, payload).await?;

        debug!(name = %msg.name, stock = msg.stock, "Product queued");
        Ok(msg)
    }

    /// Returns all products, from the cache when a fresh entry exists.
    ///
    /// Cache failures and unreadable entries are treated as misses. On a miss
    /// the store result is written back with `cache_ttl`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Dependency`] if the store is unreachable or slow on
    /// a miss.
    pub async fn list(&self) -> Result<Listing, AppError> {
        if let Some(products) = self.cached().await {
            debug!(key = PRODUCTS_CACHE_KEY, count = products.len(), "Cache HIT");
            metrics::counter!("pipeline_cache_lookups_total", "result" => "hit").increment(1);
            return Ok(Listing {
                products,
                source: ListingSource::Cache,
            });
        }
        debug!(key = PRODUCTS_CACHE_KEY, "Cache MISS");
        metrics::counter!("pipeline_cache_lookups_total", "result" => "miss").increment(1);

        let products = with_deadline(
            self.store_timeout,
            "store.list_products",
            self.repository.list_all(),
        )
        .await?;

        match serde_json::to_string(&products) {
            Ok(raw) => {
                if let Err(e) = self.cache.set(PRODUCTS_CACHE_KEY, &raw, self.cache_ttl).await {
                    warn!(error = %e, "Failed to populate product cache");
                }
            }
            Err(e) => warn!(error = %e, "Failed to serialize product list for cache"),
        }

        Ok(Listing {
            products,
            source: ListingSource::Store,
        })
    }

    async fn cached(&self) -> Option<Vec<Product>> {
        let raw = match self.cache.get(PRODUCTS_CACHE_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "Product cache read failed");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(products) => Some(products),
            Err(e) => {
                warn!(error = %e, "Discarding unreadable product cache entry");
                None
            }
        }
    }

    /// Checks that the store answers within the deadline.
    pub async fn ping(&self) -> Result<(), AppError> {
        with_deadline(self.store_timeout, "store.ping", self.repository.ping()).await
    }
}
