//! Shared application state for HTTP handlers.

use std::sync::Arc;

use crate::application::services::{LikeService, ProductService};
use crate::infrastructure::broker::MessagePublisher;
use crate::infrastructure::cache::CacheService;
use crate::infrastructure::persistence::{PgLikeRepository, PgProductRepository};
use crate::worker::WorkerProbe;

/// State injected into every handler. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub product_service: Arc<ProductService<PgProductRepository>>,
    pub like_service: Arc<LikeService<PgLikeRepository>>,
    pub cache: Arc<dyn CacheService>,
    pub publisher: Arc<dyn MessagePublisher>,
    /// Status of the consumers running in this process. Empty when the
    /// process only serves HTTP.
    pub workers: Arc<[WorkerProbe]>,
}
