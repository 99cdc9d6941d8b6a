//! Cache store behind the cache-aside read path.
//!
//! Provides a [`CacheService`] trait with two implementations:
//! - [`RedisCache`] - shared Redis cache, used whenever `REDIS_URL` is configured
//! - [`MemoryCache`] - in-process cache for single-instance deployments and tests

mod memory_cache;
mod redis_cache;
mod service;

pub use memory_cache::MemoryCache;
pub use redis_cache::RedisCache;
pub use service::{CacheError, CacheResult, CacheService};

#[cfg(test)]
pub use service::MockCacheService;
