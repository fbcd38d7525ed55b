//! Caching infrastructure for the service layer.
//!
//! Provides the cache store abstraction with Redis and in-memory
//! implementations, key naming, and the referral cache manager that keeps the
//! cache consistent with the durable store.

mod cache_store;
pub mod cache_keys;
mod memory_cache;
mod redis_cache;
mod referral_cache;

pub use cache_store::{validate_ttl, CacheStore};
pub use memory_cache::InMemoryCacheStore;
pub use redis_cache::{create_pool, RedisCacheStore, RedisCacheStoreParameters};
pub use referral_cache::{CachedReferral, ReferralCache, ReferralCacheManager};
