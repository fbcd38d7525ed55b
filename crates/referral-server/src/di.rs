//! Dependency injection module using Shaku.
//!
//! `ReferralModule` holds the full stack of a single process:
//! - Database pool and durable referral store (PostgreSQL)
//! - Cache store (Redis, or a no-op store when Redis is disabled)
//! - Referral cache manager and referral service

use referral_config::AppConfig;
use referral_core::{module, HasComponent, ReferralResult};
use referral_repository::{
    DatabasePool, DatabasePoolInterface, DatabasePoolParameters, PgReferralStore, ReferralStore,
};
use referral_service::{
    create_pool, CacheStore, RedisCacheStore, RedisCacheStoreParameters, ReferralCache,
    ReferralCacheManager, ReferralService, ReferralServiceComponent,
};
use std::sync::Arc;
use tracing::info;

// ============================================================================
// Shaku Module Definition
// ============================================================================

module! {
    pub ReferralModule {
        components = [
            DatabasePool,
            PgReferralStore,
            RedisCacheStore,
            ReferralCacheManager,
            ReferralServiceComponent,
        ],
        providers = [],
    }
}

// ============================================================================
// Module Builders
// ============================================================================

/// Builds the referral module, connecting to the database eagerly.
pub async fn build_referral_module(config: &AppConfig) -> ReferralResult<Arc<ReferralModule>> {
    let db_pool = DatabasePool::connect(&config.database).await?;
    assemble(db_pool, config)
}

/// Builds the referral module without opening any connection.
///
/// Connections to PostgreSQL and Redis are opened on first use.
pub fn build_lazy_referral_module(config: &AppConfig) -> ReferralResult<Arc<ReferralModule>> {
    let db_pool = DatabasePool::connect_lazy(&config.database)?;
    assemble(db_pool, config)
}

fn assemble(db_pool: DatabasePool, config: &AppConfig) -> ReferralResult<Arc<ReferralModule>> {
    let cache_pool = if config.redis.enabled {
        Some(Arc::new(create_pool(&config.redis)?))
    } else {
        info!("Redis disabled, referral lookups go straight to the database");
        None
    };

    let module = ReferralModule::builder()
        .with_component_parameters::<DatabasePool>(DatabasePoolParameters {
            pool: db_pool.inner().clone(),
        })
        .with_component_parameters::<RedisCacheStore>(RedisCacheStoreParameters {
            pool: cache_pool,
            key_prefix: config.redis.key_prefix.clone(),
        })
        .build();

    Ok(Arc::new(module))
}

// ============================================================================
// Module Resolution Helpers
// ============================================================================

/// Trait for resolving the referral components from a module.
pub trait ReferralResolver {
    /// Resolves the referral service.
    fn referral_service(&self) -> Arc<dyn ReferralService>;

    /// Resolves the referral cache manager.
    fn referral_cache(&self) -> Arc<dyn ReferralCache>;

    /// Resolves the cache store.
    fn cache_store(&self) -> Arc<dyn CacheStore>;

    /// Resolves the durable referral store.
    fn referral_store(&self) -> Arc<dyn ReferralStore>;

    /// Resolves the database pool.
    fn database_pool(&self) -> Arc<dyn DatabasePoolInterface>;
}

impl ReferralResolver for ReferralModule {
    fn referral_service(&self) -> Arc<dyn ReferralService> {
        self.resolve()
    }

    fn referral_cache(&self) -> Arc<dyn ReferralCache> {
        self.resolve()
    }

    fn cache_store(&self) -> Arc<dyn CacheStore> {
        self.resolve()
    }

    fn referral_store(&self) -> Arc<dyn ReferralStore> {
        self.resolve()
    }

    fn database_pool(&self) -> Arc<dyn DatabasePoolInterface> {
        self.resolve()
    }
}
