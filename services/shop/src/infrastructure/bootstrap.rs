//! 基础设施资源管理
//!
//! 统一创建连接、缓存组件和应用服务

use std::sync::Arc;

use hotcache_adapter_postgres::{PostgresConfig, create_pool};
use hotcache_adapter_redis::{RedisCache, RedisDistributedLock, create_connection_manager};
use hotcache_common::{RetryConfig, with_retry};
use hotcache_config::{AppConfig, CacheConfig};
use hotcache_errors::{AppError, AppResult};
use hotcache_ports::{CachePort, DistributedLock};
use hotcache_read_through::{CacheInvalidator, CachePolicy, CollectionCache, ReadThroughCache};
use redis::aio::ConnectionManager;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use tracing::info;

use crate::application::{ShopService, ShopTypeService};
use crate::infrastructure::persistence::{PostgresShopRepository, PostgresShopTypeRepository};

/// 由缓存配置构建读穿透策略
pub fn cache_policy(config: &CacheConfig) -> CachePolicy {
    CachePolicy::default()
        .with_positive_ttl(config.shop_ttl())
        .with_negative_ttl(config.null_ttl())
        .with_lock_ttl(config.lock_ttl())
        .with_retry(config.lock_retry_interval(), config.lock_max_attempts)
        .with_ttl_jitter(config.ttl_jitter())
}

/// 基础设施资源容器
pub struct Infrastructure {
    config: AppConfig,
    postgres_pool: PgPool,
    redis_conn: ConnectionManager,
}

impl Infrastructure {
    /// 从配置创建基础设施资源
    ///
    /// 连接失败按指数退避重试，只重试可恢复的错误
    pub async fn from_config(config: AppConfig) -> AppResult<Self> {
        let retry_config = RetryConfig::default();

        let pg_config = PostgresConfig::new(config.database.url.expose_secret())
            .with_max_connections(config.database.max_connections);
        let postgres_pool = with_retry(
            &retry_config,
            "PostgreSQL connection",
            || {
                let cfg = pg_config.clone();
                async move { create_pool(&cfg).await }
            },
            AppError::is_transient,
        )
        .await?;
        info!(
            "PostgreSQL connection pool created (max_connections: {})",
            config.database.max_connections
        );

        let redis_url = config.redis.url.clone();
        let redis_conn = with_retry(
            &retry_config,
            "Redis connection",
            || {
                let url = redis_url.expose_secret().clone();
                async move { create_connection_manager(&url).await }
            },
            AppError::is_transient,
        )
        .await?;
        info!("Redis connection created");

        Ok(Self {
            config,
            postgres_pool,
            redis_conn,
        })
    }

    /// 检查 PostgreSQL 与 Redis 是否可用
    pub async fn check_health(&self) -> AppResult<()> {
        hotcache_adapter_postgres::check_connection(&self.postgres_pool).await?;
        let mut conn = self.redis_conn.clone();
        hotcache_adapter_redis::check_connection(&mut conn).await?;
        Ok(())
    }

    /// 构建商铺相关服务
    pub fn build_services(&self) -> ShopServices {
        let cache: Arc<dyn CachePort> = Arc::new(RedisCache::new(self.redis_conn.clone()));
        let lock: Arc<dyn DistributedLock> =
            Arc::new(RedisDistributedLock::new(self.redis_conn.clone()));
        ShopServices::build(
            cache,
            lock,
            &self.config.cache,
            Arc::new(PostgresShopRepository::new(self.postgres_pool.clone())),
            Arc::new(PostgresShopTypeRepository::new(self.postgres_pool.clone())),
        )
    }
}

/// 商铺服务集合
#[derive(Clone)]
pub struct ShopServices {
    pub shops: ShopService,
    pub shop_types: ShopTypeService,
}

impl ShopServices {
    /// 用任意缓存存储和仓储组装服务
    pub fn build(
        cache: Arc<dyn CachePort>,
        lock: Arc<dyn DistributedLock>,
        config: &CacheConfig,
        shop_repo: Arc<dyn crate::domain::ShopRepository>,
        shop_type_repo: Arc<dyn crate::domain::ShopTypeRepository>,
    ) -> Self {
        let resolver = ReadThroughCache::new(cache.clone(), lock).with_policy(cache_policy(config));
        let invalidator = CacheInvalidator::new(cache.clone());
        let collection = CollectionCache::new(cache, config.shop_type_ttl());

        Self {
            shops: ShopService::new(shop_repo, resolver, invalidator),
            shop_types: ShopTypeService::new(shop_type_repo, collection),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_cache_policy_from_defaults() {
        let policy = cache_policy(&CacheConfig::default());

        assert_eq!(policy.positive_ttl, Duration::from_secs(1800));
        assert_eq!(policy.negative_ttl, Duration::from_secs(120));
        assert_eq!(policy.lock_ttl, Duration::from_secs(10));
        assert_eq!(policy.retry_interval, Duration::from_millis(50));
        assert_eq!(policy.max_lock_attempts, 250);
        assert!(policy.retry_interval * policy.lock_wait_attempts() > policy.lock_ttl);
        assert_eq!(policy.ttl_jitter, Duration::ZERO);
        assert!(policy.rebuild_delay.is_none());
    }

    #[test]
    fn test_cache_policy_follows_overrides() {
        let config = CacheConfig {
            null_ttl_secs: 30,
            lock_max_attempts: 5,
            ttl_jitter_secs: 60,
            ..CacheConfig::default()
        };
        let policy = cache_policy(&config);

        assert_eq!(policy.negative_ttl, Duration::from_secs(30));
        assert_eq!(policy.max_lock_attempts, 5);
        assert_eq!(policy.lock_wait_attempts(), 251);
        assert_eq!(policy.ttl_jitter, Duration::from_secs(60));
    }
}
