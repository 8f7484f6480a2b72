//! 读穿透解析器
//!
//! 读路径：
//! 1. 查缓存，命中非空值直接返回（不续期）
//! 2. 命中空值标记返回不存在，不加锁也不查库
//! 3. 未命中则竞争重建锁：拿到锁的调用方查库并回填，其余调用方固定间隔重试，
//!    等待预算至少覆盖一个锁 TTL，耗尽后返回 `LockTimeout`
//!
//! 同一个键在整个缓存集群内最多只有一个进行中的数据库加载。

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use hotcache_errors::{AppError, AppResult};
use hotcache_ports::{CachePort, DistributedLock};
use hotcache_telemetry::{CACHE_LOCK_CONTENTION_TOTAL, CACHE_LOOKUPS_TOTAL};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::entry::{CacheEntry, EMPTY_SENTINEL, encode_value};
use crate::keyspace::KeySpace;
use crate::lock::{CacheLock, LockGuard};
use crate::policy::CachePolicy;

/// 结果来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
    /// 命中正向缓存
    PositiveCache,
    /// 命中空值缓存
    NegativeCache,
    /// 未命中，从数据库加载并回填
    Loader,
    /// 未命中，数据库中不存在，已写入空值
    LoaderAbsent,
}

impl CacheSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PositiveCache => "positive_cache",
            Self::NegativeCache => "negative_cache",
            Self::Loader => "loader",
            Self::LoaderAbsent => "loader_absent",
        }
    }

    /// 是否由缓存直接应答
    pub fn is_cache_hit(&self) -> bool {
        matches!(self, Self::PositiveCache | Self::NegativeCache)
    }
}

/// 带来源的查询结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheResult<T> {
    /// None 表示实体确认不存在
    pub value: Option<T>,
    pub source: CacheSource,
}

impl<T> CacheResult<T> {
    fn new(value: Option<T>, source: CacheSource) -> Self {
        Self { value, source }
    }
}

/// 读穿透缓存
#[derive(Clone)]
pub struct ReadThroughCache {
    cache: Arc<dyn CachePort>,
    lock: Arc<dyn DistributedLock>,
    policy: CachePolicy,
}

impl ReadThroughCache {
    pub fn new(cache: Arc<dyn CachePort>, lock: Arc<dyn DistributedLock>) -> Self {
        Self {
            cache,
            lock,
            policy: CachePolicy::default(),
        }
    }

    /// 锁与数据共用同一个缓存存储
    pub fn with_store(cache: Arc<dyn CachePort>) -> Self {
        let lock = Arc::new(CacheLock::new(cache.clone()));
        Self::new(cache, lock)
    }

    pub fn with_policy(mut self, policy: CachePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    /// 按 ID 解析实体，`Ok(None)` 表示确认不存在
    pub async fn resolve<T, F, Fut>(
        &self,
        keyspace: &KeySpace,
        id: impl Display,
        loader: F,
    ) -> AppResult<Option<T>>
    where
        T: Serialize + DeserializeOwned + Send,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = AppResult<Option<T>>> + Send,
    {
        Ok(self.resolve_with_source(keyspace, id, loader).await?.value)
    }

    /// 按 ID 解析实体，同时返回结果来源
    pub async fn resolve_with_source<T, F, Fut>(
        &self,
        keyspace: &KeySpace,
        id: impl Display,
        loader: F,
    ) -> AppResult<CacheResult<T>>
    where
        T: Serialize + DeserializeOwned + Send,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = AppResult<Option<T>>> + Send,
    {
        let cache_key = keyspace.cache_key(&id);
        let lock_key = keyspace.lock_key(&id);
        let max_attempts = self.policy.lock_wait_attempts();

        for attempt in 1..=max_attempts {
            if let Some(result) = self.lookup(keyspace, &cache_key).await? {
                return Ok(result);
            }

            let guard =
                LockGuard::try_acquire(self.lock.clone(), &lock_key, self.policy.lock_ttl).await?;
            if let Some(guard) = guard {
                return self.rebuild(keyspace, &cache_key, guard, loader).await;
            }

            metrics::counter!(CACHE_LOCK_CONTENTION_TOTAL, "keyspace" => keyspace.name())
                .increment(1);
            debug!(key = %lock_key, attempt, "Rebuild lock busy, waiting");

            if attempt < max_attempts {
                tokio::time::sleep(self.policy.retry_interval).await;
            }
        }

        warn!(
            key = %lock_key,
            max_attempts,
            "Gave up waiting for rebuild lock"
        );
        Err(AppError::lock_timeout(format!(
            "{} still held after {} attempts",
            lock_key, max_attempts
        )))
    }

    /// 只读缓存，`Ok(None)` 表示缓存中没有该键
    async fn lookup<T>(&self, keyspace: &KeySpace, cache_key: &str) -> AppResult<Option<CacheResult<T>>>
    where
        T: DeserializeOwned,
    {
        let payload = self.cache.get(cache_key).await?;
        let result = match CacheEntry::<T>::decode(cache_key, payload) {
            CacheEntry::Hit(value) => CacheResult::new(Some(value), CacheSource::PositiveCache),
            CacheEntry::ConfirmedAbsent => CacheResult::new(None, CacheSource::NegativeCache),
            CacheEntry::Unknown => return Ok(None),
        };

        debug!(key = cache_key, source = result.source.as_str(), "Cache answered lookup");
        record_lookup(keyspace, result.source);
        Ok(Some(result))
    }

    /// 持锁重建，无论成功失败都先释放锁再返回
    async fn rebuild<T, F, Fut>(
        &self,
        keyspace: &KeySpace,
        cache_key: &str,
        guard: LockGuard,
        loader: F,
    ) -> AppResult<CacheResult<T>>
    where
        T: Serialize + DeserializeOwned + Send,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = AppResult<Option<T>>> + Send,
    {
        // 等锁期间其他持有者可能已经回填
        let outcome = match self.lookup(keyspace, cache_key).await {
            Ok(Some(result)) => Ok(result),
            Ok(None) => self.load_and_populate(keyspace, cache_key, loader).await,
            Err(e) => Err(e),
        };

        if let Err(e) = guard.release().await {
            warn!(key = cache_key, error = %e, "Failed to release rebuild lock, left to TTL expiry");
        }

        if let Err(e) = &outcome {
            warn!(key = cache_key, error = %e, "Cache rebuild failed");
        }
        outcome
    }

    async fn load_and_populate<T, F, Fut>(
        &self,
        keyspace: &KeySpace,
        cache_key: &str,
        loader: F,
    ) -> AppResult<CacheResult<T>>
    where
        T: Serialize + Send,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = AppResult<Option<T>>> + Send,
    {
        let loaded = loader().await?;

        if let Some(delay) = self.policy.rebuild_delay {
            tokio::time::sleep(delay).await;
        }

        let result = match loaded {
            Some(value) => {
                let payload = encode_value(&value)?;
                let ttl = self.policy.positive_ttl_jittered();
                self.cache.set(cache_key, &payload, Some(ttl)).await?;
                info!(key = cache_key, ttl_secs = ttl.as_secs(), "Cache rebuilt from backing store");
                CacheResult::new(Some(value), CacheSource::Loader)
            }
            None => {
                let ttl = self.policy.negative_ttl;
                self.cache.set(cache_key, EMPTY_SENTINEL, Some(ttl)).await?;
                info!(key = cache_key, ttl_secs = ttl.as_secs(), "Entity absent, negative entry cached");
                CacheResult::new(None, CacheSource::LoaderAbsent)
            }
        };

        record_lookup(keyspace, result.source);
        Ok(result)
    }
}

fn record_lookup(keyspace: &KeySpace, source: CacheSource) {
    metrics::counter!(
        CACHE_LOOKUPS_TOTAL,
        "keyspace" => keyspace.name(),
        "source" => source.as_str()
    )
    .increment(1);
}
