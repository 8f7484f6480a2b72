//! 集合缓存
//!
//! 用于写入频率很低的小型列表（如商铺类型）。整个集合使用一个固定键，
//! 不写空值标记也不加重建锁：空列表视为业务错误，不缓存。

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use hotcache_errors::{AppError, AppResult};
use hotcache_ports::CachePort;
use hotcache_telemetry::CACHE_LOOKUPS_TOTAL;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::entry::encode_value;
use crate::keyspace::KeySpace;

/// 集合读穿透缓存
#[derive(Clone)]
pub struct CollectionCache {
    cache: Arc<dyn CachePort>,
    ttl: Duration,
}

impl CollectionCache {
    pub fn new(cache: Arc<dyn CachePort>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// 解析整个集合
    ///
    /// 缓存值为空白或无法解析时按未命中处理；加载结果为空返回 NotFound
    pub async fn resolve<T, F, Fut>(&self, keyspace: &KeySpace, loader: F) -> AppResult<Vec<T>>
    where
        T: Serialize + DeserializeOwned + Send,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = AppResult<Vec<T>>> + Send,
    {
        let key = keyspace.collection_key();

        if let Some(raw) = self.cache.get(&key).await? {
            if !raw.trim().is_empty() {
                match serde_json::from_str::<Vec<T>>(&raw) {
                    Ok(items) => {
                        debug!(key = %key, count = items.len(), "Collection served from cache");
                        record_lookup(keyspace, "positive_cache");
                        return Ok(items);
                    }
                    Err(e) => {
                        warn!(key = %key, error = %e, "Discarding undecodable collection payload");
                    }
                }
            }
        }

        let items = loader().await?;
        if items.is_empty() {
            return Err(AppError::not_found(format!("{} list is empty", keyspace.name())));
        }

        let payload = encode_value(&items)?;
        self.cache.set(&key, &payload, Some(self.ttl)).await?;
        info!(key = %key, count = items.len(), ttl_secs = self.ttl.as_secs(), "Collection cache rebuilt");
        record_lookup(keyspace, "loader");

        Ok(items)
    }
}

fn record_lookup(keyspace: &KeySpace, source: &'static str) {
    metrics::counter!(
        CACHE_LOOKUPS_TOTAL,
        "keyspace" => keyspace.name(),
        "source" => source
    )
    .increment(1);
}
