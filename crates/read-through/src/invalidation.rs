//! 写后失效
//!
//! 必须在数据库写入提交之后调用（先更新、再删除缓存）。先删缓存会留下一个窗口，
//! 并发读者可能在更新提交前用旧值重新回填。

use std::fmt::Display;
use std::sync::Arc;

use hotcache_errors::AppResult;
use hotcache_ports::CachePort;
use hotcache_telemetry::CACHE_INVALIDATIONS_TOTAL;
use tracing::debug;

use crate::keyspace::KeySpace;

/// 缓存失效钩子
#[derive(Clone)]
pub struct CacheInvalidator {
    cache: Arc<dyn CachePort>,
}

impl CacheInvalidator {
    pub fn new(cache: Arc<dyn CachePort>) -> Self {
        Self { cache }
    }

    /// 删除实体缓存，键不存在不是错误；不写空值标记，下一次读取正常重建
    pub async fn invalidate(&self, keyspace: &KeySpace, id: impl Display) -> AppResult<()> {
        let key = keyspace.cache_key(id);
        self.cache.delete(&key).await?;
        debug!(key = %key, "Cache entry invalidated");
        metrics::counter!(CACHE_INVALIDATIONS_TOTAL, "keyspace" => keyspace.name()).increment(1);
        Ok(())
    }

    /// 删除整个集合缓存
    pub async fn invalidate_collection(&self, keyspace: &KeySpace) -> AppResult<()> {
        let key = keyspace.collection_key();
        self.cache.delete(&key).await?;
        debug!(key = %key, "Collection cache invalidated");
        metrics::counter!(CACHE_INVALIDATIONS_TOTAL, "keyspace" => keyspace.name()).increment(1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryCache;

    const ITEM: KeySpace = KeySpace::new("item");

    #[tokio::test]
    async fn test_invalidate_deletes_entry() {
        let cache = Arc::new(MemoryCache::new());
        cache.set("cache:item:1", r#"{"id":1}"#, None).await.unwrap();
        let invalidator = CacheInvalidator::new(cache.clone());

        invalidator.invalidate(&ITEM, 1).await.unwrap();
        assert!(!cache.exists("cache:item:1").await.unwrap());
    }

    #[tokio::test]
    async fn test_invalidate_missing_key_is_ok() {
        let cache = Arc::new(MemoryCache::new());
        let invalidator = CacheInvalidator::new(cache.clone());

        invalidator.invalidate(&ITEM, 404).await.unwrap();
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_invalidate_does_not_write_sentinel() {
        let cache = Arc::new(MemoryCache::new());
        cache.set("cache:item:2", "", None).await.unwrap();
        let invalidator = CacheInvalidator::new(cache.clone());

        invalidator.invalidate(&ITEM, 2).await.unwrap();
        assert_eq!(cache.get("cache:item:2").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_invalidate_collection() {
        let cache = Arc::new(MemoryCache::new());
        cache.set("cache:item:", "[]", None).await.unwrap();
        let invalidator = CacheInvalidator::new(cache.clone());

        invalidator.invalidate_collection(&ITEM).await.unwrap();
        assert!(!cache.exists("cache:item:").await.unwrap());
    }
}
