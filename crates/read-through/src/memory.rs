//! 进程内缓存存储
//!
//! 带 TTL 的 [`CachePort`] 实现，用于本地开发和测试。
//! 所有操作在同一把互斥锁内完成，`set_nx` 与 `delete_if_equals` 因此是原子的。

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use hotcache_errors::AppResult;
use hotcache_ports::CachePort;
use parking_lot::Mutex;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn new(value: &str, ttl: Option<Duration>) -> Self {
        Self {
            value: value.to_string(),
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// 进程内缓存
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 未过期的键数量
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .values()
            .filter(|entry| !entry.is_expired(now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 在锁内读取未过期条目，顺带清理已过期的键
    fn with_live_entry<R>(&self, key: &str, f: impl FnOnce(Option<&mut Entry>) -> R) -> R {
        let mut entries = self.entries.lock();
        if entries.get(key).is_some_and(|e| e.is_expired(Instant::now())) {
            entries.remove(key);
        }
        f(entries.get_mut(key))
    }

    /// 写入时清理所有已过期的键，未再被访问的键也会被回收
    fn prune_expired(entries: &mut HashMap<String, Entry>, now: Instant) {
        entries.retain(|_, entry| !entry.is_expired(now));
    }
}

#[async_trait]
impl CachePort for MemoryCache {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.with_live_entry(key, |entry| entry.map(|e| e.value.clone())))
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> AppResult<()> {
        let mut entries = self.entries.lock();
        Self::prune_expired(&mut entries, Instant::now());
        entries.insert(key.to_string(), Entry::new(value, ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.entries.lock().remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.with_live_entry(key, |entry| entry.is_some()))
    }

    async fn expire(&self, key: &str, ttl: Duration) -> AppResult<()> {
        self.with_live_entry(key, |entry| {
            if let Some(entry) = entry {
                entry.expires_at = Some(Instant::now() + ttl);
            }
        });
        Ok(())
    }

    async fn ttl(&self, key: &str) -> AppResult<Option<Duration>> {
        Ok(self.with_live_entry(key, |entry| {
            entry
                .and_then(|e| e.expires_at)
                .map(|at| at.saturating_duration_since(Instant::now()))
        }))
    }

    async fn set_nx(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool> {
        let mut entries = self.entries.lock();
        Self::prune_expired(&mut entries, Instant::now());
        match entries.get(key) {
            Some(_) => Ok(false),
            None => {
                entries.insert(key.to_string(), Entry::new(value, Some(ttl)));
                Ok(true)
            }
        }
    }

    async fn delete_if_equals(&self, key: &str, expected_value: &str) -> AppResult<bool> {
        let mut entries = self.entries.lock();
        let now = Instant::now();
        match entries.get(key) {
            Some(existing) if !existing.is_expired(now) && existing.value == expected_value => {
                entries.remove(key);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_value_is_distinct_from_absent() {
        let cache = MemoryCache::new();
        cache.set("k", "", Some(Duration::from_secs(60))).await.unwrap();

        assert_eq!(cache.get("k").await.unwrap(), Some(String::new()));
        assert_eq!(cache.get("missing").await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire() {
        let cache = MemoryCache::new();
        cache.set("k", "v", Some(Duration::from_secs(2))).await.unwrap();
        assert_eq!(cache.ttl("k").await.unwrap(), Some(Duration::from_secs(2)));

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(cache.get("k").await.unwrap(), None);
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_nx_respects_expiry() {
        let cache = MemoryCache::new();
        let ttl = Duration::from_secs(10);

        assert!(cache.set_nx("lock", "a", ttl).await.unwrap());
        assert!(!cache.set_nx("lock", "b", ttl).await.unwrap());

        tokio::time::advance(ttl).await;
        assert!(cache.set_nx("lock", "b", ttl).await.unwrap());
        assert_eq!(cache.get("lock").await.unwrap(), Some("b".to_string()));
    }

    #[tokio::test]
    async fn test_delete_if_equals() {
        let cache = MemoryCache::new();
        cache.set("lock", "token-a", None).await.unwrap();

        assert!(!cache.delete_if_equals("lock", "token-b").await.unwrap());
        assert!(cache.exists("lock").await.unwrap());
        assert!(cache.delete_if_equals("lock", "token-a").await.unwrap());
        assert!(!cache.exists("lock").await.unwrap());
    }

    #[tokio::test]
    async fn test_expire_and_persistent_ttl() {
        let cache = MemoryCache::new();
        cache.set("k", "v", None).await.unwrap();
        assert_eq!(cache.ttl("k").await.unwrap(), None);

        cache.expire("k", Duration::from_secs(30)).await.unwrap();
        let ttl = cache.ttl("k").await.unwrap().unwrap();
        assert!(ttl <= Duration::from_secs(30) && ttl > Duration::from_secs(29));

        // 不存在的键 expire 不报错
        cache.expire("missing", Duration::from_secs(30)).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_writes_reclaim_expired_keys() {
        let cache = MemoryCache::new();
        for id in 0..100 {
            let key = format!("cache:shop:{}", id);
            cache.set(&key, "", Some(Duration::from_secs(120))).await.unwrap();
        }
        assert_eq!(cache.entries.lock().len(), 100);

        tokio::time::advance(Duration::from_secs(120)).await;
        cache.set("cache:shop:1000", "{}", Some(Duration::from_secs(60))).await.unwrap();
        assert_eq!(cache.entries.lock().len(), 1);

        tokio::time::advance(Duration::from_secs(60)).await;
        assert!(cache.set_nx("lock:shop:1", "t", Duration::from_secs(10)).await.unwrap());
        assert_eq!(cache.entries.lock().len(), 1);
        assert_eq!(cache.get("cache:shop:1000").await.unwrap(), None);
    }
}
