//! 重建互斥锁
//!
//! [`CacheLock`] 在任意 [`CachePort`] 之上用 SET NX + 比较删除实现令牌锁；
//! [`LockGuard`] 把一次持有限定在作用域内，保证每条退出路径都会释放。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use hotcache_errors::AppResult;
use hotcache_ports::{CachePort, DistributedLock, LockToken};
use tracing::{debug, warn};

/// 基于缓存存储的分布式锁
pub struct CacheLock {
    cache: Arc<dyn CachePort>,
}

impl CacheLock {
    pub fn new(cache: Arc<dyn CachePort>) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl DistributedLock for CacheLock {
    async fn try_acquire(&self, key: &str, ttl: Duration) -> AppResult<Option<LockToken>> {
        let token = LockToken::generate();
        if self.cache.set_nx(key, token.as_str(), ttl).await? {
            Ok(Some(token))
        } else {
            Ok(None)
        }
    }

    async fn release(&self, key: &str, token: &LockToken) -> AppResult<bool> {
        self.cache.delete_if_equals(key, token.as_str()).await
    }
}

/// 作用域锁
///
/// 正常路径调用 [`LockGuard::release`]；若 guard 在持有状态下被丢弃
/// （panic 或 future 被取消），Drop 会在当前运行时后台释放，
/// 没有运行时则等待 TTL 过期。
pub struct LockGuard {
    lock: Arc<dyn DistributedLock>,
    key: String,
    token: Option<LockToken>,
}

impl LockGuard {
    /// 尝试获取锁，被占用时返回 None
    pub async fn try_acquire(
        lock: Arc<dyn DistributedLock>,
        key: &str,
        ttl: Duration,
    ) -> AppResult<Option<Self>> {
        let token = lock.try_acquire(key, ttl).await?;
        Ok(token.map(|token| {
            debug!(key, "Rebuild lock acquired");
            Self {
                lock,
                key: key.to_string(),
                token: Some(token),
            }
        }))
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// 释放锁
    ///
    /// 返回 false 表示锁已不归本持有者（TTL 到期后被他人获取），此时不会误删
    pub async fn release(mut self) -> AppResult<bool> {
        match self.token.take() {
            Some(token) => {
                let released = self.lock.release(&self.key, &token).await?;
                if released {
                    debug!(key = %self.key, "Rebuild lock released");
                } else {
                    warn!(key = %self.key, "Rebuild lock expired before release");
                }
                Ok(released)
            }
            None => Ok(false),
        }
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let Some(token) = self.token.take() else {
            return;
        };

        let key = std::mem::take(&mut self.key);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let lock = self.lock.clone();
                handle.spawn(async move {
                    if let Err(e) = lock.release(&key, &token).await {
                        warn!(key, error = %e, "Failed to release abandoned rebuild lock");
                    }
                });
            }
            Err(_) => {
                warn!(key, "Rebuild lock abandoned outside runtime, left to TTL expiry");
            }
        }
    }
}
