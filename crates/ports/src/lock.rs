//! 分布式锁 trait 定义

use async_trait::async_trait;
use hotcache_errors::AppResult;
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// 锁持有者令牌
///
/// 获取锁时写入锁的值，释放时比对，防止误删其他持有者的锁
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LockToken(String);

impl LockToken {
    /// 生成新的随机令牌
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for LockToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for LockToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 分布式锁 trait
#[async_trait]
pub trait DistributedLock: Send + Sync {
    /// 尝试获取锁（一次原子的 set-if-absent），成功时返回持有者令牌
    ///
    /// 锁在 `release` 或 TTL 到期（以先到者为准）之前归调用方独占
    async fn try_acquire(&self, key: &str, ttl: Duration) -> AppResult<Option<LockToken>>;

    /// 释放锁，仅当锁仍由 `token` 持有时删除；返回是否真正删除
    async fn release(&self, key: &str, token: &LockToken) -> AppResult<bool>;
}
