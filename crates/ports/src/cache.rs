//! Cache trait 定义

use async_trait::async_trait;
use hotcache_errors::AppResult;
use std::time::Duration;

/// 缓存存储 trait
///
/// 实现方需保证 `set_nx` 与 `delete_if_equals` 的原子性，
/// 且同一个键的 get/set 对所有调用方线性可见
#[async_trait]
pub trait CachePort: Send + Sync {
    /// 获取缓存值，键不存在时返回 None
    ///
    /// 注意空字符串是合法的值，与 None 含义不同
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// 设置缓存值，`ttl` 为 None 时永不过期
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> AppResult<()>;

    /// 删除缓存，键不存在不是错误
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// 检查是否存在
    async fn exists(&self, key: &str) -> AppResult<bool>;

    /// 设置过期时间
    async fn expire(&self, key: &str, ttl: Duration) -> AppResult<()>;

    /// 剩余 TTL，键不存在或未设置过期时间时返回 None
    async fn ttl(&self, key: &str) -> AppResult<Option<Duration>>;

    /// 仅当键不存在时设置（SET NX），返回是否设置成功
    async fn set_nx(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool>;

    /// 仅当当前值等于 `expected_value` 时删除，返回是否删除
    async fn delete_if_equals(&self, key: &str, expected_value: &str) -> AppResult<bool>;
}
