//! Redis 分布式锁实现
//!
//! 锁的值是持有者令牌，释放时用 Lua 脚本比较后删除，
//! 避免 TTL 过期后误删下一个持有者的锁。

use async_trait::async_trait;
use hotcache_errors::{AppError, AppResult};
use hotcache_ports::{DistributedLock, LockToken};
use redis::Script;
use redis::aio::ConnectionManager;
use std::time::Duration;

use crate::cache::{COMPARE_AND_DELETE, ttl_millis};

/// Redis 分布式锁
#[derive(Clone)]
pub struct RedisDistributedLock {
    conn: ConnectionManager,
    lock_prefix: String,
}

impl RedisDistributedLock {
    /// 键原样使用，调用方传入完整的锁键（如 `lock:shop:42`）
    pub fn new(conn: ConnectionManager) -> Self {
        Self {
            conn,
            lock_prefix: String::new(),
        }
    }

    /// 为所有锁键追加统一前缀（多套部署共用一个 Redis 时使用）
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.lock_prefix = prefix.into();
        self
    }

    fn lock_key(&self, key: &str) -> String {
        format!("{}{}", self.lock_prefix, key)
    }
}

#[async_trait]
impl DistributedLock for RedisDistributedLock {
    async fn try_acquire(&self, key: &str, ttl: Duration) -> AppResult<Option<LockToken>> {
        let mut conn = self.conn.clone();
        let lock_key = self.lock_key(key);
        let token = LockToken::generate();

        let result: Option<String> = redis::cmd("SET")
            .arg(&lock_key)
            .arg(token.as_str())
            .arg("NX")
            .arg("PX")
            .arg(ttl_millis(ttl))
            .query_async(&mut conn)
            .await
            .map_err(|e| AppError::cache(format!("Redis lock acquire failed: {}", e)))?;

        Ok(result.map(|_| token))
    }

    async fn release(&self, key: &str, token: &LockToken) -> AppResult<bool> {
        let mut conn = self.conn.clone();
        let lock_key = self.lock_key(key);

        let deleted: i64 = Script::new(COMPARE_AND_DELETE)
            .key(&lock_key)
            .arg(token.as_str())
            .invoke_async(&mut conn)
            .await
            .map_err(|e| AppError::cache(format!("Redis lock release failed: {}", e)))?;

        Ok(deleted > 0)
    }
}
