//! Redis Cache 实现

use async_trait::async_trait;
use hotcache_errors::{AppError, AppResult};
use hotcache_ports::CachePort;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Script};
use std::time::Duration;

/// 比较并删除：只有当值匹配时才删除
pub(crate) const COMPARE_AND_DELETE: &str = r"
if redis.call('GET', KEYS[1]) == ARGV[1] then
    return redis.call('DEL', KEYS[1])
else
    return 0
end
";

/// Redis Cache
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
}

impl RedisCache {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }
}

fn redis_error(op: &str, e: redis::RedisError) -> AppError {
    AppError::cache(format!("Redis {} failed: {}", op, e))
}

/// 将毫秒转换为 Redis 可接受的过期时间（至少 1 毫秒）
pub(crate) fn ttl_millis(ttl: Duration) -> u64 {
    (ttl.as_millis() as u64).max(1)
}

/// 解析 PTTL 返回值：-2 表示键不存在，-1 表示没有过期时间
pub(crate) fn parse_pttl(pttl: i64) -> Option<Duration> {
    if pttl < 0 {
        None
    } else {
        Some(Duration::from_millis(pttl as u64))
    }
}

#[async_trait]
impl CachePort for RedisCache {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let mut conn = self.conn.clone();
        conn.get(key).await.map_err(|e| redis_error("get", e))
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> AppResult<()> {
        let mut conn = self.conn.clone();
        match ttl {
            Some(duration) => conn
                .pset_ex(key, value, ttl_millis(duration))
                .await
                .map_err(|e| redis_error("set", e)),
            None => conn.set(key, value).await.map_err(|e| redis_error("set", e)),
        }
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let mut conn = self.conn.clone();
        conn.del(key).await.map_err(|e| redis_error("delete", e))
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        let mut conn = self.conn.clone();
        conn.exists(key).await.map_err(|e| redis_error("exists", e))
    }

    async fn expire(&self, key: &str, ttl: Duration) -> AppResult<()> {
        let mut conn = self.conn.clone();
        conn.pexpire(key, ttl_millis(ttl) as i64)
            .await
            .map_err(|e| redis_error("expire", e))
    }

    async fn ttl(&self, key: &str) -> AppResult<Option<Duration>> {
        let mut conn = self.conn.clone();
        let pttl: i64 = conn.pttl(key).await.map_err(|e| redis_error("ttl", e))?;
        Ok(parse_pttl(pttl))
    }

    async fn set_nx(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool> {
        let mut conn = self.conn.clone();

        // SET NX PX 原子性地设置键和过期时间
        let result: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("NX")
            .arg("PX")
            .arg(ttl_millis(ttl))
            .query_async(&mut conn)
            .await
            .map_err(|e| redis_error("set_nx", e))?;

        Ok(result.is_some())
    }

    async fn delete_if_equals(&self, key: &str, expected_value: &str) -> AppResult<bool> {
        let mut conn = self.conn.clone();

        let deleted: i64 = Script::new(COMPARE_AND_DELETE)
            .key(key)
            .arg(expected_value)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| redis_error("delete_if_equals", e))?;

        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pttl() {
        assert_eq!(parse_pttl(-2), None);
        assert_eq!(parse_pttl(-1), None);
        assert_eq!(parse_pttl(0), Some(Duration::ZERO));
        assert_eq!(parse_pttl(1_800_000), Some(Duration::from_secs(1800)));
    }

    #[test]
    fn test_ttl_millis_never_zero() {
        assert_eq!(ttl_millis(Duration::ZERO), 1);
        assert_eq!(ttl_millis(Duration::from_secs(10)), 10_000);
        assert_eq!(ttl_millis(Duration::from_millis(50)), 50);
    }
}
