//! PostgreSQL 连接管理

use hotcache_errors::{AppError, AppResult};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::debug;

/// PostgreSQL 连接池配置
///
/// 缓存未命中时才会访问数据库，连接数按重建并发而非请求并发估算
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub url: String,
    pub max_connections: u32,
    /// 获取连接的等待上限，超时后读路径返回 Database 错误
    pub acquire_timeout: Duration,
}

impl PostgresConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 10,
            acquire_timeout: Duration::from_secs(5),
        }
    }

    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }
}

/// 创建 PostgreSQL 连接池
pub async fn create_pool(config: &PostgresConfig) -> AppResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect(&config.url)
        .await
        .map_err(|e| AppError::database(format!("Failed to create pool: {}", e)))?;
    debug!(max_connections = config.max_connections, "PostgreSQL pool ready");
    Ok(pool)
}

/// 检查数据库连接
pub async fn check_connection(pool: &PgPool) -> AppResult<()> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map_err(|e| AppError::database(format!("Database health check failed: {}", e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = PostgresConfig::new("postgres://localhost/hmdp").with_max_connections(50);
        assert_eq!(config.url, "postgres://localhost/hmdp");
        assert_eq!(config.max_connections, 50);
        assert_eq!(config.acquire_timeout, Duration::from_secs(5));
    }
}
