//! Redis 连接管理

use hotcache_errors::{AppError, AppResult};
use redis::Client;
use redis::aio::ConnectionManager;
use tracing::debug;

/// 创建 Redis 连接管理器
///
/// 连接管理器断线后自动重连，可在各请求间 clone 共享
pub async fn create_connection_manager(url: &str) -> AppResult<ConnectionManager> {
    let client = Client::open(url)
        .map_err(|e| AppError::cache(format!("Failed to create Redis client: {}", e)))?;

    let conn = ConnectionManager::new(client).await.map_err(|e| {
        AppError::cache(format!("Failed to create Redis connection manager: {}", e))
    })?;
    debug!("Redis connection manager ready");
    Ok(conn)
}

/// 检查 Redis 连接
pub async fn check_connection(conn: &mut ConnectionManager) -> AppResult<()> {
    redis::cmd("PING")
        .query_async::<String>(conn)
        .await
        .map_err(|e| AppError::cache(format!("Redis health check failed: {}", e)))?;
    Ok(())
}
