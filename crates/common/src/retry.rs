//! 通用重试机制模块
//!
//! 提供带指数退避的重试逻辑，用于启动阶段建立 Redis / PostgreSQL 连接。
//! 读路径上的锁竞争重试是固定间隔的，不走这里。

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// 重试配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// 最大尝试次数（包含第一次）
    pub max_attempts: u32,
    /// 初始延迟
    pub initial_delay: Duration,
    /// 最大延迟
    pub max_delay: Duration,
    /// 退避乘数
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
}

fn default_multiplier() -> f64 {
    2.0
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
            multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    pub fn new(max_attempts: u32, initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay,
            max_delay,
            multiplier: 2.0,
        }
    }

    /// 计算第 n 次重试前的延迟（n 从 0 开始）
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay_ms =
            self.initial_delay.as_millis() as f64 * self.multiplier.powi(attempt as i32);
        let capped = (delay_ms as u64).min(self.max_delay.as_millis() as u64);
        Duration::from_millis(capped)
    }
}

/// 带重试的异步操作执行器
///
/// 只有 `should_retry` 返回 true 的错误才会重试，其余错误立即返回；
/// 次数耗尽时返回最后一次的错误
pub async fn with_retry<F, Fut, T, E, P>(
    config: &RetryConfig,
    operation_name: &str,
    mut operation: F,
    should_retry: P,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    info!(
                        operation = operation_name,
                        attempt = attempt + 1,
                        "Operation succeeded after retry"
                    );
                }
                return Ok(result);
            }
            Err(e) => {
                if !should_retry(&e) {
                    warn!(
                        operation = operation_name,
                        attempt = attempt + 1,
                        error = %e,
                        "Operation failed with non-retryable error"
                    );
                    return Err(e);
                }

                if attempt + 1 >= max_attempts {
                    warn!(
                        operation = operation_name,
                        attempt = attempt + 1,
                        max_attempts,
                        error = %e,
                        "Operation failed, no more retries"
                    );
                    return Err(e);
                }

                let delay = config.delay_for_attempt(attempt);
                warn!(
                    operation = operation_name,
                    attempt = attempt + 1,
                    max_attempts,
                    error = %e,
                    delay_ms = delay.as_millis() as u64,
                    "Operation failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
