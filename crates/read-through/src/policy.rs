//! 缓存 TTL 与重建策略

use rand::Rng;
use std::time::Duration;

/// 读穿透策略
#[derive(Debug, Clone)]
pub struct CachePolicy {
    /// 正向缓存 TTL，只在写入时设置，读取不续期
    pub positive_ttl: Duration,
    /// 空值缓存 TTL
    pub negative_ttl: Duration,
    /// 重建锁 TTL，持有者崩溃时由过期回收
    pub lock_ttl: Duration,
    /// 锁竞争时的固定等待间隔
    pub retry_interval: Duration,
    /// 锁竞争最大尝试次数，耗尽后返回 LockTimeout；
    /// 实际次数见 [`CachePolicy::lock_wait_attempts`]
    pub max_lock_attempts: u32,
    /// 正向 TTL 随机抖动范围（±一半），零表示关闭
    pub ttl_jitter: Duration,
    /// 模拟重建耗时，仅测试使用
    pub rebuild_delay: Option<Duration>,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            positive_ttl: Duration::from_secs(30 * 60),
            negative_ttl: Duration::from_secs(2 * 60),
            lock_ttl: Duration::from_secs(10),
            retry_interval: Duration::from_millis(50),
            max_lock_attempts: 250,
            ttl_jitter: Duration::ZERO,
            rebuild_delay: None,
        }
    }
}

impl CachePolicy {
    pub fn with_positive_ttl(mut self, ttl: Duration) -> Self {
        self.positive_ttl = ttl;
        self
    }

    pub fn with_negative_ttl(mut self, ttl: Duration) -> Self {
        self.negative_ttl = ttl;
        self
    }

    pub fn with_lock_ttl(mut self, ttl: Duration) -> Self {
        self.lock_ttl = ttl;
        self
    }

    pub fn with_retry(mut self, interval: Duration, max_attempts: u32) -> Self {
        self.retry_interval = interval;
        self.max_lock_attempts = max_attempts;
        self
    }

    pub fn with_ttl_jitter(mut self, jitter: Duration) -> Self {
        self.ttl_jitter = jitter;
        self
    }

    pub fn with_rebuild_delay(mut self, delay: Duration) -> Self {
        self.rebuild_delay = Some(delay);
        self
    }

    /// 等锁的实际尝试次数
    ///
    /// 不少于锁 TTL 的 1.25 倍所需次数：持有者仍合法持锁时等待方不会放弃，
    /// 持有者崩溃后等待方能等到 TTL 回收并接手重建
    pub fn lock_wait_attempts(&self) -> u32 {
        let interval_ms = self.retry_interval.as_millis().max(1);
        let lifetime = self.lock_ttl.as_millis().div_ceil(interval_ms);
        let floor = lifetime + lifetime / 4 + 1;
        let floor = u32::try_from(floor).unwrap_or(u32::MAX);
        self.max_lock_attempts.max(floor)
    }

    /// 本次写入使用的正向 TTL
    ///
    /// 例如：TTL 1800 秒，抖动 60 秒，则实际 TTL 在 1770-1830 秒之间
    pub fn positive_ttl_jittered(&self) -> Duration {
        let jitter_ms = self.ttl_jitter.as_millis() as u64;
        if jitter_ms == 0 {
            return self.positive_ttl;
        }

        let offset = rand::thread_rng().gen_range(0..=jitter_ms);
        let half = jitter_ms / 2;
        let base = self.positive_ttl.as_millis() as u64;
        let ttl_ms = if offset > half {
            base + (offset - half)
        } else {
            base.saturating_sub(half - offset)
        };

        // TTL 不能为零，否则等同于不缓存
        Duration::from_millis(ttl_ms.max(1000))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let policy = CachePolicy::default();
        assert_eq!(policy.positive_ttl, Duration::from_secs(1800));
        assert_eq!(policy.negative_ttl, Duration::from_secs(120));
        assert_eq!(policy.lock_ttl, Duration::from_secs(10));
        assert_eq!(policy.retry_interval, Duration::from_millis(50));
        assert!(policy.rebuild_delay.is_none());
    }

    #[test]
    fn test_wait_budget_covers_lock_ttl() {
        let policy = CachePolicy::default();
        assert!(policy.retry_interval * policy.lock_wait_attempts() > policy.lock_ttl);

        // 配置过小的次数被提升到覆盖锁 TTL
        let policy = CachePolicy::default().with_retry(Duration::from_millis(50), 5);
        assert_eq!(policy.lock_wait_attempts(), 251);

        let policy = CachePolicy::default()
            .with_lock_ttl(Duration::from_millis(20))
            .with_retry(Duration::from_millis(1), 3);
        assert_eq!(policy.lock_wait_attempts(), 26);

        let policy = CachePolicy::default().with_retry(Duration::ZERO, 1);
        assert!(policy.lock_wait_attempts() >= 10_000);
    }

    #[test]
    fn test_no_jitter_is_exact() {
        let policy = CachePolicy::default();
        for _ in 0..10 {
            assert_eq!(policy.positive_ttl_jittered(), Duration::from_secs(1800));
        }
    }

    #[test]
    fn test_jitter_stays_in_range() {
        let policy = CachePolicy::default().with_ttl_jitter(Duration::from_secs(60));
        for _ in 0..50 {
            let ttl = policy.positive_ttl_jittered().as_secs();
            assert!((1770..=1830).contains(&ttl), "ttl {} out of range", ttl);
        }
    }
}
