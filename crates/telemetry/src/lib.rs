//! hotcache-telemetry - 可观测性库

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// 缓存查询计数（标签：keyspace、source）
pub const CACHE_LOOKUPS_TOTAL: &str = "cache_lookups_total";
/// 重建锁竞争计数（标签：keyspace）
pub const CACHE_LOCK_CONTENTION_TOTAL: &str = "cache_lock_contention_total";
/// 缓存失效计数（标签：keyspace）
pub const CACHE_INVALIDATIONS_TOTAL: &str = "cache_invalidations_total";

/// 初始化 tracing
///
/// `RUST_LOG` 优先于传入的日志级别。重复初始化时静默忽略。
pub fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

/// 初始化 JSON 格式的 tracing（生产环境）
pub fn init_tracing_json(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().json())
        .try_init();
}

/// 初始化 Prometheus metrics
///
/// 安装全局 recorder 并在 `listen_addr` 上提供抓取端点，需在 tokio 运行时内调用
pub fn init_metrics(listen_addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new()
        .with_http_listener(listen_addr)
        .install()?;
    describe_cache_metrics();
    Ok(())
}

fn describe_cache_metrics() {
    metrics::describe_counter!(
        CACHE_LOOKUPS_TOTAL,
        "Read-through lookups by keyspace and answer source"
    );
    metrics::describe_counter!(
        CACHE_LOCK_CONTENTION_TOTAL,
        "Rebuild attempts that found the mutex held by another worker"
    );
    metrics::describe_counter!(
        CACHE_INVALIDATIONS_TOTAL,
        "Cache entries evicted after a committed write"
    );
}
