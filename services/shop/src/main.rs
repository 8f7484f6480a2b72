//! Shop Service 入口
//!
//! 加载配置、初始化可观测性与基础设施，组装服务后等待关闭信号

use std::net::SocketAddr;

use hotcache_config::AppConfig;
use hotcache_telemetry::{init_metrics, init_tracing, init_tracing_json};
use shop_service::infrastructure::Infrastructure;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load("config")?;

    if config.telemetry.json || config.is_production() {
        init_tracing_json(&config.telemetry.log_level);
    } else {
        init_tracing(&config.telemetry.log_level);
    }
    let metrics_addr: SocketAddr = config.telemetry.metrics_addr.parse()?;
    match init_metrics(metrics_addr) {
        Ok(()) => info!(addr = %metrics_addr, "Prometheus metrics endpoint listening"),
        Err(e) => warn!("Failed to install Prometheus exporter: {}", e),
    }

    info!(app = %config.app_name, env = %config.app_env, "Starting shop service");

    let infra = Infrastructure::from_config(config).await?;
    infra.check_health().await?;
    let _services = infra.build_services();
    info!("Shop services ready");

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");
    Ok(())
}
