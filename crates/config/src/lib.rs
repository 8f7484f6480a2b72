//! hotcache-config - 配置加载库

use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use secrecy::Secret;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Load(#[from] Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Load(Box::new(err))
    }
}

/// 数据库配置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: Secret<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    // 开发环境: 10, 生产环境: 50
    match std::env::var("APP_ENV").as_deref() {
        Ok("production") => 50,
        _ => 10,
    }
}

/// Redis 配置
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: Secret<String>,
}

/// 遥测配置
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// 是否输出 JSON 格式日志（生产环境）
    #[serde(default)]
    pub json: bool,
    /// Prometheus 抓取端点监听地址
    #[serde(default = "default_metrics_addr")]
    pub metrics_addr: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json: false,
            metrics_addr: default_metrics_addr(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_metrics_addr() -> String {
    "0.0.0.0:9090".to_string()
}

/// 缓存策略配置
///
/// 默认值与现网部署保持一致：商铺 30 分钟，空值 2 分钟，锁 10 秒，竞争重试间隔 50 毫秒
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// 商铺缓存 TTL（秒）
    pub shop_ttl_secs: u64,
    /// 空值缓存 TTL（秒）
    pub null_ttl_secs: u64,
    /// 商铺类型列表缓存 TTL（秒）
    pub shop_type_ttl_secs: u64,
    /// 重建锁 TTL（秒）
    pub lock_ttl_secs: u64,
    /// 锁竞争时的重试间隔（毫秒）
    pub lock_retry_interval_ms: u64,
    /// 锁竞争最大尝试次数，实际次数不少于覆盖一个完整锁 TTL 所需
    pub lock_max_attempts: u32,
    /// 正向缓存 TTL 随机抖动范围（秒），0 表示关闭
    pub ttl_jitter_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            shop_ttl_secs: 30 * 60,
            null_ttl_secs: 2 * 60,
            shop_type_ttl_secs: 30 * 60,
            lock_ttl_secs: 10,
            lock_retry_interval_ms: 50,
            lock_max_attempts: 250,
            ttl_jitter_secs: 0,
        }
    }
}

impl CacheConfig {
    pub fn shop_ttl(&self) -> Duration {
        Duration::from_secs(self.shop_ttl_secs)
    }

    pub fn null_ttl(&self) -> Duration {
        Duration::from_secs(self.null_ttl_secs)
    }

    pub fn shop_type_ttl(&self) -> Duration {
        Duration::from_secs(self.shop_type_ttl_secs)
    }

    pub fn lock_ttl(&self) -> Duration {
        Duration::from_secs(self.lock_ttl_secs)
    }

    pub fn lock_retry_interval(&self) -> Duration {
        Duration::from_millis(self.lock_retry_interval_ms)
    }

    pub fn ttl_jitter(&self) -> Duration {
        Duration::from_secs(self.ttl_jitter_secs)
    }
}

/// 应用配置
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_app_name")]
    pub app_name: String,
    #[serde(default = "default_app_env")]
    pub app_env: String,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

fn default_app_name() -> String {
    "shop-service".to_string()
}

fn default_app_env() -> String {
    "development".to_string()
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    ///
    /// 优先级：环境变量 > `{env}.toml` > `default.toml`
    pub fn load(config_dir: &str) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let figment = Figment::new()
            .merge(Toml::file(format!("{}/default.toml", config_dir)))
            .merge(Toml::file(format!("{}/{}.toml", config_dir, env)))
            .merge(Env::prefixed("HOTCACHE_").split("__"));

        Self::from_figment(figment)
    }

    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        Ok(figment.extract()?)
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.app_env == "production"
    }
}
