//! 缓存条目编解码
//!
//! 存储中的格式保持不变（JSON / 空字符串 / 键不存在），
//! 读出后统一解码为带标签的 [`CacheEntry`]，不在业务代码里判断空字符串。

use hotcache_errors::{AppError, AppResult};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

/// 空值标记：实体已确认在数据库中不存在
pub const EMPTY_SENTINEL: &str = "";

/// 解码后的缓存条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEntry<T> {
    /// 命中，携带反序列化后的值
    Hit(T),
    /// 命中空值标记，实体确认不存在
    ConfirmedAbsent,
    /// 缓存中没有该键，状态未知
    Unknown,
}

impl<T: DeserializeOwned> CacheEntry<T> {
    /// 解码缓存中读出的原始值
    ///
    /// 无法反序列化的值记录告警后按 `Unknown` 处理，由重建流程覆盖
    pub fn decode(key: &str, payload: Option<String>) -> Self {
        match payload {
            None => Self::Unknown,
            Some(raw) if raw == EMPTY_SENTINEL => Self::ConfirmedAbsent,
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(value) => Self::Hit(value),
                Err(e) => {
                    warn!(key, error = %e, "Discarding undecodable cache payload");
                    Self::Unknown
                }
            },
        }
    }
}

/// 序列化实体为缓存值
pub fn encode_value<T: Serialize + ?Sized>(value: &T) -> AppResult<String> {
    serde_json::to_string(value)
        .map_err(|e| AppError::serialization(format!("Failed to serialize cache value: {}", e)))
}
