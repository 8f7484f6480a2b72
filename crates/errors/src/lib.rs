//! hotcache-errors - 统一错误处理
//!
//! 读路径对调用方只暴露三种结果：值、NotFound、其他失败。

use thiserror::Error;

/// 应用错误类型
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    /// 锁竞争重试次数耗尽
    #[error("Lock acquisition timed out: {0}")]
    LockTimeout(String),
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    pub fn cache(msg: impl Into<String>) -> Self {
        Self::Cache(msg.into())
    }

    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    pub fn lock_timeout(msg: impl Into<String>) -> Self {
        Self::LockTimeout(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// 是否为基础设施瞬时故障（连接、存储不可达等），可用于启动阶段重试判断
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Database(_) | Self::Cache(_) | Self::LockTimeout(_))
    }
}

/// Result 类型别名
pub type AppResult<T> = Result<T, AppError>;
