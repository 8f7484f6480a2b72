//! 缓存键命名空间
//!
//! 键格式需与现网部署逐字节一致：
//! - 实体缓存：`cache:{name}:{id}`
//! - 重建锁：`lock:{name}:{id}`
//! - 集合缓存：`cache:{name}:`

use std::fmt::Display;

/// 缓存键命名空间
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySpace {
    name: &'static str,
}

impl KeySpace {
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }

    /// 命名空间名称，同时用作指标标签
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn cache_key(&self, id: impl Display) -> String {
        format!("cache:{}:{}", self.name, id)
    }

    pub fn lock_key(&self, id: impl Display) -> String {
        format!("lock:{}:{}", self.name, id)
    }

    /// 整个集合共用的固定键
    pub fn collection_key(&self) -> String {
        format!("cache:{}:", self.name)
    }
}
