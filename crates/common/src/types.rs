//! 通用类型定义

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

/// 商铺 ID
///
/// 与数据库自增主键一致，同时作为缓存键后缀
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From)]
#[serde(transparent)]
#[display("{_0}")]
pub struct ShopId(pub i64);

impl ShopId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// 商铺类型 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From)]
#[serde(transparent)]
#[display("{_0}")]
pub struct ShopTypeId(pub i64);

impl ShopTypeId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// 用户 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From)]
#[serde(transparent)]
#[display("{_0}")]
pub struct UserId(pub i64);
