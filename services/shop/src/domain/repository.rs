//! 仓储接口

use async_trait::async_trait;
use hotcache_common::ShopId;
use hotcache_errors::AppResult;

use super::{Shop, ShopType};

/// 商铺仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShopRepository: Send + Sync {
    /// 根据 ID 查找商铺，不存在返回 `Ok(None)`
    async fn find_by_id(&self, id: ShopId) -> AppResult<Option<Shop>>;

    /// 更新商铺，返回是否有行被更新
    async fn update(&self, id: ShopId, shop: &Shop) -> AppResult<bool>;
}

/// 商铺类型仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShopTypeRepository: Send + Sync {
    /// 按 sort 升序列出全部类型
    async fn list_ordered(&self) -> AppResult<Vec<ShopType>>;
}
