//! 商铺类型

use chrono::{DateTime, Utc};
use hotcache_common::ShopTypeId;
use hotcache_read_through::KeySpace;
use serde::{Deserialize, Serialize};

/// 商铺类型列表缓存键空间：整个列表存放在 `cache:shopType:`
pub const SHOP_TYPE: KeySpace = KeySpace::new("shopType");

/// 商铺类型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopType {
    pub id: ShopTypeId,
    pub name: String,
    pub icon: String,
    /// 排序，升序
    pub sort: i32,
    pub create_time: Option<DateTime<Utc>>,
    pub update_time: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_key() {
        assert_eq!(SHOP_TYPE.collection_key(), "cache:shopType:");
    }
}
