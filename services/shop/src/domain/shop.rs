//! 商铺

use chrono::{DateTime, Utc};
use hotcache_common::{ShopId, ShopTypeId};
use hotcache_read_through::KeySpace;
use serde::{Deserialize, Serialize};

/// 商铺缓存键空间：`cache:shop:{id}` / `lock:shop:{id}`
pub const SHOP: KeySpace = KeySpace::new("shop");

/// 商铺
///
/// 缓存中以 JSON 存储，字段名使用 camelCase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shop {
    /// 更新请求可能不带 ID
    pub id: Option<ShopId>,
    pub name: String,
    pub type_id: ShopTypeId,
    /// 图片，多个以逗号分隔
    pub images: String,
    pub area: Option<String>,
    pub address: String,
    /// 经度
    pub x: f64,
    /// 纬度
    pub y: f64,
    /// 均价，取整
    pub avg_price: Option<i64>,
    pub sold: i32,
    pub comments: i32,
    /// 评分，1~5 分，乘 10 保存
    pub score: i32,
    /// 营业时间，例如 10:00-22:00
    pub open_hours: Option<String>,
    pub create_time: Option<DateTime<Utc>>,
    pub update_time: Option<DateTime<Utc>>,
}

impl Shop {
    /// 创建只有必填字段的商铺
    pub fn new(name: impl Into<String>, type_id: ShopTypeId) -> Self {
        Self {
            id: None,
            name: name.into(),
            type_id,
            images: String::new(),
            area: None,
            address: String::new(),
            x: 0.0,
            y: 0.0,
            avg_price: None,
            sold: 0,
            comments: 0,
            score: 0,
            open_hours: None,
            create_time: None,
            update_time: None,
        }
    }

    pub fn with_id(mut self, id: ShopId) -> Self {
        self.id = Some(id);
        self
    }
}
