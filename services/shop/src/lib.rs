//! Shop Service - 商铺查询服务
//!
//! 商铺详情与商铺类型列表走读穿透缓存，商铺更新在提交后删除缓存。

pub mod application;
pub mod domain;
pub mod infrastructure;
