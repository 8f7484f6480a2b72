//! 应用层

mod shop_service;
mod shop_type_service;

pub use shop_service::ShopService;
pub use shop_type_service::ShopTypeService;
