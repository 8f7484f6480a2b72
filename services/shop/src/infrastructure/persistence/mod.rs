//! 持久化实现

mod shop_repository;
mod shop_type_repository;

pub use shop_repository::PostgresShopRepository;
pub use shop_type_repository::PostgresShopTypeRepository;
