//! 领域层

mod repository;
mod shop;
mod shop_type;

pub use repository::*;
pub use shop::*;
pub use shop_type::*;
