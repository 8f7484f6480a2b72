//! hotcache-ports - 抽象 trait 层
//!
//! 定义缓存存储和分布式锁的抽象接口，读穿透核心只依赖这里的契约

mod cache;
mod lock;

pub use cache::*;
pub use lock::*;
