//! hotcache-adapter-redis - Redis 适配器

mod cache;
mod connection;
mod distributed_lock;

pub use cache::*;
pub use connection::*;
pub use distributed_lock::*;
