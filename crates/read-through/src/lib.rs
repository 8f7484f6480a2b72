//! hotcache-read-through - 读穿透缓存核心
//!
//! 在共享缓存前面防御两类问题：
//! - 缓存穿透：对不存在的实体反复查询，通过空值缓存拦截
//! - 缓存击穿：热点键过期瞬间的并发重建，通过分布式互斥锁保证单飞
//!
//! 所有并发协调都委托给缓存存储自身的原子操作，进程内不加锁。

mod collection;
mod entry;
mod invalidation;
mod keyspace;
mod lock;
mod memory;
mod policy;
mod resolver;

pub use collection::*;
pub use entry::*;
pub use invalidation::*;
pub use keyspace::*;
pub use lock::*;
pub use memory::*;
pub use policy::*;
pub use resolver::*;
