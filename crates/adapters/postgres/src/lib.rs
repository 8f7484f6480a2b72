//! hotcache-adapter-postgres - PostgreSQL 适配器

mod connection;
mod error;

pub use connection::*;
pub use error::*;
