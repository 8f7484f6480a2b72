//! 基础设施层

mod bootstrap;
pub mod persistence;

pub use bootstrap::*;
