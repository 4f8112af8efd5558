//! 配置生命周期模块
//!
//! 提供配置生命周期编排和ID生成功能

pub mod idgen;
pub mod lifecycle;

// 重新导出主要类型
pub use idgen::{IdGenerator, UuidIdGenerator};
pub use lifecycle::ApiConfigService;
