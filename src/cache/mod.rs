//! 路径查找缓存模块
//!
//! 提供路径到已发布配置的进程内缓存

pub mod lookup;

// 重新导出主要类型
pub use lookup::{LookupCache, LookupCacheStats};
