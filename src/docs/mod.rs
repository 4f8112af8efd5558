//! 接口文档模块
//!
//! 从存储的参数描述生成人类可读的接口文档

pub mod generator;

// 重新导出主要类型
pub use generator::DocGenerator;
