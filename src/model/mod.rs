//! 数据模型模块
//!
//! 定义API配置实体及其参数描述结构

pub mod api_config;

// 重新导出主要类型
pub use api_config::{
    ApiConfig, ApiConfigDraft, ApiGroup, ApiParam, CachePluginRef, ConfigStatus, ParamType,
    SearchField,
};
