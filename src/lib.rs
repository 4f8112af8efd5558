//! Api Config Center - 声明式API端点配置管理核心
//!
//! 这是一个用Rust编写的API端点配置管理库，每个端点背后是一条
//! 参数化数据库查询，支持：
//! - 配置的新增、更新、删除、发布与下线编排
//! - 请求路径的唯一性约束
//! - 路径到已发布配置的进程内查找缓存
//! - 按名称解析的二级结果缓存插件及尽力而为的清理通知
//! - 参数描述到Markdown接口文档的导出
//!
//! 本库不执行配置里的查询，也不做HTTP路由，由请求分发层以
//! 进程内调用的方式消费。

pub mod cache;
pub mod docs;
pub mod error;
pub mod logging;
pub mod model;
pub mod plugin;
pub mod service;
pub mod settings;
pub mod store;

// 重新导出主要类型
pub use cache::LookupCache;
pub use docs::DocGenerator;
pub use error::{ConfigCenterError, PluginError, Result, SettingsError, StoreError};
pub use model::{ApiConfig, ApiConfigDraft, ApiParam, ConfigStatus, ParamType};
pub use plugin::{CachePlugin, CachePluginRegistry};
pub use service::ApiConfigService;
pub use settings::Settings;
pub use store::{ConfigStore, MemoryConfigStore};

/// 应用程序版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 应用程序名称
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

/// 应用程序描述
pub const APP_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
