//! 应用设置模块
//!
//! 提供核心运行参数的加载、验证和默认值

pub mod loader;
pub mod types;

// 重新导出主要类型
pub use loader::{get_default_settings_path, SettingsLoader, TomlSettingsLoader};
pub use types::{validate_settings, PluginSettings, Settings, WebhookEndpointSettings};
