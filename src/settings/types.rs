//! 设置数据结构定义
//!
//! 定义应用程序的设置结构体和验证逻辑

use serde::{Deserialize, Serialize};

/// 主设置结构
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// 缓存插件设置
    #[serde(default)]
    pub plugin: PluginSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            plugin: PluginSettings::default(),
        }
    }
}

/// 缓存插件设置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PluginSettings {
    /// 清理调用超时时间（秒）
    ///
    /// 生命周期控制器用它限定每次插件清理的等待时长，防止
    /// 异常插件拖住配置变更的缓存清理阶段
    #[serde(default = "default_clean_timeout")]
    pub clean_timeout_seconds: u64,
    /// 声明式注册的webhook适配器列表
    #[serde(default)]
    pub webhooks: Vec<WebhookEndpointSettings>,
}

impl Default for PluginSettings {
    fn default() -> Self {
        Self {
            clean_timeout_seconds: default_clean_timeout(),
            webhooks: Vec::new(),
        }
    }
}

/// Webhook适配器设置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WebhookEndpointSettings {
    /// 插件名称
    pub name: String,
    /// 清理回调地址
    pub endpoint: String,
}

// 默认值函数
fn default_log_level() -> String {
    "info".to_string()
}
fn default_clean_timeout() -> u64 {
    5
}

/// 设置验证函数
///
/// # 参数
/// * `settings` - 要验证的设置
///
/// # 返回
/// * `Result<(), String>` - 验证结果，错误时返回错误信息
pub fn validate_settings(settings: &Settings) -> Result<(), String> {
    // 验证日志级别
    let valid_log_levels = ["debug", "info", "warn", "error"];
    if !valid_log_levels.contains(&settings.log_level.as_str()) {
        return Err(format!(
            "无效的日志级别: {}，支持的级别: {:?}",
            settings.log_level, valid_log_levels
        ));
    }

    // 验证清理超时
    if settings.plugin.clean_timeout_seconds == 0 {
        return Err("插件清理超时时间不能为0".to_string());
    }

    if settings.plugin.clean_timeout_seconds > 60 {
        return Err("插件清理超时时间不能超过60秒".to_string());
    }

    // 验证webhook适配器
    let mut seen_names = std::collections::HashSet::new();
    for webhook in &settings.plugin.webhooks {
        if webhook.name.trim().is_empty() {
            return Err("webhook插件名称不能为空".to_string());
        }

        if !seen_names.insert(webhook.name.as_str()) {
            return Err(format!("webhook插件名称重复: {}", webhook.name));
        }

        if !webhook.endpoint.starts_with("http://") && !webhook.endpoint.starts_with("https://") {
            return Err(format!("webhook插件 {} 的回调地址格式无效", webhook.name));
        }
    }

    Ok(())
}
