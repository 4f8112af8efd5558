//! 缓存插件注册表
//!
//! 按名称解析二级结果缓存适配器

use crate::error::PluginError;
use crate::plugin::cache_plugin::CachePlugin;
use crate::plugin::local::LocalCachePlugin;
use crate::plugin::webhook::WebhookCachePlugin;
use crate::settings::Settings;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::info;

/// 缓存插件注册表
///
/// 适配器在启动阶段注册，配置变更时按配置里记录的插件名称解析。
/// 解析失败返回类型化错误，由调用方按尽力而为策略处理。
#[derive(Default)]
pub struct CachePluginRegistry {
    /// 名称到适配器的映射
    plugins: RwLock<HashMap<String, Arc<dyn CachePlugin>>>,
}

impl CachePluginRegistry {
    /// 创建空的插件注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 根据设置构建注册表
    ///
    /// 始终注册本地结果缓存适配器，并为设置中声明的每个webhook
    /// 回调地址注册一个远端适配器
    ///
    /// # 参数
    /// * `settings` - 应用设置
    ///
    /// # 返回
    /// * `anyhow::Result<Self>` - 注册表实例
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let registry = Self::new();
        registry.register(Arc::new(LocalCachePlugin::new()));

        for webhook in &settings.plugin.webhooks {
            let plugin = WebhookCachePlugin::new(&webhook.name, &webhook.endpoint)?;
            registry.register(Arc::new(plugin));
        }

        Ok(registry)
    }

    /// 注册适配器，名称重复时覆盖旧适配器
    ///
    /// # 参数
    /// * `plugin` - 适配器实例
    pub fn register(&self, plugin: Arc<dyn CachePlugin>) {
        let name = plugin.name().to_string();
        let mut plugins = self.plugins.write().unwrap();
        if plugins.insert(name.clone(), plugin).is_some() {
            info!("缓存插件被覆盖注册: {}", name);
        } else {
            info!("缓存插件注册成功: {}", name);
        }
    }

    /// 按名称解析适配器
    ///
    /// # 参数
    /// * `name` - 插件名称
    ///
    /// # 返回
    /// * `Result<Arc<dyn CachePlugin>, PluginError>` - 适配器或 `NotFound`
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn CachePlugin>, PluginError> {
        let plugins = self.plugins.read().unwrap();
        plugins
            .get(name)
            .cloned()
            .ok_or_else(|| PluginError::NotFound {
                name: name.to_string(),
            })
    }

    /// 返回已注册的插件名称列表，按名称排序
    pub fn names(&self) -> Vec<String> {
        let plugins = self.plugins.read().unwrap();
        let mut names: Vec<String> = plugins.keys().cloned().collect();
        names.sort();
        names
    }
}
