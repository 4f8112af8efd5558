//! Webhook缓存插件
//!
//! 通过HTTP回调通知远端缓存服务丢弃指定配置的结果

use crate::model::ApiConfig;
use crate::plugin::cache_plugin::CachePlugin;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, error, info};

/// Webhook缓存插件
///
/// 远端缓存服务（如独立部署的Redis代理）暴露一个清理回调地址，
/// `clean` 把配置标识POST过去，由远端完成实际的结果丢弃。
pub struct WebhookCachePlugin {
    /// 插件名称
    name: String,
    /// HTTP客户端
    client: Client,
    /// 清理回调地址
    endpoint: String,
}

impl WebhookCachePlugin {
    /// 创建新的Webhook缓存插件
    ///
    /// # 参数
    /// * `name` - 插件名称
    /// * `endpoint` - 清理回调地址
    ///
    /// # 返回
    /// * `Result<Self>` - 插件实例
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("创建HTTP客户端失败")?;

        Ok(Self {
            name: name.into(),
            client,
            endpoint: endpoint.into(),
        })
    }

    /// 构建清理请求体
    fn build_clean_body(&self, config: &ApiConfig) -> Value {
        json!({
            "api_id": config.id,
            "path": config.path,
            "settings": config
                .cache_plugin
                .as_ref()
                .and_then(|plugin| plugin.settings.clone()),
        })
    }
}

#[async_trait]
impl CachePlugin for WebhookCachePlugin {
    fn name(&self) -> &str {
        &self.name
    }

    async fn clean(&self, config: &ApiConfig) -> Result<()> {
        debug!("发送缓存清理请求: {} -> {}", config.id, self.endpoint);

        let body = self.build_clean_body(config);
        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .context("发送缓存清理请求失败")?;

        if response.status().is_success() {
            info!("远端缓存清理成功: 配置 {}", config.id);
            Ok(())
        } else {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            error!("远端缓存清理失败: {} - {}", status, text);
            Err(anyhow::anyhow!("远端缓存清理失败: {}", status))
        }
    }
}
