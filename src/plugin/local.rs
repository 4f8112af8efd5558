//! 进程内结果缓存插件
//!
//! 按配置ID隔离的本地查询结果缓存适配器

use crate::model::ApiConfig;
use crate::plugin::cache_plugin::CachePlugin;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// 本地结果缓存插件
///
/// 结果按配置ID分桶存储，`clean` 丢弃整个桶。适配器内部不做容量
/// 控制，生命周期完全跟随配置变更。
#[derive(Debug, Default)]
pub struct LocalCachePlugin {
    /// 配置ID到结果桶的映射，桶内键为请求参数指纹
    buckets: RwLock<HashMap<String, HashMap<String, serde_json::Value>>>,
}

impl LocalCachePlugin {
    /// 创建空的本地结果缓存
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入一条查询结果
    ///
    /// # 参数
    /// * `config_id` - 结果所属的配置ID
    /// * `key` - 请求参数指纹
    /// * `value` - 查询结果
    pub async fn put_result(&self, config_id: &str, key: &str, value: serde_json::Value) {
        let mut buckets = self.buckets.write().await;
        buckets
            .entry(config_id.to_string())
            .or_default()
            .insert(key.to_string(), value);
    }

    /// 读取一条查询结果
    pub async fn get_result(&self, config_id: &str, key: &str) -> Option<serde_json::Value> {
        let buckets = self.buckets.read().await;
        buckets
            .get(config_id)
            .and_then(|bucket| bucket.get(key))
            .cloned()
    }

    /// 返回指定配置名下缓存的结果数量
    pub async fn result_count(&self, config_id: &str) -> usize {
        let buckets = self.buckets.read().await;
        buckets.get(config_id).map_or(0, |bucket| bucket.len())
    }
}

#[async_trait]
impl CachePlugin for LocalCachePlugin {
    fn name(&self) -> &str {
        "local"
    }

    async fn clean(&self, config: &ApiConfig) -> Result<()> {
        let mut buckets = self.buckets.write().await;
        let removed = buckets.remove(&config.id).map_or(0, |bucket| bucket.len());
        debug!("清理本地结果缓存: 配置 {} 共 {} 条", config.id, removed);
        Ok(())
    }
}
