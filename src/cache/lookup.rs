//! 路径查找缓存实现
//!
//! 请求分发热路径上使用的路径到已发布配置的映射缓存

use crate::model::ApiConfig;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// 查找缓存统计信息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupCacheStats {
    /// 命中次数
    pub hits: u64,
    /// 未命中次数
    pub misses: u64,
    /// 逐出次数
    pub evictions: u64,
}

/// 路径查找缓存
///
/// 只缓存正向结果：缓存项的填充由生命周期控制器在查到已发布配置后
/// 显式调用 `put` 完成，未命中永远不会被缓存，逐出由每次配置变更
/// 显式触发。单键操作原子，键之间无互相锁定。
#[derive(Debug, Default)]
pub struct LookupCache {
    /// 路径到已发布配置的映射
    entries: RwLock<HashMap<String, ApiConfig>>,
    /// 命中计数
    hits: AtomicU64,
    /// 未命中计数
    misses: AtomicU64,
    /// 逐出计数
    evictions: AtomicU64,
}

impl LookupCache {
    /// 创建空的查找缓存
    pub fn new() -> Self {
        Self::default()
    }

    /// 按路径查询缓存项
    ///
    /// # 参数
    /// * `path` - 请求路径
    ///
    /// # 返回
    /// * `Option<ApiConfig>` - 命中的配置，未命中返回 `None`
    pub async fn get(&self, path: &str) -> Option<ApiConfig> {
        let entries = self.entries.read().await;
        match entries.get(path) {
            Some(config) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(config.clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// 写入缓存项
    ///
    /// # 参数
    /// * `path` - 请求路径
    /// * `config` - 已发布的配置
    pub async fn put(&self, path: &str, config: ApiConfig) {
        let mut entries = self.entries.write().await;
        entries.insert(path.to_string(), config);
    }

    /// 逐出缓存项
    ///
    /// 路径不在缓存中时为空操作
    pub async fn evict(&self, path: &str) {
        let mut entries = self.entries.write().await;
        if entries.remove(path).is_some() {
            self.evictions.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// 返回当前缓存项数量
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// 判断缓存是否为空
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// 返回统计信息快照
    pub fn stats(&self) -> LookupCacheStats {
        LookupCacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}
