//! 内存配置存储实现
//!
//! 基于HashMap和路径唯一索引的线程安全存储引擎

use crate::error::{Result, StoreError};
use crate::model::{ApiConfig, ApiGroup, SearchField};
use crate::store::config_store::ConfigStore;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// 存储内部状态
///
/// `path_index` 是路径到配置ID的唯一索引，与记录表在同一个写锁临界区内
/// 维护，任何违反路径唯一性的写入都会在临界区内被拒绝
#[derive(Debug, Default)]
struct Inner {
    /// 配置记录表，键为配置ID
    records: HashMap<String, ApiConfig>,
    /// 路径唯一索引，键为路径，值为持有该路径的配置ID
    path_index: HashMap<String, String>,
}

/// 内存配置存储
///
/// 每个变更调用在一个写锁临界区内原子完成，对应生命周期控制器
/// 每次操作的单事务语义
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    inner: RwLock<Inner>,
}

impl MemoryConfigStore {
    /// 创建空的内存存储
    pub fn new() -> Self {
        Self::default()
    }

    /// 返回当前记录数量
    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    /// 判断存储是否为空
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.records.is_empty()
    }
}

#[async_trait]
impl ConfigStore for MemoryConfigStore {
    async fn insert(&self, config: ApiConfig) -> Result<()> {
        let mut inner = self.inner.write().await;

        // 唯一索引检查与写入在同一临界区内，并发的重复插入会在这里被拒绝
        if inner.path_index.contains_key(&config.path) {
            return Err(StoreError::PathConflict {
                path: config.path.clone(),
            }
            .into());
        }

        inner
            .path_index
            .insert(config.path.clone(), config.id.clone());
        inner.records.insert(config.id.clone(), config);
        Ok(())
    }

    async fn update_by_id(&self, config: ApiConfig) -> Result<()> {
        let mut inner = self.inner.write().await;

        let old_path = match inner.records.get(&config.id) {
            Some(existing) => existing.path.clone(),
            None => {
                return Err(StoreError::NotFound {
                    id: config.id.clone(),
                }
                .into())
            }
        };

        // 新路径被其他配置占用时拒绝更新
        if let Some(holder) = inner.path_index.get(&config.path) {
            if holder != &config.id {
                return Err(StoreError::PathConflict {
                    path: config.path.clone(),
                }
                .into());
            }
        }

        if old_path != config.path {
            inner.path_index.remove(&old_path);
            inner
                .path_index
                .insert(config.path.clone(), config.id.clone());
        }
        inner.records.insert(config.id.clone(), config);
        Ok(())
    }

    async fn delete_by_id(&self, id: &str) -> Result<()> {
        let mut inner = self.inner.write().await;

        match inner.records.remove(id) {
            Some(removed) => {
                inner.path_index.remove(&removed.path);
                Ok(())
            }
            None => Err(StoreError::NotFound { id: id.to_string() }.into()),
        }
    }

    async fn select_by_id(&self, id: &str) -> Result<Option<ApiConfig>> {
        let inner = self.inner.read().await;
        Ok(inner.records.get(id).cloned())
    }

    async fn select_list(&self) -> Result<Vec<ApiConfig>> {
        let inner = self.inner.read().await;
        let mut list: Vec<ApiConfig> = inner.records.values().cloned().collect();
        list.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(list)
    }

    async fn select_by_keyword(
        &self,
        keyword: &str,
        field: SearchField,
        group_name: Option<&str>,
    ) -> Result<Vec<ApiConfig>> {
        let inner = self.inner.read().await;
        let mut list: Vec<ApiConfig> = inner
            .records
            .values()
            .filter(|config| field.value_of(config).contains(keyword))
            .filter(|config| group_name.is_none_or(|group| config.group_name == group))
            .cloned()
            .collect();
        list.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(list)
    }

    async fn select_batch_ids(&self, ids: &[String]) -> Result<Vec<ApiConfig>> {
        let inner = self.inner.read().await;
        // 保持请求顺序，跳过无法解析的ID
        Ok(ids
            .iter()
            .filter_map(|id| inner.records.get(id).cloned())
            .collect())
    }

    async fn select_by_path_published(&self, path: &str) -> Result<Option<ApiConfig>> {
        let inner = self.inner.read().await;
        let config = inner
            .path_index
            .get(path)
            .and_then(|id| inner.records.get(id))
            .filter(|config| config.status.is_published())
            .cloned();
        Ok(config)
    }

    async fn count_by_path(&self, path: &str) -> Result<usize> {
        let inner = self.inner.read().await;
        Ok(usize::from(inner.path_index.contains_key(path)))
    }

    async fn count_by_path_excluding(&self, path: &str, id: &str) -> Result<usize> {
        let inner = self.inner.read().await;
        Ok(usize::from(
            inner
                .path_index
                .get(path)
                .is_some_and(|holder| holder.as_str() != id),
        ))
    }

    async fn all_grouped_by_group_name(&self) -> Result<Vec<ApiGroup>> {
        let list = self.select_list().await?;

        let mut groups: HashMap<String, Vec<ApiConfig>> = HashMap::new();
        for config in list {
            groups
                .entry(config.group_name.clone())
                .or_default()
                .push(config);
        }

        let mut result: Vec<ApiGroup> = groups
            .into_iter()
            .map(|(name, children)| ApiGroup { name, children })
            .collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(result)
    }
}
