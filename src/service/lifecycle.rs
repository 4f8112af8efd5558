//! 配置生命周期控制器
//!
//! 编排配置的新增、更新、删除、发布、下线以及路径查找，
//! 是唯一允许变更配置存储的组件

use crate::cache::LookupCache;
use crate::error::{Result, StoreError};
use crate::model::{ApiConfig, ApiConfigDraft, ApiGroup, ConfigStatus, SearchField};
use crate::plugin::CachePluginRegistry;
use crate::service::idgen::{IdGenerator, UuidIdGenerator};
use crate::store::ConfigStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// 默认的插件清理超时时间（秒）
const DEFAULT_CLEAN_TIMEOUT_SECONDS: u64 = 5;

/// 配置生命周期控制器
///
/// 每个变更操作先在存储层原子完成，随后才执行查找缓存逐出和
/// 尽力而为的插件清理。插件侧的任何失败只被记录，绝不导致已
/// 提交的存储变更回滚。
pub struct ApiConfigService {
    /// 配置存储
    store: Arc<dyn ConfigStore>,
    /// 路径查找缓存
    lookup_cache: Arc<LookupCache>,
    /// 缓存插件注册表
    plugins: Arc<CachePluginRegistry>,
    /// ID生成器
    id_generator: Arc<dyn IdGenerator>,
    /// 插件清理超时时间
    clean_timeout: Duration,
}

impl ApiConfigService {
    /// 创建新的生命周期控制器
    ///
    /// # 参数
    /// * `store` - 配置存储
    /// * `plugins` - 缓存插件注册表
    ///
    /// # 返回
    /// * `Self` - 控制器实例，使用UUID生成器和默认清理超时
    pub fn new(store: Arc<dyn ConfigStore>, plugins: Arc<CachePluginRegistry>) -> Self {
        Self {
            store,
            lookup_cache: Arc::new(LookupCache::new()),
            plugins,
            id_generator: Arc::new(UuidIdGenerator),
            clean_timeout: Duration::from_secs(DEFAULT_CLEAN_TIMEOUT_SECONDS),
        }
    }

    /// 根据设置创建生命周期控制器
    ///
    /// 插件清理超时时间取自设置
    pub fn from_settings(
        store: Arc<dyn ConfigStore>,
        plugins: Arc<CachePluginRegistry>,
        settings: &crate::settings::Settings,
    ) -> Self {
        Self::new(store, plugins)
            .with_clean_timeout(Duration::from_secs(settings.plugin.clean_timeout_seconds))
    }

    /// 设置插件清理超时时间
    pub fn with_clean_timeout(mut self, timeout: Duration) -> Self {
        self.clean_timeout = timeout;
        self
    }

    /// 替换ID生成器
    pub fn with_id_generator(mut self, id_generator: Arc<dyn IdGenerator>) -> Self {
        self.id_generator = id_generator;
        self
    }

    /// 返回路径查找缓存，供监控读取统计信息
    pub fn lookup_cache(&self) -> &LookupCache {
        &self.lookup_cache
    }

    /// 新增配置
    ///
    /// 新配置分配ID、状态为未发布。路径被占用时返回 `PathConflict`。
    /// 新配置从未进入过查找缓存，无需逐出。
    ///
    /// # 参数
    /// * `draft` - 配置草稿
    ///
    /// # 返回
    /// * `Result<ApiConfig>` - 持久化后的配置
    pub async fn add(&self, draft: ApiConfigDraft) -> Result<ApiConfig> {
        // 预检查只为提前给出友好错误，唯一性由存储层原子约束兜底
        if self.store.count_by_path(&draft.path).await? > 0 {
            return Err(StoreError::PathConflict { path: draft.path }.into());
        }

        let config = ApiConfig::from_draft(self.id_generator.next_id(), draft);
        self.store.insert(config.clone()).await?;

        info!("新增API配置成功: {} ({})", config.name, config.path);
        Ok(config)
    }

    /// 更新配置
    ///
    /// 字段整体替换，状态重置为未发布。路径变更时新旧两个路径的
    /// 查找缓存都会被逐出，避免改名后旧路径残留脏缓存项；若旧记录
    /// 配置了二级缓存插件，以旧记录为准尽力清理其结果缓存。
    ///
    /// # 参数
    /// * `id` - 被更新的配置ID
    /// * `draft` - 新的配置内容
    ///
    /// # 返回
    /// * `Result<ApiConfig>` - 更新后的配置
    pub async fn update(&self, id: &str, draft: ApiConfigDraft) -> Result<ApiConfig> {
        if self.store.count_by_path_excluding(&draft.path, id).await? > 0 {
            return Err(StoreError::PathConflict { path: draft.path }.into());
        }

        let old = self
            .store
            .select_by_id(id)
            .await?
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;

        let updated = old.apply_draft(draft);
        self.store.update_by_id(updated.clone()).await?;

        // 存储变更提交后的缓存副作用
        self.lookup_cache.evict(&old.path).await;
        if updated.path != old.path {
            self.lookup_cache.evict(&updated.path).await;
        }
        self.clean_plugin_cache(&old, "更新").await;

        info!("更新API配置成功: {} ({})", updated.name, updated.path);
        Ok(updated)
    }

    /// 删除配置
    ///
    /// 删除是终态操作，记录被整体移除，路径随之释放
    ///
    /// # 参数
    /// * `id` - 被删除的配置ID
    pub async fn delete(&self, id: &str) -> Result<()> {
        let old = self
            .store
            .select_by_id(id)
            .await?
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;

        self.store.delete_by_id(id).await?;

        self.lookup_cache.evict(&old.path).await;
        self.clean_plugin_cache(&old, "删除").await;

        info!("删除API配置成功: {} ({})", old.name, old.path);
        Ok(())
    }

    /// 发布配置
    ///
    /// 发布后配置对路径查找可见。逐出该路径的查找缓存，
    /// 使下一次查找重新读到已发布的记录。
    ///
    /// # 参数
    /// * `id` - 被发布的配置ID
    ///
    /// # 返回
    /// * `Result<ApiConfig>` - 发布后的配置
    pub async fn publish(&self, id: &str) -> Result<ApiConfig> {
        let record = self
            .store
            .select_by_id(id)
            .await?
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;

        let published = record.with_status(ConfigStatus::Published);
        self.store.update_by_id(published.clone()).await?;

        self.lookup_cache.evict(&published.path).await;

        info!("发布API配置成功: {} ({})", published.name, published.path);
        Ok(published)
    }

    /// 下线配置
    ///
    /// 下线后配置对路径查找不可见；此前替该配置缓存的计算结果
    /// 不再可用，尽力通知插件清理。
    ///
    /// # 参数
    /// * `id` - 被下线的配置ID
    ///
    /// # 返回
    /// * `Result<ApiConfig>` - 下线后的配置
    pub async fn unpublish(&self, id: &str) -> Result<ApiConfig> {
        let record = self
            .store
            .select_by_id(id)
            .await?
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;

        let offline = record.with_status(ConfigStatus::Draft);
        self.store.update_by_id(offline.clone()).await?;

        self.lookup_cache.evict(&offline.path).await;
        self.clean_plugin_cache(&offline, "下线").await;

        info!("下线API配置成功: {} ({})", offline.name, offline.path);
        Ok(offline)
    }

    /// 按路径查找已发布的配置
    ///
    /// 请求分发热路径。缓存未命中时回源查询已发布记录，查到后
    /// 填充缓存；查不到时不缓存空结果，后续查找继续回源，
    /// 直到该路径发布为止。
    ///
    /// # 参数
    /// * `path` - 请求路径
    ///
    /// # 返回
    /// * `Result<Option<ApiConfig>>` - 已发布的配置，未发布或不存在返回 `None`
    pub async fn get_config(&self, path: &str) -> Result<Option<ApiConfig>> {
        if let Some(hit) = self.lookup_cache.get(path).await {
            return Ok(Some(hit));
        }

        match self.store.select_by_path_published(path).await? {
            Some(config) => {
                self.lookup_cache.put(path, config.clone()).await;
                debug!("路径查找回源成功并填充缓存: {}", path);
                Ok(Some(config))
            }
            None => Ok(None),
        }
    }

    /// 查询配置详情
    ///
    /// # 参数
    /// * `id` - 配置ID
    ///
    /// # 返回
    /// * `Result<ApiConfig>` - 配置，不存在返回 `NotFound`
    pub async fn detail(&self, id: &str) -> Result<ApiConfig> {
        self.store
            .select_by_id(id)
            .await?
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() }.into())
    }

    /// 查询配置的请求路径
    pub async fn path_of(&self, id: &str) -> Result<String> {
        Ok(self.detail(id).await?.path)
    }

    /// 查询全部配置
    pub async fn list(&self) -> Result<Vec<ApiConfig>> {
        self.store.select_list().await
    }

    /// 按关键字搜索配置
    ///
    /// # 参数
    /// * `keyword` - 搜索关键字
    /// * `field` - 被搜索的字段
    /// * `group_name` - 限定分组，`None` 表示不限定
    pub async fn search(
        &self,
        keyword: &str,
        field: SearchField,
        group_name: Option<&str>,
    ) -> Result<Vec<ApiConfig>> {
        self.store
            .select_by_keyword(keyword, field, group_name)
            .await
    }

    /// 按ID列表批量查询配置
    pub async fn select_batch(&self, ids: &[String]) -> Result<Vec<ApiConfig>> {
        self.store.select_batch_ids(ids).await
    }

    /// 查询全部配置并按分组聚合
    pub async fn grouped(&self) -> Result<Vec<ApiGroup>> {
        self.store.all_grouped_by_group_name().await
    }

    /// 尽力清理配置名下的二级结果缓存
    ///
    /// 插件解析失败、清理失败或超时都只记录日志，绝不向调用方
    /// 传播，也绝不影响已提交的存储变更
    async fn clean_plugin_cache(&self, config: &ApiConfig, action: &str) {
        let Some(plugin_ref) = config.cache_plugin.as_ref() else {
            return;
        };

        let plugin = match self.plugins.resolve(&plugin_ref.name) {
            Ok(plugin) => plugin,
            Err(e) => {
                warn!("{}配置后清理结果缓存跳过: {}", action, e);
                return;
            }
        };

        match tokio::time::timeout(self.clean_timeout, plugin.clean(config)).await {
            Ok(Ok(())) => {
                debug!("{}配置后清理结果缓存完成: {}", action, config.id);
            }
            Ok(Err(e)) => {
                error!("{}配置后清理结果缓存失败: {}: {}", action, config.id, e);
            }
            Err(_) => {
                error!(
                    "{}配置后清理结果缓存超时: {} ({}秒)",
                    action,
                    config.id,
                    self.clean_timeout.as_secs()
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ApiParam, CachePluginRef, ParamType};
    use crate::plugin::CachePlugin;
    use crate::store::MemoryConfigStore;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// 记录清理调用的测试插件
    struct RecordingPlugin {
        cleaned: Mutex<Vec<String>>,
    }

    impl RecordingPlugin {
        fn new() -> Self {
            Self {
                cleaned: Mutex::new(Vec::new()),
            }
        }

        fn cleaned_paths(&self) -> Vec<String> {
            self.cleaned.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CachePlugin for RecordingPlugin {
        fn name(&self) -> &str {
            "recording"
        }

        async fn clean(&self, config: &ApiConfig) -> anyhow::Result<()> {
            self.cleaned.lock().unwrap().push(config.path.clone());
            Ok(())
        }
    }

    /// 清理总是失败的测试插件
    struct FailingPlugin;

    #[async_trait]
    impl CachePlugin for FailingPlugin {
        fn name(&self) -> &str {
            "failing"
        }

        async fn clean(&self, _config: &ApiConfig) -> anyhow::Result<()> {
            Err(anyhow::anyhow!("连接远端缓存失败"))
        }
    }

    /// 清理耗时超长的测试插件
    struct SlowPlugin;

    #[async_trait]
    impl CachePlugin for SlowPlugin {
        fn name(&self) -> &str {
            "slow"
        }

        async fn clean(&self, _config: &ApiConfig) -> anyhow::Result<()> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        }
    }

    fn create_service() -> ApiConfigService {
        ApiConfigService::new(
            Arc::new(MemoryConfigStore::new()),
            Arc::new(CachePluginRegistry::new()),
        )
    }

    fn create_service_with_plugin(plugin: Arc<dyn CachePlugin>) -> ApiConfigService {
        let registry = CachePluginRegistry::new();
        registry.register(plugin);
        ApiConfigService::new(Arc::new(MemoryConfigStore::new()), Arc::new(registry))
    }

    fn create_test_draft(path: &str) -> ApiConfigDraft {
        ApiConfigDraft::new("查询用户", path)
            .with_note("按ID查询用户")
            .with_group("用户服务")
            .with_query("ds-1", "select * from t_user where id = #{id}")
            .with_params(vec![ApiParam::new(
                "id",
                ParamType::Scalar("Int".to_string()),
                "用户ID",
            )])
    }

    fn create_plugin_draft(path: &str, plugin_name: &str) -> ApiConfigDraft {
        create_test_draft(path).with_cache_plugin(CachePluginRef::new(plugin_name))
    }

    #[tokio::test]
    async fn test_add_assigns_id_and_draft_status() {
        let service = create_service();

        let config = service.add(create_test_draft("user/get")).await.unwrap();

        assert!(!config.id.is_empty());
        assert_eq!(config.status, ConfigStatus::Draft);
        assert_eq!(service.detail(&config.id).await.unwrap().path, "user/get");
    }

    #[tokio::test]
    async fn test_add_duplicate_path_fails_without_second_record() {
        let service = create_service();
        service.add(create_test_draft("user/get")).await.unwrap();

        let result = service.add(create_test_draft("user/get")).await;

        assert!(result.unwrap_err().is_path_conflict());
        assert_eq!(service.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_config_never_returns_draft() {
        let service = create_service();
        service.add(create_test_draft("user/get")).await.unwrap();

        assert!(service.get_config("user/get").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_publish_makes_config_visible() {
        let service = create_service();
        let config = service.add(create_test_draft("user/get")).await.unwrap();

        service.publish(&config.id).await.unwrap();

        let found = service.get_config("user/get").await.unwrap();
        assert_eq!(found.unwrap().status, ConfigStatus::Published);
    }

    #[tokio::test]
    async fn test_miss_is_never_cached() {
        let service = create_service();
        let config = service.add(create_test_draft("user/get")).await.unwrap();

        // 发布前的多次未命中不会留下负缓存
        assert!(service.get_config("user/get").await.unwrap().is_none());
        assert!(service.get_config("user/get").await.unwrap().is_none());
        assert!(service.lookup_cache().is_empty().await);

        // 发布后下一次查找立即可见
        service.publish(&config.id).await.unwrap();
        assert!(service.get_config("user/get").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_update_rename_evicts_both_paths() {
        let service = create_service();
        let config = service.add(create_test_draft("user/get")).await.unwrap();
        service.publish(&config.id).await.unwrap();

        // 预热旧路径的缓存项
        assert!(service.get_config("user/get").await.unwrap().is_some());
        assert_eq!(service.lookup_cache().len().await, 1);

        let updated = service
            .update(&config.id, create_test_draft("user/get/v2"))
            .await
            .unwrap();

        // 旧路径的缓存项已被逐出，不再可达
        assert!(service.lookup_cache().is_empty().await);
        assert!(service.get_config("user/get").await.unwrap().is_none());

        // 更新把状态重置为未发布，重新发布后新路径可见
        assert!(service.get_config("user/get/v2").await.unwrap().is_none());
        service.publish(&updated.id).await.unwrap();
        let found = service.get_config("user/get/v2").await.unwrap().unwrap();
        assert_eq!(found.id, config.id);
    }

    #[tokio::test]
    async fn test_update_path_conflict_keeps_record() {
        let service = create_service();
        service.add(create_test_draft("user/get")).await.unwrap();
        let other = service.add(create_test_draft("user/list")).await.unwrap();

        let result = service
            .update(&other.id, create_test_draft("user/get"))
            .await;

        assert!(result.unwrap_err().is_path_conflict());
        assert_eq!(service.detail(&other.id).await.unwrap().path, "user/list");
    }

    #[tokio::test]
    async fn test_update_nonexistent_returns_not_found() {
        let service = create_service();

        let result = service.update("ghost", create_test_draft("x/y")).await;

        assert!(result.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_delete_removes_record_and_cache_entry() {
        let service = create_service();
        let config = service.add(create_test_draft("user/get")).await.unwrap();
        service.publish(&config.id).await.unwrap();
        assert!(service.get_config("user/get").await.unwrap().is_some());

        service.delete(&config.id).await.unwrap();

        assert!(service.detail(&config.id).await.unwrap_err().is_not_found());
        assert!(service.lookup_cache().is_empty().await);
        assert!(service.get_config("user/get").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_nonexistent_returns_not_found() {
        let service = create_service();
        assert!(service.delete("ghost").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_unpublish_hides_config_and_cleans_plugin() {
        let plugin = Arc::new(RecordingPlugin::new());
        let service = create_service_with_plugin(plugin.clone());

        let config = service
            .add(create_plugin_draft("user/get", "recording"))
            .await
            .unwrap();
        service.publish(&config.id).await.unwrap();
        assert!(service.get_config("user/get").await.unwrap().is_some());

        service.unpublish(&config.id).await.unwrap();

        assert!(service.get_config("user/get").await.unwrap().is_none());
        assert_eq!(plugin.cleaned_paths(), vec!["user/get".to_string()]);
    }

    #[tokio::test]
    async fn test_update_cleans_plugin_with_old_record() {
        let plugin = Arc::new(RecordingPlugin::new());
        let service = create_service_with_plugin(plugin.clone());

        let config = service
            .add(create_plugin_draft("user/get", "recording"))
            .await
            .unwrap();

        service
            .update(&config.id, create_plugin_draft("user/get/v2", "recording"))
            .await
            .unwrap();

        // 清理以旧记录为准，收到的是改名前的路径
        assert_eq!(plugin.cleaned_paths(), vec!["user/get".to_string()]);
    }

    #[tokio::test]
    async fn test_delete_cleans_plugin() {
        let plugin = Arc::new(RecordingPlugin::new());
        let service = create_service_with_plugin(plugin.clone());

        let config = service
            .add(create_plugin_draft("user/get", "recording"))
            .await
            .unwrap();
        service.delete(&config.id).await.unwrap();

        assert_eq!(plugin.cleaned_paths(), vec!["user/get".to_string()]);
    }

    #[tokio::test]
    async fn test_plugin_failure_does_not_fail_mutation() {
        let service = create_service_with_plugin(Arc::new(FailingPlugin));

        let config = service
            .add(create_plugin_draft("user/get", "failing"))
            .await
            .unwrap();

        // 插件清理失败不影响更新、下线和删除
        let updated = service
            .update(&config.id, create_plugin_draft("user/get/v2", "failing"))
            .await;
        assert!(updated.is_ok());

        assert!(service.unpublish(&config.id).await.is_ok());
        assert!(service.delete(&config.id).await.is_ok());
        assert!(service.detail(&config.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_unresolved_plugin_does_not_fail_mutation() {
        let service = create_service();

        let config = service
            .add(create_plugin_draft("user/get", "ghost-plugin"))
            .await
            .unwrap();

        assert!(service.delete(&config.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_slow_plugin_is_bounded_by_timeout() {
        let registry = CachePluginRegistry::new();
        registry.register(Arc::new(SlowPlugin));
        let service = ApiConfigService::new(
            Arc::new(MemoryConfigStore::new()),
            Arc::new(registry),
        )
        .with_clean_timeout(Duration::from_millis(50));

        let config = service
            .add(create_plugin_draft("user/get", "slow"))
            .await
            .unwrap();

        // 超时后操作照常完成，存储变更已提交
        service.delete(&config.id).await.unwrap();
        assert!(service.detail(&config.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_publish_does_not_clean_plugin() {
        let plugin = Arc::new(RecordingPlugin::new());
        let service = create_service_with_plugin(plugin.clone());

        let config = service
            .add(create_plugin_draft("user/get", "recording"))
            .await
            .unwrap();
        service.publish(&config.id).await.unwrap();

        assert!(plugin.cleaned_paths().is_empty());
    }

    #[tokio::test]
    async fn test_from_settings_uses_configured_timeout() {
        let mut settings = crate::settings::Settings::default();
        settings.plugin.clean_timeout_seconds = 1;

        let service = ApiConfigService::from_settings(
            Arc::new(MemoryConfigStore::new()),
            Arc::new(CachePluginRegistry::new()),
            &settings,
        );

        assert_eq!(service.clean_timeout, Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_path_of_and_detail() {
        let service = create_service();
        let config = service.add(create_test_draft("user/get")).await.unwrap();

        assert_eq!(service.path_of(&config.id).await.unwrap(), "user/get");
        assert!(service.path_of("ghost").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_search_and_grouped() {
        let service = create_service();
        service.add(create_test_draft("user/get")).await.unwrap();
        service
            .add(ApiConfigDraft::new("订单列表", "order/list").with_group("订单服务"))
            .await
            .unwrap();

        let hits = service
            .search("user", SearchField::Path, None)
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);

        let groups = service.grouped().await.unwrap();
        assert_eq!(groups.len(), 2);
    }
}
