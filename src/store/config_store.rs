//! 配置存储trait定义
//!
//! 约定配置持久化层的统一接口

use crate::error::Result;
use crate::model::{ApiConfig, ApiGroup, SearchField};
use async_trait::async_trait;

/// 配置存储trait，定义配置持久化接口
///
/// 存储层必须把路径唯一性作为原子约束来实施：`insert` 和 `update_by_id`
/// 在发现路径被其他配置占用时直接拒绝写入并返回
/// [`StoreError::PathConflict`](crate::error::StoreError::PathConflict)。
/// 控制器的计数预检查只用于提前给出友好错误，不是唯一性的实施手段。
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// 插入新配置
    ///
    /// # 参数
    /// * `config` - 待插入的配置
    ///
    /// # 返回
    /// * `Result<()>` - 路径被占用时返回 `PathConflict`
    async fn insert(&self, config: ApiConfig) -> Result<()>;

    /// 按ID整体更新配置
    ///
    /// # 参数
    /// * `config` - 新的配置内容，ID定位被更新的记录
    ///
    /// # 返回
    /// * `Result<()>` - 记录不存在返回 `NotFound`，新路径被占用返回 `PathConflict`
    async fn update_by_id(&self, config: ApiConfig) -> Result<()>;

    /// 按ID删除配置
    async fn delete_by_id(&self, id: &str) -> Result<()>;

    /// 按ID查询配置
    async fn select_by_id(&self, id: &str) -> Result<Option<ApiConfig>>;

    /// 查询全部配置，按创建时间排序
    async fn select_list(&self) -> Result<Vec<ApiConfig>>;

    /// 按关键字搜索配置
    ///
    /// # 参数
    /// * `keyword` - 搜索关键字，子串匹配
    /// * `field` - 被搜索的字段
    /// * `group_name` - 限定分组，`None` 表示不限定
    async fn select_by_keyword(
        &self,
        keyword: &str,
        field: SearchField,
        group_name: Option<&str>,
    ) -> Result<Vec<ApiConfig>>;

    /// 按ID列表批量查询
    ///
    /// 结果保持请求顺序，无法解析的ID被跳过
    async fn select_batch_ids(&self, ids: &[String]) -> Result<Vec<ApiConfig>>;

    /// 按路径查询已发布的配置
    ///
    /// 未发布或不存在的路径返回 `None`
    async fn select_by_path_published(&self, path: &str) -> Result<Option<ApiConfig>>;

    /// 统计持有该路径的配置数量
    async fn count_by_path(&self, path: &str) -> Result<usize>;

    /// 统计持有该路径且ID不同的配置数量，用于更新前的预检查
    async fn count_by_path_excluding(&self, path: &str, id: &str) -> Result<usize>;

    /// 查询全部配置并按分组名称聚合
    ///
    /// 分组按名称排序，组内按创建时间排序
    async fn all_grouped_by_group_name(&self) -> Result<Vec<ApiGroup>>;
}
