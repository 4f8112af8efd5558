//! 缓存插件trait定义
//!
//! 约定二级结果缓存适配器的清理能力

use crate::model::ApiConfig;
use anyhow::Result;
use async_trait::async_trait;

/// 二级结果缓存插件trait
///
/// 适配器替指定配置缓存查询结果；配置发生变更后，生命周期控制器
/// 通过 `clean` 通知适配器丢弃该配置名下的全部缓存结果。调用方
/// 把清理视为尽力而为：返回的错误只会被记录，不影响配置变更本身。
#[async_trait]
pub trait CachePlugin: Send + Sync {
    /// 插件名称，注册表按名称解析适配器
    fn name(&self) -> &str;

    /// 丢弃该配置名下缓存的全部结果
    ///
    /// # 参数
    /// * `config` - 发生变更的配置
    ///
    /// # 返回
    /// * `Result<()>` - 清理结果
    async fn clean(&self, config: &ApiConfig) -> Result<()>;
}

/// 空的缓存插件实现（用于测试或未部署二级缓存的场景）
pub struct NoOpCachePlugin;

#[async_trait]
impl CachePlugin for NoOpCachePlugin {
    fn name(&self) -> &str {
        "noop"
    }

    async fn clean(&self, _config: &ApiConfig) -> Result<()> {
        // 不执行任何操作
        Ok(())
    }
}
