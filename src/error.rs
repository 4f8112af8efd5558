//! 错误处理模块
//!
//! 定义应用程序的统一错误类型

use thiserror::Error;

/// Api Config Center 应用程序的主要错误类型
#[derive(Error, Debug)]
pub enum ConfigCenterError {
    /// 存储相关错误
    #[error("存储错误: {0}")]
    Store(#[from] StoreError),

    /// 缓存插件相关错误
    #[error("缓存插件错误: {0}")]
    Plugin(#[from] PluginError),

    /// 设置相关错误
    #[error("设置错误: {0}")]
    Settings(#[from] SettingsError),

    /// IO错误
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    /// JSON序列化/反序列化错误
    #[error("JSON错误: {0}")]
    Json(#[from] serde_json::Error),

    /// 其他错误
    #[error("其他错误: {0}")]
    Other(#[from] anyhow::Error),
}

/// 存储错误类型
#[derive(Error, Debug)]
pub enum StoreError {
    /// 路径已被其他配置占用
    #[error("该路径已被使用，请修改请求路径再保存: {path}")]
    PathConflict { path: String },

    /// 目标配置不存在
    #[error("配置不存在: {id}")]
    NotFound { id: String },
}

/// 缓存插件错误类型
#[derive(Error, Debug)]
pub enum PluginError {
    /// 插件未注册
    #[error("缓存插件未注册: {name}")]
    NotFound { name: String },

    /// 插件清理失败
    #[error("缓存插件清理失败: {name}: {reason}")]
    CleanFailed { name: String, reason: String },

    /// 插件清理超时
    #[error("缓存插件清理超时: {name} ({seconds}秒)")]
    Timeout { name: String, seconds: u64 },
}

/// 设置错误类型
#[derive(Error, Debug)]
pub enum SettingsError {
    /// 设置文件解析错误
    #[error("设置文件解析失败: {0}")]
    ParseError(String),

    /// 设置验证错误
    #[error("设置验证失败: {0}")]
    ValidationError(String),

    /// 设置文件不存在
    #[error("设置文件不存在: {path}")]
    FileNotFound { path: String },

    /// 环境变量替换错误
    #[error("环境变量替换失败: {var}")]
    EnvVarError { var: String },
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, ConfigCenterError>;

impl ConfigCenterError {
    /// 判断是否为路径冲突错误
    pub fn is_path_conflict(&self) -> bool {
        matches!(self, ConfigCenterError::Store(StoreError::PathConflict { .. }))
    }

    /// 判断是否为配置不存在错误
    pub fn is_not_found(&self) -> bool {
        matches!(self, ConfigCenterError::Store(StoreError::NotFound { .. }))
    }
}
