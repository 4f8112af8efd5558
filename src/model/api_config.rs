//! API配置数据结构
//!
//! 定义API配置实体、参数描述和发布状态枚举

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 配置发布状态枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigStatus {
    /// 未发布，路径查找不可见
    Draft,
    /// 已发布，路径查找可见
    Published,
}

impl std::fmt::Display for ConfigStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigStatus::Draft => write!(f, "未发布"),
            ConfigStatus::Published => write!(f, "已发布"),
        }
    }
}

impl ConfigStatus {
    /// 判断配置是否对路径查找可见
    pub fn is_published(&self) -> bool {
        matches!(self, ConfigStatus::Published)
    }
}

/// 参数类型
///
/// 标量类型按原样存储；集合类型以 `Array<元素类型>` 的形式存储
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ParamType {
    /// 标量类型，如 `Int`、`String`
    Scalar(String),
    /// 集合类型，持有元素类型标签
    Array(String),
}

impl From<String> for ParamType {
    fn from(raw: String) -> Self {
        match raw
            .strip_prefix("Array<")
            .and_then(|rest| rest.strip_suffix('>'))
        {
            Some(element) => ParamType::Array(element.to_string()),
            None => ParamType::Scalar(raw),
        }
    }
}

impl From<ParamType> for String {
    fn from(value: ParamType) -> Self {
        value.to_string()
    }
}

impl std::fmt::Display for ParamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamType::Scalar(tag) => write!(f, "{}", tag),
            ParamType::Array(element) => write!(f, "Array<{}>", element),
        }
    }
}

impl ParamType {
    /// 生成接口文档中展示的类型标签
    ///
    /// 标量类型按原样展示，集合类型展示为 `元素类型数组`
    pub fn doc_label(&self) -> String {
        match self {
            ParamType::Scalar(tag) => tag.clone(),
            ParamType::Array(element) => format!("{}数组", element),
        }
    }
}

/// API请求参数描述
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiParam {
    /// 参数名称
    pub name: String,
    /// 参数类型
    #[serde(rename = "type")]
    pub param_type: ParamType,
    /// 参数说明
    pub note: String,
}

impl ApiParam {
    /// 创建新的参数描述
    pub fn new(name: impl Into<String>, param_type: ParamType, note: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            param_type,
            note: note.into(),
        }
    }
}

/// 二级结果缓存插件引用
///
/// `settings` 对本核心不透明，原样传递给插件适配器
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachePluginRef {
    /// 插件名称，用于在插件注册表中解析适配器
    pub name: String,
    /// 适配器私有设置
    #[serde(default)]
    pub settings: Option<serde_json::Value>,
}

impl CachePluginRef {
    /// 创建新的插件引用
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            settings: None,
        }
    }

    /// 设置适配器私有配置
    pub fn with_settings(mut self, settings: serde_json::Value) -> Self {
        self.settings = Some(settings);
        self
    }
}

/// API配置实体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// 配置ID，创建时分配，不可变
    pub id: String,
    /// 接口名称
    pub name: String,
    /// 请求路径，在所有未删除配置中唯一
    pub path: String,
    /// 接口备注
    pub note: String,
    /// 所属分组名称
    pub group_name: String,
    /// 数据源ID
    pub datasource_id: String,
    /// 参数化查询语句，本核心只存储不执行
    pub sql: String,
    /// 请求参数列表
    #[serde(default)]
    pub params: Vec<ApiParam>,
    /// 二级结果缓存插件（可选）
    pub cache_plugin: Option<CachePluginRef>,
    /// 发布状态
    pub status: ConfigStatus,
    /// 创建时间
    pub created_at: DateTime<Utc>,
    /// 更新时间
    pub updated_at: DateTime<Utc>,
}

impl ApiConfig {
    /// 从草稿内容创建新配置
    ///
    /// # 参数
    /// * `id` - 分配的配置ID
    /// * `draft` - 草稿内容
    ///
    /// # 返回
    /// * `Self` - 状态为未发布的新配置
    pub fn from_draft(id: impl Into<String>, draft: ApiConfigDraft) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: draft.name,
            path: draft.path,
            note: draft.note,
            group_name: draft.group_name,
            datasource_id: draft.datasource_id,
            sql: draft.sql,
            params: draft.params,
            cache_plugin: draft.cache_plugin,
            status: ConfigStatus::Draft,
            created_at: now,
            updated_at: now,
        }
    }

    /// 用草稿内容替换现有配置的字段
    ///
    /// 保留ID和创建时间，状态重置为未发布，更新时间刷新
    pub fn apply_draft(&self, draft: ApiConfigDraft) -> Self {
        Self {
            id: self.id.clone(),
            name: draft.name,
            path: draft.path,
            note: draft.note,
            group_name: draft.group_name,
            datasource_id: draft.datasource_id,
            sql: draft.sql,
            params: draft.params,
            cache_plugin: draft.cache_plugin,
            status: ConfigStatus::Draft,
            created_at: self.created_at,
            updated_at: Utc::now(),
        }
    }

    /// 切换发布状态，刷新更新时间
    pub fn with_status(&self, status: ConfigStatus) -> Self {
        let mut next = self.clone();
        next.status = status;
        next.updated_at = Utc::now();
        next
    }
}

/// API配置草稿
///
/// 调用方提交的配置内容，ID、状态和时间戳由生命周期控制器分配
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfigDraft {
    /// 接口名称
    pub name: String,
    /// 请求路径
    pub path: String,
    /// 接口备注
    #[serde(default)]
    pub note: String,
    /// 所属分组名称
    #[serde(default)]
    pub group_name: String,
    /// 数据源ID
    #[serde(default)]
    pub datasource_id: String,
    /// 参数化查询语句
    #[serde(default)]
    pub sql: String,
    /// 请求参数列表
    #[serde(default)]
    pub params: Vec<ApiParam>,
    /// 二级结果缓存插件（可选）
    pub cache_plugin: Option<CachePluginRef>,
}

impl ApiConfigDraft {
    /// 创建新的配置草稿
    ///
    /// # 参数
    /// * `name` - 接口名称
    /// * `path` - 请求路径
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            note: String::new(),
            group_name: String::new(),
            datasource_id: String::new(),
            sql: String::new(),
            params: Vec::new(),
            cache_plugin: None,
        }
    }

    /// 设置接口备注
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    /// 设置所属分组名称
    pub fn with_group(mut self, group_name: impl Into<String>) -> Self {
        self.group_name = group_name.into();
        self
    }

    /// 设置数据源和查询语句
    pub fn with_query(
        mut self,
        datasource_id: impl Into<String>,
        sql: impl Into<String>,
    ) -> Self {
        self.datasource_id = datasource_id.into();
        self.sql = sql.into();
        self
    }

    /// 设置请求参数列表
    pub fn with_params(mut self, params: Vec<ApiParam>) -> Self {
        self.params = params;
        self
    }

    /// 设置二级结果缓存插件
    pub fn with_cache_plugin(mut self, plugin: CachePluginRef) -> Self {
        self.cache_plugin = Some(plugin);
        self
    }
}

/// 按分组名称聚合的配置列表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiGroup {
    /// 分组名称
    pub name: String,
    /// 分组下的配置
    pub children: Vec<ApiConfig>,
}

/// 关键字搜索的目标字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchField {
    /// 按接口名称搜索
    Name,
    /// 按请求路径搜索
    Path,
    /// 按接口备注搜索
    Note,
}

impl SearchField {
    /// 从配置中取出被搜索的字段值
    pub fn value_of<'a>(&self, config: &'a ApiConfig) -> &'a str {
        match self {
            SearchField::Name => &config.name,
            SearchField::Path => &config.path,
            SearchField::Note => &config.note,
        }
    }
}
