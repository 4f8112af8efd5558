//! 接口文档生成器
//!
//! 把指定的配置渲染成Markdown格式的接口文档

use crate::error::Result;
use crate::model::ApiConfig;
use crate::store::ConfigStore;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// 导出时间戳的展示格式
const EXPORT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 接口文档生成器
///
/// 存储的只读消费者。按ID列表取出配置并渲染，渲染本身是
/// （配置列表, 导出时刻）的纯函数。
pub struct DocGenerator {
    /// 配置存储
    store: Arc<dyn ConfigStore>,
}

impl DocGenerator {
    /// 创建新的文档生成器
    ///
    /// # 参数
    /// * `store` - 配置存储
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self { store }
    }

    /// 导出指定配置的接口文档
    ///
    /// 结果保持请求顺序，无法解析的ID被静默跳过
    ///
    /// # 参数
    /// * `ids` - 配置ID列表
    ///
    /// # 返回
    /// * `Result<String>` - Markdown文档
    pub async fn export(&self, ids: &[String]) -> Result<String> {
        let configs = self.store.select_batch_ids(ids).await?;
        Ok(Self::render(&configs, Utc::now()))
    }

    /// 渲染接口文档
    ///
    /// # 参数
    /// * `configs` - 要渲染的配置列表
    /// * `exported_at` - 导出时刻，写入文档末尾的时间戳
    ///
    /// # 返回
    /// * `String` - Markdown文档
    pub fn render(configs: &[ApiConfig], exported_at: DateTime<Utc>) -> String {
        let mut doc = String::from("# 接口文档\n---\n");

        for config in configs {
            doc.push_str("## ");
            doc.push_str(&config.name);
            doc.push_str("\n- 接口地址： /api/");
            doc.push_str(&config.path);
            doc.push_str("\n- 接口备注：");
            doc.push_str(&config.note);
            doc.push_str("\n- 请求参数：");

            if config.params.is_empty() {
                doc.push_str("无参数\n");
            } else {
                doc.push_str("\n\n| 参数名称 | 参数类型 | 参数说明 |\n");
                doc.push_str("| :----: | :----: | :----: |\n");
                for param in &config.params {
                    doc.push('|');
                    doc.push_str(&param.name);
                    doc.push('|');
                    doc.push_str(&param.param_type.doc_label());
                    doc.push('|');
                    doc.push_str(&param.note);
                    doc.push_str("|\n");
                }
            }

            doc.push_str("\n---\n");
        }

        doc.push_str("\n导出日期：");
        doc.push_str(&exported_at.format(EXPORT_TIME_FORMAT).to_string());
        doc
    }
}
