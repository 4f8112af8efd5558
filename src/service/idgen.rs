//! 标识符生成模块
//!
//! 定义配置ID生成trait和UUID实现

use uuid::Uuid;

/// 标识符生成trait
///
/// 生成全局唯一的不透明配置ID
pub trait IdGenerator: Send + Sync {
    /// 生成下一个ID
    fn next_id(&self) -> String;
}

/// 基于UUID v4的ID生成器
#[derive(Debug, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}
