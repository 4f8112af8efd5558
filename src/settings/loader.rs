//! 设置加载器实现
//!
//! 提供TOML设置文件解析、环境变量替换和错误处理功能

use crate::error::{Result, SettingsError};
use crate::settings::types::{validate_settings, Settings};
use async_trait::async_trait;
use regex::Regex;
use std::path::Path;

/// 设置加载器trait，定义设置加载接口
#[async_trait]
pub trait SettingsLoader: Send + Sync {
    /// 从文件加载设置
    ///
    /// # 参数
    /// * `path` - 设置文件路径
    ///
    /// # 返回
    /// * `Result<Settings>` - 加载的设置或错误
    async fn load_from_file<P: AsRef<Path> + Send>(&self, path: P) -> Result<Settings>;

    /// 从字符串加载设置
    ///
    /// # 参数
    /// * `content` - 设置文件内容
    ///
    /// # 返回
    /// * `Result<Settings>` - 加载的设置或错误
    async fn load_from_string(&self, content: &str) -> Result<Settings>;

    /// 验证设置
    ///
    /// # 参数
    /// * `settings` - 要验证的设置
    ///
    /// # 返回
    /// * `Result<()>` - 验证结果
    fn validate(&self, settings: &Settings) -> Result<()>;
}

/// TOML设置加载器实现
#[derive(Debug, Clone, Default)]
pub struct TomlSettingsLoader {
    /// 是否启用环境变量替换
    enable_env_substitution: bool,
}

impl TomlSettingsLoader {
    /// 创建新的TOML设置加载器
    ///
    /// # 参数
    /// * `enable_env_substitution` - 是否启用环境变量替换
    ///
    /// # 返回
    /// * `Self` - 设置加载器实例
    pub fn new(enable_env_substitution: bool) -> Self {
        Self {
            enable_env_substitution,
        }
    }

    /// 替换字符串中的环境变量
    ///
    /// # 参数
    /// * `content` - 要处理的字符串
    ///
    /// # 返回
    /// * `Result<String>` - 替换后的字符串或错误
    fn substitute_env_vars(&self, content: &str) -> Result<String> {
        if !self.enable_env_substitution {
            return Ok(content.to_string());
        }

        // 匹配 ${VAR_NAME} 格式的环境变量
        let env_var_regex = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}")
            .map_err(|e| SettingsError::ParseError(format!("正则表达式错误: {}", e)))?;

        let mut result = content.to_string();

        for captures in env_var_regex.captures_iter(content) {
            let full_match = &captures[0];
            let var_name = &captures[1];

            match std::env::var(var_name) {
                Ok(value) => {
                    result = result.replace(full_match, &value);
                }
                Err(_) => {
                    return Err(SettingsError::EnvVarError {
                        var: var_name.to_string(),
                    }
                    .into());
                }
            }
        }

        Ok(result)
    }

    /// 解析TOML内容
    ///
    /// # 参数
    /// * `content` - TOML内容
    ///
    /// # 返回
    /// * `Result<Settings>` - 解析的设置或错误
    fn parse_toml(&self, content: &str) -> Result<Settings> {
        // 替换环境变量
        let processed_content = self.substitute_env_vars(content)?;

        // 解析TOML
        let settings: Settings = toml::from_str(&processed_content)
            .map_err(|e| SettingsError::ParseError(format!("TOML解析失败: {}", e)))?;

        Ok(settings)
    }
}

#[async_trait]
impl SettingsLoader for TomlSettingsLoader {
    async fn load_from_file<P: AsRef<Path> + Send>(&self, path: P) -> Result<Settings> {
        let path = path.as_ref();

        // 检查文件是否存在
        if !path.exists() {
            return Err(SettingsError::FileNotFound {
                path: path.to_string_lossy().to_string(),
            }
            .into());
        }

        // 读取文件内容
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| SettingsError::ParseError(format!("读取文件失败: {}", e)))?;

        // 解析设置
        let settings = self.parse_toml(&content)?;

        // 验证设置
        self.validate(&settings)?;

        log::info!("成功加载设置文件: {}", path.display());
        log::debug!("设置内容: {:?}", settings);

        Ok(settings)
    }

    async fn load_from_string(&self, content: &str) -> Result<Settings> {
        // 解析设置
        let settings = self.parse_toml(content)?;

        // 验证设置
        self.validate(&settings)?;

        log::debug!("成功解析设置字符串");

        Ok(settings)
    }

    fn validate(&self, settings: &Settings) -> Result<()> {
        validate_settings(settings).map_err(|e| SettingsError::ValidationError(e).into())
    }
}

/// 获取默认设置文件路径
///
/// 优先使用当前目录下的settings.toml，否则回落到用户配置目录
pub fn get_default_settings_path() -> std::path::PathBuf {
    if std::path::Path::new("settings.toml").exists() {
        std::path::PathBuf::from("settings.toml")
    } else {
        dirs::config_dir()
            .map(|config_dir| config_dir.join("api-config-center").join("settings.toml"))
            .unwrap_or_else(|| std::path::PathBuf::from("settings.toml"))
    }
}
