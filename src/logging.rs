//! 日志系统模块
//!
//! 提供结构化日志的单次初始化和配置管理

use log::LevelFilter;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter};

/// 全局日志初始化状态
#[derive(Debug, Default)]
struct GlobalLoggingState {
    /// 是否已初始化
    initialized: bool,
    /// 当前配置
    current_config: Option<LogConfig>,
}

/// 全局日志状态管理器
static GLOBAL_LOGGING_STATE: OnceLock<Mutex<GlobalLoggingState>> = OnceLock::new();

/// 日志配置结构
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// 日志级别
    pub level: LevelFilter,
    /// 日志文件路径（可选，`None` 时输出到控制台）
    pub file_path: Option<PathBuf>,
    /// 是否使用JSON格式
    pub json_format: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LevelFilter::Info,
            file_path: None,
            json_format: false,
        }
    }
}

impl LogConfig {
    /// 从设置里的级别字符串创建配置
    ///
    /// # 参数
    /// * `level` - 日志级别字符串，无法识别时回落到info
    pub fn from_level_str(level: &str) -> Self {
        Self {
            level: parse_level(level),
            ..Self::default()
        }
    }
}

/// 解析日志级别字符串，无法识别时回落到info
fn parse_level(level: &str) -> LevelFilter {
    match level {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

/// 将 log::LevelFilter 转换为 tracing 的指令
fn convert_level_to_directive(level: LevelFilter) -> tracing_subscriber::filter::Directive {
    use tracing_subscriber::filter::Directive;
    match level {
        LevelFilter::Off => "off".parse().unwrap(),
        LevelFilter::Error => Directive::from(tracing::Level::ERROR),
        LevelFilter::Warn => Directive::from(tracing::Level::WARN),
        LevelFilter::Info => Directive::from(tracing::Level::INFO),
        LevelFilter::Debug => Directive::from(tracing::Level::DEBUG),
        LevelFilter::Trace => Directive::from(tracing::Level::TRACE),
    }
}

/// 初始化日志系统
///
/// # 参数
/// * `config` - 日志配置
///
/// # 返回
/// * `Result<(), anyhow::Error>` - 初始化结果
///
/// # 特性
/// - 线程安全的单次初始化，重复调用直接返回
/// - log crate 的输出桥接到 tracing
pub fn setup_logging(config: LogConfig) -> anyhow::Result<()> {
    let state_mutex = GLOBAL_LOGGING_STATE.get_or_init(|| Mutex::new(GlobalLoggingState::default()));

    {
        let state = state_mutex.lock().unwrap();
        if state.initialized {
            return Ok(());
        }
    }

    perform_initialization(&config)?;

    let mut state = state_mutex.lock().unwrap();
    state.initialized = true;
    state.current_config = Some(config);
    Ok(())
}

/// 执行实际的日志系统初始化
fn perform_initialization(config: &LogConfig) -> anyhow::Result<()> {
    // 初始化 LogTracer（log crate 到 tracing 的桥接）
    init_log_tracer()?;

    // 初始化 tracing subscriber
    init_tracing_subscriber(config)
}

/// 初始化 LogTracer
fn init_log_tracer() -> anyhow::Result<()> {
    use tracing_log::LogTracer;

    static LOG_TRACER_INIT: OnceLock<Result<(), String>> = OnceLock::new();

    let result = LOG_TRACER_INIT.get_or_init(|| LogTracer::init().map_err(|e| e.to_string()));

    result
        .as_ref()
        .map_err(|e| anyhow::anyhow!("LogTracer初始化失败: {}", e))?;
    Ok(())
}

/// 初始化 tracing subscriber
fn init_tracing_subscriber(config: &LogConfig) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::from_default_env().add_directive(convert_level_to_directive(config.level));

    let result = if let Some(file_path) = &config.file_path {
        let file = std::fs::File::create(file_path)
            .map_err(|e| anyhow::anyhow!("创建日志文件失败: {}", e))?;
        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_file(true)
            .with_line_number(true);

        registry().with(env_filter).with(file_layer).try_init()
    } else if config.json_format {
        let json_layer = fmt::layer()
            .json()
            .with_timer(fmt::time::ChronoUtc::rfc_3339())
            .with_file(true)
            .with_line_number(true);

        registry().with(env_filter).with(json_layer).try_init()
    } else {
        let fmt_layer = fmt::layer()
            .with_timer(fmt::time::ChronoUtc::rfc_3339())
            .with_ansi(true)
            .with_file(true)
            .with_line_number(true);

        registry().with(env_filter).with(fmt_layer).try_init()
    };

    match result {
        Ok(()) => {
            tracing::info!("日志系统初始化完成");
            Ok(())
        }
        Err(e) => {
            let error_msg = e.to_string();
            if error_msg.contains("a global default trace dispatcher has already been set") {
                // 已经初始化过了，视为成功
                tracing::debug!("日志系统已经初始化过了");
                Ok(())
            } else {
                Err(anyhow::anyhow!("tracing subscriber初始化失败: {}", error_msg))
            }
        }
    }
}

/// 检查日志系统是否已初始化
pub fn is_initialized() -> bool {
    GLOBAL_LOGGING_STATE
        .get()
        .map(|state_mutex| state_mutex.lock().unwrap().initialized)
        .unwrap_or(false)
}

/// 获取当前日志配置（如果已初始化）
pub fn current_config() -> Option<LogConfig> {
    GLOBAL_LOGGING_STATE
        .get()
        .and_then(|state_mutex| state_mutex.lock().unwrap().current_config.clone())
}
