use crate::cfg::{get_config, ConfigFile, TypeOptions};
use crate::log::appender::{WebhookAppender, WebhookAppenderConfig};
use crate::log::formatter::{TextFormatter, TextFormatterConfig};
use crate::log::logger::{Handler, HandlerConfig, Logger, LoggerConfig};
use crate::log::log_record::LogLevel;
use anyhow::{anyhow, Result};
use once_cell::sync::Lazy;
use serde::Deserialize;
use smart_default::SmartDefault;
use std::path::Path;
use std::sync::{Arc, RwLock};

const CONSOLE_HANDLER: &str = "console";
const FILE_HANDLER: &str = "file";

/// 全局 logger
static GLOBAL_LOGGER: Lazy<RwLock<Option<Arc<Logger>>>> = Lazy::new(|| RwLock::new(None));

/// `init_logging` 的参数
#[derive(Debug, Clone, Deserialize, SmartDefault)]
#[serde(default)]
pub struct LoggingOptions {
    /// 为 true 时默认级别为 Debug，否则为 Info
    pub debug: bool,

    /// 显式指定级别，优先于 debug
    pub level: Option<LogLevel>,

    /// 日志目录
    #[default("logs".to_string())]
    pub folder: String,

    /// 日志文件名
    #[default("bot.log".to_string())]
    pub filename: String,

    /// logger 名称
    #[default("bot".to_string())]
    pub logger: String,

    /// 保留的备份数量
    #[default(5)]
    pub backup_count: usize,

    /// 单个文件最大大小（字节）
    #[default(16 * 1024 * 1024)]
    pub max_size: u64,
}

impl LoggingOptions {
    fn logger_config(&self) -> LoggerConfig {
        let level = self
            .level
            .unwrap_or(if self.debug { LogLevel::Debug } else { LogLevel::Info });
        let file_path = Path::new(&self.folder).join(&self.filename);

        LoggerConfig {
            name: self.logger.clone(),
            level,
            handlers: vec![
                HandlerConfig {
                    name: Some(CONSOLE_HANDLER.to_string()),
                    level: None,
                    formatter: TypeOptions::new("TextFormatter"),
                    appender: TypeOptions::with_options(
                        "ConsoleAppender",
                        serde_json::json!({ "target": "stderr" }),
                    ),
                },
                HandlerConfig {
                    name: Some(FILE_HANDLER.to_string()),
                    level: None,
                    formatter: TypeOptions::new("TextFormatter"),
                    appender: TypeOptions::with_options(
                        "RollingFileAppender",
                        serde_json::json!({
                            "file_path": file_path.to_string_lossy(),
                            "max_size": self.max_size,
                            "backup_count": self.backup_count,
                        }),
                    ),
                },
            ],
        }
    }
}

/// 初始化全局 logger：stderr + 按大小滚动的文件
///
/// 重复调用会替换之前的全局 logger，但保留它的其余 handler（例如
/// `init_webhook_logging` 挂上的 webhook handler 和其中尚未发送的消息），
/// 只有终端与文件 handler 按新参数重建
pub fn init_logging(options: LoggingOptions) -> Result<Arc<Logger>> {
    let logger = Arc::new(Logger::new(options.logger_config())?);

    let mut global = GLOBAL_LOGGER
        .write()
        .map_err(|_| anyhow!("Failed to acquire write lock"))?;
    if let Some(previous) = global.as_ref() {
        logger.adopt_handlers(previous);
    }
    *global = Some(logger.clone());

    Ok(logger)
}

/// 直接设置全局 logger，之前的 logger 及其 handler 被丢弃
pub fn set_logger(logger: Arc<Logger>) -> Result<()> {
    let mut global = GLOBAL_LOGGER
        .write()
        .map_err(|_| anyhow!("Failed to acquire write lock"))?;
    *global = Some(logger);
    Ok(())
}

/// 获取全局 logger
///
/// 未初始化时，`init` 为 true 则用默认参数初始化，否则返回错误
pub fn get_logger(init: bool) -> Result<Arc<Logger>> {
    let existing = GLOBAL_LOGGER
        .read()
        .map_err(|_| anyhow!("Failed to acquire read lock"))?
        .clone();

    match existing {
        Some(logger) => Ok(logger),
        None if init => init_logging(LoggingOptions::default()),
        None => Err(anyhow!("Logger not initialized")),
    }
}

/// 设置全局 logger 的级别
pub async fn set_level(level: LogLevel) -> Result<()> {
    get_logger(false)?.set_level(level).await;
    Ok(())
}

/// 刷新全局 logger，webhook 队列会被排空
pub async fn flush() -> Result<()> {
    get_logger(false)?.flush().await
}

/// 从发现的配置文件读取 webhook 地址并挂到全局 logger 上
pub async fn init_webhook_logging(section: &str) -> Result<()> {
    let config = get_config()?;
    init_webhook_logging_with(&config, section).await
}

/// 使用给定配置挂载 webhook handler
///
/// - `[section].logging_webhook`：Info 及以上
/// - `[global].global_webhook`：Warn 及以上
///
/// 两个 handler 都以 section 名作为显示名称，输出 `LEVEL: message`。
/// section 中可选的 `count_per_second` 作用于两个 handler
pub async fn init_webhook_logging_with(config: &ConfigFile, section: &str) -> Result<()> {
    let logger = get_logger(false)?;

    let logging_webhook = config.get_config_var(section, "logging_webhook")?;
    let global_webhook = config.get_config_var("global", "global_webhook")?;
    let count_per_second = match config.get_config_var(section, "count_per_second") {
        Ok(value) => value
            .parse::<u32>()
            .map_err(|e| anyhow!("invalid count_per_second '{}': {}", value, e))?,
        Err(_) => 1,
    };

    for (url, level) in [
        (logging_webhook, LogLevel::Info),
        (global_webhook, LogLevel::Warn),
    ] {
        let appender = WebhookAppender::new(WebhookAppenderConfig {
            url,
            username: Some(section.to_string()),
            count_per_second,
            ..Default::default()
        })?;
        let formatter = TextFormatter::new(TextFormatterConfig {
            colored: false,
            with_timestamp: false,
        });
        let handler = Handler::new(Some(level), Arc::new(formatter), Arc::new(appender))
            .with_name(format!("webhook:{}:{}", section, level));
        logger.add_handler(handler).await;
    }

    tracing::debug!(section, logger = logger.name(), "webhook handlers installed");
    Ok(())
}

#[cfg(test)]
pub(crate) fn reset_global_logger() {
    if let Ok(mut global) = GLOBAL_LOGGER.write() {
        *global = None;
    }
}
