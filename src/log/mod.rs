//! 日志模块
//!
//! Logger 由多个 handler 组成，每个 handler 有自己的最低级别、formatter 和
//! appender。appender 包括终端、按大小滚动的文件和限流 webhook。
//!
//! # 快速开始
//!
//! ```rust,no_run
//! use hooklog::log::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let logger = init_logging(LoggingOptions::default())?;
//!
//!     // 读取 hooklog.toml 中 [MyBot] 和 [global] 的 webhook 地址
//!     init_webhook_logging("MyBot").await?;
//!
//!     logger.info("bot started").await?;
//!     logger.warn("rate limited by upstream").await?;
//!
//!     // 退出前排空 webhook 队列
//!     flush().await?;
//!     Ok(())
//! }
//! ```

pub mod appender;
pub mod formatter;
pub mod global;
pub mod log_record;
pub mod logger;
pub mod macros;

pub use appender::{
    create_appender_from_options, register_appenders, ConsoleAppender, ConsoleAppenderConfig,
    LogAppender, RollingFileAppender, RollingFileAppenderConfig, Target, WebhookAppender,
    WebhookAppenderConfig,
};
pub use formatter::{
    create_formatter_from_options, register_formatters, LogFormatter, TextFormatter,
    TextFormatterConfig,
};
pub use global::{
    flush, get_logger, init_logging, init_webhook_logging, init_webhook_logging_with,
    set_level, set_logger, LoggingOptions,
};
pub use log_record::{LogLevel, LogRecord};
pub use logger::{Handler, HandlerConfig, Logger, LoggerConfig};
