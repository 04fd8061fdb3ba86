//! hooklog - 限流 webhook 日志输出
//!
//! 将应用日志转发到带限流协议的 webhook（聊天频道通知等），
//! 同时提供终端与按大小滚动的文件输出。
//!
//! ## 模块
//!
//! - **webhook**: 限流投递引擎（额度跟踪、合并排队、阻塞式 flush）
//! - **log**: 日志器、格式化器与输出器，包括 `WebhookAppender`
//! - **cfg**: `TypeOptions` 注册表、时长格式、配置文件发现

pub mod cfg;
pub mod log;
pub mod webhook;

pub use cfg::{create_trait_from_type_options, register_trait, ConfigFile, TypeOptions};

pub use log::{
    get_logger, init_logging, init_webhook_logging, LogAppender, LogFormatter, LogLevel,
    LogRecord, Logger, LoggerConfig, LoggingOptions, WebhookAppender,
};

pub use webhook::{DeliveryOutcome, DeliveryTransport, WebhookSink};
