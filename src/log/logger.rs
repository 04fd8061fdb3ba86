use crate::cfg::{create_trait_from_type_options, TypeOptions};
use crate::log::{
    appender::LogAppender, formatter::LogFormatter, log_record::LogLevel, log_record::LogRecord,
};
use anyhow::Result;
use serde::Deserialize;
use smart_default::SmartDefault;
use std::sync::{Arc, Once, PoisonError, RwLock as SyncRwLock};
use tokio::sync::RwLock;

/// Handler 配置：最低级别 + formatter + appender
#[derive(Debug, Clone, Deserialize, SmartDefault, PartialEq)]
#[serde(default)]
pub struct HandlerConfig {
    /// handler 名称，重新初始化时用来判断是否被新配置取代
    pub name: Option<String>,

    /// 该 handler 的最低级别，None 时只受 logger 级别控制
    pub level: Option<LogLevel>,

    /// Formatter 配置
    #[default(TypeOptions::new("TextFormatter"))]
    pub formatter: TypeOptions,

    /// Appender 配置
    #[default(TypeOptions::new("ConsoleAppender"))]
    pub appender: TypeOptions,
}

/// Logger 配置
#[derive(Debug, Clone, Deserialize, SmartDefault, PartialEq)]
#[serde(default)]
pub struct LoggerConfig {
    /// logger 名称
    #[default("root".to_string())]
    pub name: String,

    /// 日志级别
    #[default(LogLevel::Info)]
    pub level: LogLevel,

    /// 输出 handler 列表
    #[default(vec![HandlerConfig::default()])]
    pub handlers: Vec<HandlerConfig>,
}

/// 注册所有日志组件（只执行一次）
static REGISTER_ONCE: Once = Once::new();

pub(crate) fn ensure_registered() {
    REGISTER_ONCE.call_once(|| {
        let _ = crate::log::register_formatters();
        let _ = crate::log::register_appenders();
    });
}

/// 一个输出通道
pub struct Handler {
    name: Option<String>,
    level: Option<LogLevel>,
    formatter: Arc<dyn LogFormatter>,
    appender: Arc<dyn LogAppender>,
}

impl Handler {
    pub fn new(
        level: Option<LogLevel>,
        formatter: Arc<dyn LogFormatter>,
        appender: Arc<dyn LogAppender>,
    ) -> Self {
        Self {
            name: None,
            level,
            formatter,
            appender,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// 从配置创建 Handler
    pub fn from_config(config: &HandlerConfig) -> Result<Self> {
        ensure_registered();

        let formatter: Box<dyn LogFormatter> = create_trait_from_type_options(&config.formatter)?;
        let appender: Box<dyn LogAppender> = create_trait_from_type_options(&config.appender)?;

        let handler = Self::new(config.level, Arc::from(formatter), Arc::from(appender));
        Ok(match &config.name {
            Some(name) => handler.with_name(name.clone()),
            None => handler,
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn level(&self) -> Option<LogLevel> {
        self.level
    }

    fn accepts(&self, level: LogLevel) -> bool {
        self.level.map_or(true, |min| level >= min)
    }
}

/// 核心日志器
///
/// 先按 logger 级别过滤，再交给每个级别匹配的 handler 格式化并输出。
/// 某个 handler 出错不影响其余 handler，返回遇到的第一个错误
pub struct Logger {
    name: String,
    level: Arc<RwLock<LogLevel>>,
    // 从不跨 await 持有
    handlers: SyncRwLock<Vec<Arc<Handler>>>,
}

impl Logger {
    /// 从配置创建 Logger
    pub fn new(config: LoggerConfig) -> Result<Self> {
        let handlers = config
            .handlers
            .iter()
            .map(|handler| Handler::from_config(handler).map(Arc::new))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            name: config.name,
            level: Arc::new(RwLock::new(config.level)),
            handlers: SyncRwLock::new(handlers),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 设置日志级别
    pub async fn set_level(&self, level: LogLevel) {
        *self.level.write().await = level;
    }

    /// 获取当前日志级别
    pub async fn get_level(&self) -> LogLevel {
        *self.level.read().await
    }

    /// 追加一个 handler
    pub async fn add_handler(&self, handler: Handler) {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(handler));
    }

    pub async fn handler_count(&self) -> usize {
        self.handlers().len()
    }

    /// 当前 handler 的快照
    pub fn handlers(&self) -> Vec<Arc<Handler>> {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// 接管另一个 logger 的 handler
    ///
    /// 与本 logger 已有 handler 同名的会被跳过，其余（包括 webhook handler
    /// 及其待发送队列）原样共享过来
    pub fn adopt_handlers(&self, previous: &Logger) {
        let inherited = previous.handlers();
        let mut handlers = self.handlers.write().unwrap_or_else(PoisonError::into_inner);

        for handler in inherited {
            let replaced = handler
                .name()
                .is_some_and(|name| handlers.iter().any(|h| h.name() == Some(name)));
            if !replaced {
                handlers.push(handler);
            }
        }
    }

    /// 记录日志
    pub async fn log(&self, record: LogRecord) -> Result<()> {
        if record.level < *self.level.read().await {
            return Ok(());
        }

        // 不在持锁期间等待 appender，慢速 webhook 不会阻塞 add_handler
        let handlers = self.handlers();

        let mut first_error = None;
        for handler in handlers.iter().filter(|h| h.accepts(record.level)) {
            let result = match handler.formatter.format(&record) {
                Ok(formatted) => handler.appender.append(&formatted).await,
                Err(e) => Err(e),
            };
            if let Err(e) = result {
                first_error.get_or_insert(e);
            }
        }

        first_error.map_or(Ok(()), Err)
    }

    /// 刷新所有 appender，webhook appender 会阻塞到队列排空
    pub async fn flush(&self) -> Result<()> {
        let handlers = self.handlers();

        let mut first_error = None;
        for handler in handlers.iter() {
            if let Err(e) = handler.appender.flush().await {
                first_error.get_or_insert(e);
            }
        }

        first_error.map_or(Ok(()), Err)
    }

    /// 记录 TRACE 级别日志
    pub async fn trace(&self, message: impl Into<String>) -> Result<()> {
        self.log(LogRecord::new(LogLevel::Trace, message)).await
    }

    /// 记录 DEBUG 级别日志
    pub async fn debug(&self, message: impl Into<String>) -> Result<()> {
        self.log(LogRecord::new(LogLevel::Debug, message)).await
    }

    /// 记录 INFO 级别日志
    pub async fn info(&self, message: impl Into<String>) -> Result<()> {
        self.log(LogRecord::new(LogLevel::Info, message)).await
    }

    /// 记录 WARN 级别日志
    pub async fn warn(&self, message: impl Into<String>) -> Result<()> {
        self.log(LogRecord::new(LogLevel::Warn, message)).await
    }

    /// 记录 ERROR 级别日志
    pub async fn error(&self, message: impl Into<String>) -> Result<()> {
        self.log(LogRecord::new(LogLevel::Error, message)).await
    }

    /// 记录 CRITICAL 级别日志
    pub async fn critical(&self, message: impl Into<String>) -> Result<()> {
        self.log(LogRecord::new(LogLevel::Critical, message)).await
    }
}
