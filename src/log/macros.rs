//! 日志宏
//!
//! 自动附带调用处的模块路径
//!
//! ```ignore
//! hooklog::info!(logger, "user {} logged in", name)?;
//! ```

/// 以指定级别记录日志
#[macro_export]
macro_rules! log_at {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger
            .log(
                $crate::log::LogRecord::new($level, format!($($arg)+))
                    .with_module(module_path!()),
            )
            .await
    };
}

/// 记录 TRACE 级别日志
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log_at!($logger, $crate::log::LogLevel::Trace, $($arg)+)
    };
}

/// 记录 DEBUG 级别日志
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log_at!($logger, $crate::log::LogLevel::Debug, $($arg)+)
    };
}

/// 记录 INFO 级别日志
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log_at!($logger, $crate::log::LogLevel::Info, $($arg)+)
    };
}

/// 记录 WARN 级别日志
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log_at!($logger, $crate::log::LogLevel::Warn, $($arg)+)
    };
}

/// 记录 ERROR 级别日志
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log_at!($logger, $crate::log::LogLevel::Error, $($arg)+)
    };
}

/// 记录 CRITICAL 级别日志
#[macro_export]
macro_rules! critical {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log_at!($logger, $crate::log::LogLevel::Critical, $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    use crate::log::logger::tests::CaptureAppender;
    use crate::log::{Handler, LogLevel, Logger, LoggerConfig, TextFormatter, TextFormatterConfig};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_level_macros() -> anyhow::Result<()> {
        let logger = Logger::new(LoggerConfig {
            level: LogLevel::Debug,
            handlers: vec![],
            ..Default::default()
        })?;
        let capture = Arc::new(CaptureAppender::default());
        let formatter = TextFormatter::new(TextFormatterConfig {
            colored: false,
            with_timestamp: false,
        });
        logger
            .add_handler(Handler::new(None, Arc::new(formatter), capture.clone()))
            .await;

        crate::trace!(logger, "hidden")?;
        crate::debug!(logger, "value = {}", 42)?;
        crate::warn!(logger, "{} retries left", 2)?;
        crate::critical!(logger, "shutting down")?;

        assert_eq!(
            *capture.lines.lock().unwrap(),
            vec!["DEBUG: value = 42", "WARNING: 2 retries left", "CRITICAL: shutting down"]
        );
        Ok(())
    }
}
