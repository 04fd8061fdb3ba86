use crate::log::formatter::LogFormatter;
use crate::log::log_record::{LogLevel, LogRecord};
use anyhow::Result;
use serde::Deserialize;
use smart_default::SmartDefault;

/// TextFormatter 配置
#[derive(Debug, Clone, Deserialize, SmartDefault)]
#[serde(default)]
pub struct TextFormatterConfig {
    /// 是否启用颜色输出
    #[default = false]
    pub colored: bool,

    /// 是否输出时间戳，webhook 输出通常关闭
    #[default = true]
    pub with_timestamp: bool,
}

/// 文本格式化器
///
/// 输出 `2025-01-19 12:34:56,789 - INFO: message`，时间为 UTC；
/// 关闭时间戳时输出 `INFO: message`
pub struct TextFormatter {
    config: TextFormatterConfig,
}

impl TextFormatter {
    pub fn new(config: TextFormatterConfig) -> Self {
        Self { config }
    }
}

impl LogFormatter for TextFormatter {
    fn format(&self, record: &LogRecord) -> Result<String> {
        let mut result = String::with_capacity(40 + record.message.len());

        if self.config.with_timestamp {
            if self.config.colored {
                result.push_str("\x1b[2m"); // dimmed
            }
            result.push_str(&record.timestamp.format("%Y-%m-%d %H:%M:%S,%3f").to_string());
            if self.config.colored {
                result.push_str("\x1b[0m"); // reset
            }
            result.push_str(" - ");
        }

        if self.config.colored {
            result.push_str(colored_level(record.level));
        } else {
            result.push_str(&record.level.to_string());
        }
        result.push_str(": ");
        result.push_str(&record.message);

        Ok(result)
    }
}

fn colored_level(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Critical => "\u{1b}[1;31mCRITICAL\u{1b}[0m", // 红色加粗
        LogLevel::Error => "\u{1b}[31mERROR\u{1b}[0m",
        LogLevel::Warn => "\u{1b}[33mWARNING\u{1b}[0m",
        LogLevel::Info => "\u{1b}[32mINFO\u{1b}[0m",
        LogLevel::Debug => "\u{1b}[36mDEBUG\u{1b}[0m",
        LogLevel::Trace => "\u{1b}[37;2mTRACE\u{1b}[0m",
    }
}

crate::impl_from!(TextFormatterConfig => TextFormatter);
crate::impl_box_from!(TextFormatter => dyn LogFormatter);
